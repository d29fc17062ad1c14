// Mon Oct 19 2026 - Alex

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PatternError {
    #[error("Malformed pattern token {token:?}: {reason}")]
    Malformed { token: String, reason: String },
    #[error("Duplicate capture label: {0}")]
    DuplicateLabel(String),
}

impl PatternError {
    pub(crate) fn malformed(token: &str, reason: impl Into<String>) -> Self {
        PatternError::Malformed {
            token: token.to_string(),
            reason: reason.into(),
        }
    }
}
