// Mon Oct 19 2026 - Alex

use crate::pattern::PatternError;
use thiserror::Error;

/// Reasons a fix descriptor does not apply to the loaded code.
///
/// None of these are fatal for the program: the version selector records them
/// and moves on to the next descriptor.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FixError {
    #[error("anchor pattern does not match")]
    AnchorMismatch,
    #[error("cannot match timer call sequence")]
    NoTargetMatch,
    #[error("1 match for timer call sequence {offsets:?}, want 2")]
    IncompleteTargetMatch { offsets: Vec<usize> },
    #[error("{count} matches for timer call sequence {offsets:?}, want 2")]
    AmbiguousTargetMatch { count: usize, offsets: Vec<usize> },
    #[error("timer call arms differ in sequence at {offset:#x}")]
    MirroredArmsMismatch { offset: usize },
    #[error("timer call sequence at {offset:#x} missing conditional jump {opcode:02x}")]
    MissingConditionalBranch { offset: usize, opcode: u8 },
    #[error("timer call sequence at {offset:#x} missing unconditional jump {opcode:02x}")]
    MissingUnconditionalBranch { offset: usize, opcode: u8 },
    #[error("timer call rewrite at {offset:#x} too long: {len} bytes, budget {budget}")]
    PatchTooLarge { offset: usize, len: usize, budget: usize },
    #[error("pattern has no capture mark {0:?}")]
    MissingCapture(&'static str),
    #[error("capture marks out of order in {0}")]
    InvalidLayout(String),
    #[error(transparent)]
    Pattern(#[from] PatternError),
    #[error("timer call sequence no longer matches at {0:#x}")]
    TargetRematch(usize),
}
