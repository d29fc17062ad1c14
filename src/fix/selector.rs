// Mon Oct 19 2026 - Alex

use crate::fix::{Fix, FixError, PatchReport};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionFailure {
    pub version: String,
    pub error: FixError,
}

impl fmt::Display for VersionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.version, self.error)
    }
}

/// A fix was accepted. `skipped` holds the failures of the higher-priority
/// descriptors that were tried first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Applied {
    pub version: String,
    pub report: PatchReport,
    pub skipped: Vec<VersionFailure>,
}

/// Every known fix was tried and none applied.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unrecognized kernel code")]
pub struct Unrecognized {
    pub failures: Vec<VersionFailure>,
}

impl Unrecognized {
    pub fn details(&self) -> String {
        self.failures.iter()
            .map(|failure| failure.to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Tries each fix in order and applies the first one whose structural checks
/// all pass. A failed attempt never writes to `target`.
pub fn fix_any_version<F: Fix>(
    fixes: &[F],
    anchor: &[u8],
    target: &mut [u8],
) -> Result<Applied, Unrecognized> {
    let mut failures = Vec::new();

    for fix in fixes {
        match fix.apply(anchor, target) {
            Ok(report) => {
                log::info!("applied fix for {} at {:x?}", fix.version(), report.sites);
                return Ok(Applied {
                    version: fix.version().to_string(),
                    report,
                    skipped: failures,
                });
            }
            Err(error) => {
                log::debug!("fix for {} does not apply: {}", fix.version(), error);
                failures.push(VersionFailure {
                    version: fix.version().to_string(),
                    error,
                });
            }
        }
    }

    Err(Unrecognized { failures })
}
