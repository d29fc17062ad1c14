// Mon Oct 19 2026 - Alex

pub mod catalog;
pub mod descriptor;
pub mod error;
pub mod generator;
pub mod selector;
pub mod x86;

pub use catalog::builtin_fixes;
pub use descriptor::{Fix, FixDescriptor, PatchPlan, PatchReport, Replacement};
pub use error::FixError;
pub use generator::{CallSite, SiteLayout};
pub use selector::{fix_any_version, Applied, Unrecognized, VersionFailure};
