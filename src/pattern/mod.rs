// Mon Oct 19 2026 - Alex

pub mod pattern;
pub mod compiler;
pub mod matcher;
pub mod capture;
pub mod error;

pub use pattern::{Mark, Pattern};
pub use compiler::{compile, PatternCompiler};
pub use matcher::Matches;
pub use capture::Captures;
pub use error::PatternError;
