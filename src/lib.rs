// Mon Oct 19 2026 - Alex

pub mod config;
pub mod dump;
pub mod fix;
pub mod kernel;
pub mod pattern;
pub mod ui;
pub mod utils;

pub use config::Config;
pub use fix::{builtin_fixes, fix_any_version, Fix, FixDescriptor, FixError};
pub use kernel::{KernelError, KernelImage};
pub use pattern::{compile, Pattern, PatternError};
