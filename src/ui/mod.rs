// Mon Oct 19 2026 - Alex

pub mod cli;

pub use cli::{Args, CommandHandler, Outcome};
