// Mon Oct 19 2026 - Alex

pub mod args;
pub mod handler;

pub use args::Args;
pub use handler::{CommandHandler, Outcome};

use clap::Parser;

pub fn parse_args() -> Args {
    Args::parse()
}
