// Mon Oct 19 2026 - Alex

use colored::Colorize;
use pprof_mac_fix::ui::cli::{parse_args, CommandHandler};

fn main() {
    let args = parse_args();

    if let Err(e) = args.validate() {
        eprintln!("{} {}", "[!]".red(), e);
        eprintln!("{}", args.usage());
        std::process::exit(2);
    }

    let handler = CommandHandler::new();
    match handler.execute(args) {
        Ok(outcome) => std::process::exit(outcome.exit_code()),
        Err(e) => {
            eprintln!("{} {:#}", "[!]".red(), e);
            std::process::exit(1);
        }
    }
}
