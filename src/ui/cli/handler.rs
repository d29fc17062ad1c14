// Mon Oct 19 2026 - Alex

use super::args::Args;
use crate::config::Config;
use crate::dump::dump;
use crate::fix::{builtin_fixes, fix_any_version, Unrecognized};
use crate::kernel::{locate_named_regions, KernelImage};
use chrono::Utc;
use colored::Colorize;
use std::io;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Patched,
    Dumped,
    Unrecognized,
}

impl Outcome {
    pub fn exit_code(self) -> i32 {
        match self {
            Outcome::Patched | Outcome::Dumped => 0,
            Outcome::Unrecognized => 2,
        }
    }
}

pub struct CommandHandler {
    program: String,
}

impl CommandHandler {
    pub fn new() -> Self {
        Self {
            program: std::env::args().next().unwrap_or_else(|| "pprof-mac-fix".to_string()),
        }
    }

    pub fn execute(&self, args: Args) -> anyhow::Result<Outcome> {
        if args.no_color {
            colored::control::set_override(false);
        }
        self.setup_logging(&args)?;

        let mut config = match &args.config {
            Some(path) => Config::from_file(path)?,
            None => Config::default(),
        };
        if args.no_timestamp {
            config = config.with_stamp_timestamp(false);
        }

        if args.dump {
            self.handle_dump(&args.old, &config)
        } else {
            let new = args.new.as_deref().ok_or_else(|| anyhow::anyhow!(args.usage()))?;
            self.handle_patch(&args.old, new, &config)
        }
    }

    fn setup_logging(&self, args: &Args) -> anyhow::Result<()> {
        let level = match args.log_level.to_lowercase().as_str() {
            "trace" => log::LevelFilter::Trace,
            "debug" => log::LevelFilter::Debug,
            "info" => log::LevelFilter::Info,
            "warn" => log::LevelFilter::Warn,
            "error" => log::LevelFilter::Error,
            "off" => log::LevelFilter::Off,
            _ => log::LevelFilter::Warn,
        };

        env_logger::Builder::new()
            .filter_level(level)
            .format_timestamp(None)
            .try_init()?;

        Ok(())
    }

    fn handle_patch(&self, old: &Path, new: &Path, config: &Config) -> anyhow::Result<Outcome> {
        println!("{} Loading kernel: {}", "[*]".blue(), old.display());
        let mut image = KernelImage::load(old)?;
        let regions = locate_named_regions(image.image(), &config.symbols())?;
        println!("{} old: {}", "[*]".blue(), image.version());

        let fixes = builtin_fixes()?;
        let anchor = regions.get(&config.anchor_symbol)?;
        let target = regions.get(&config.target_symbol)?;
        let (anchor_code, target_code) = image.split_regions(anchor, target)?;

        let applied = match fix_any_version(&fixes, anchor_code, target_code) {
            Ok(applied) => applied,
            Err(unrecognized) => {
                self.report_unrecognized(&unrecognized, old, config);
                return Ok(Outcome::Unrecognized);
            }
        };

        for failure in &applied.skipped {
            log::debug!("skipped {}", failure);
        }
        println!(
            "{} Patched {} call sites for {} (tls {:#x})",
            "[+]".green(),
            applied.report.sites.len(),
            applied.version.cyan(),
            applied.report.tls_offset
        );

        if config.stamp_timestamp {
            image.stamp_timestamp(Utc::now());
        }
        println!("{} new: {}", "[+]".green(), image.version());

        image.save(new)?;
        println!("{} Kernel written to: {}", "[+]".green(), new.display());

        Ok(Outcome::Patched)
    }

    fn handle_dump(&self, old: &Path, config: &Config) -> anyhow::Result<Outcome> {
        let image = KernelImage::load(old)?;
        let regions = locate_named_regions(image.image(), &config.symbols())?;
        let ordered = [
            regions.get(&config.anchor_symbol)?,
            regions.get(&config.target_symbol)?,
        ];

        let stdout = io::stdout();
        dump(&image, ordered, &config.disassembler, &mut stdout.lock())?;

        Ok(Outcome::Dumped)
    }

    fn report_unrecognized(&self, unrecognized: &Unrecognized, old: &Path, config: &Config) {
        eprintln!("{} {}.", "[!]".red(), unrecognized);
        eprintln!("{}", unrecognized.details());
        eprintln!();
        eprintln!("For an update, mail {} with the output printed by:", config.contact);
        eprintln!("\t{} --dump {}", self.program, old.display());
    }
}

impl Default for CommandHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(Outcome::Patched.exit_code(), 0);
        assert_eq!(Outcome::Dumped.exit_code(), 0);
        assert_eq!(Outcome::Unrecognized.exit_code(), 2);
    }

    #[test]
    fn test_missing_kernel_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let handler = CommandHandler::new();

        let result = handler.handle_patch(
            &dir.path().join("missing"),
            &dir.path().join("out"),
            &Config::default(),
        );

        assert!(result.is_err());
        assert!(!dir.path().join("out").exists());
    }
}
