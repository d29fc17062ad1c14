// Mon Oct 19 2026 - Alex

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "pprof-mac-fix")]
#[command(author = "Alex")]
#[command(version = "1.0.0")]
#[command(about = "Patch the OS X kernel so profiling signals reach the thread that used the CPU", long_about = None)]
pub struct Args {
    /// Kernel to read.
    pub old: PathBuf,

    /// Where to write the patched kernel.
    pub new: Option<PathBuf>,

    /// Print the version and a disassembly of the patched functions instead.
    #[arg(long)]
    pub dump: bool,

    #[arg(short, long, default_value = "warn")]
    pub log_level: String,

    /// JSON file overriding symbol names, disassembler and contact.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Leave the build date in the version string alone.
    #[arg(long)]
    pub no_timestamp: bool,

    #[arg(long)]
    pub no_color: bool,
}

impl Args {
    pub fn validate(&self) -> Result<(), String> {
        match (self.dump, &self.new) {
            (true, Some(_)) => Err("--dump takes a single kernel".to_string()),
            (false, None) => Err("missing output kernel".to_string()),
            _ => Ok(()),
        }
    }

    pub fn usage(&self) -> &'static str {
        if self.dump {
            "usage: pprof-mac-fix --dump oldkernel"
        } else {
            "usage: pprof-mac-fix oldkernel newkernel"
        }
    }
}
