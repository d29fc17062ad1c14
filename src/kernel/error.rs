// Mon Oct 19 2026 - Alex

use thiserror::Error;

#[derive(Error, Debug)]
pub enum KernelError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Binary parse error: {0}")]
    BinaryParseError(#[from] goblin::error::Error),
    #[error("cannot find x86-64 kernel in fat kernel binary")]
    NoX86Slice,
    #[error("fat slice [{offset}:{end}] outside file of {len} bytes")]
    InvalidSlice { offset: usize, end: usize, len: usize },
    #[error("cannot find kernel version string")]
    VersionNotFound,
    #[error("cannot find {0} in kernel")]
    RegionNotFound(String),
    #[error("invalid address [{start}:{end}] for {name} in data [:{len}]")]
    InvalidRegionBounds {
        name: String,
        start: u64,
        end: u64,
        len: usize,
    },
    #[error("regions {0} and {1} overlap")]
    OverlappingRegions(String, String),
}
