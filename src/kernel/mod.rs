// Mon Oct 19 2026 - Alex

pub mod error;
pub mod image;
pub mod regions;

pub use error::KernelError;
pub use image::{find_version, select_slice, KernelImage};
pub use regions::{locate_named_regions, NamedRegions, Region};
