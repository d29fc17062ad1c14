// Mon Oct 19 2026 - Alex

pub mod binary;

pub use binary::{format_bytes, hex_dump, read_u32_le};
