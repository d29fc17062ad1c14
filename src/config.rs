// Mon Oct 19 2026 - Alex

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub anchor_symbol: String,
    pub target_symbol: String,
    pub disassembler: String,
    pub stamp_timestamp: bool,
    pub contact: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            anchor_symbol: "_current_thread".to_string(),
            target_symbol: "_bsd_ast".to_string(),
            disassembler: "gdb".to_string(),
            stamp_timestamp: true,
            contact: "rsc@golang.org".to_string(),
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path.as_ref())?;
        let config: Config = serde_json::from_str(&text)?;
        config.validate().map_err(|e| anyhow::anyhow!(e))?;
        Ok(config)
    }

    pub fn with_anchor_symbol(mut self, symbol: &str) -> Self {
        self.anchor_symbol = symbol.to_string();
        self
    }

    pub fn with_target_symbol(mut self, symbol: &str) -> Self {
        self.target_symbol = symbol.to_string();
        self
    }

    pub fn with_disassembler(mut self, program: &str) -> Self {
        self.disassembler = program.to_string();
        self
    }

    pub fn with_stamp_timestamp(mut self, stamp: bool) -> Self {
        self.stamp_timestamp = stamp;
        self
    }

    pub fn with_contact(mut self, contact: &str) -> Self {
        self.contact = contact.to_string();
        self
    }

    pub fn symbols(&self) -> [&str; 2] {
        [&self.anchor_symbol, &self.target_symbol]
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.anchor_symbol.is_empty() || self.target_symbol.is_empty() {
            return Err("anchor_symbol and target_symbol must be set".to_string());
        }
        if self.anchor_symbol == self.target_symbol {
            return Err("anchor_symbol and target_symbol must differ".to_string());
        }
        if self.disassembler.trim().is_empty() {
            return Err("disassembler must be set".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.symbols(), ["_current_thread", "_bsd_ast"]);
    }

    #[test]
    fn test_builder() {
        let config = Config::default()
            .with_disassembler("lldb")
            .with_stamp_timestamp(false)
            .with_contact("kernel@example.org");

        assert_eq!(config.disassembler, "lldb");
        assert!(!config.stamp_timestamp);
        assert_eq!(config.contact, "kernel@example.org");
    }

    #[test]
    fn test_validate_rejects_same_symbol() {
        let config = Config::default().with_target_symbol("_current_thread");
        assert!(config.validate().is_err());
        assert!(Config::default().with_anchor_symbol("").validate().is_err());
    }

    #[test]
    fn test_from_file_fills_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "disassembler": "/usr/local/bin/gdb", "stamp_timestamp": false }}"#).unwrap();

        let config = Config::from_file(file.path()).unwrap();

        assert_eq!(config.disassembler, "/usr/local/bin/gdb");
        assert!(!config.stamp_timestamp);
        assert_eq!(config.target_symbol, "_bsd_ast");
    }

    #[test]
    fn test_from_file_rejects_invalid() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "disassembler": " " }}"#).unwrap();

        assert!(Config::from_file(file.path()).is_err());
    }
}
