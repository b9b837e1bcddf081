//! Configuration system
//!
//! Recovery policy defaults come from a TOML file: the default reset
//! method, whether coredumps are captured, and which register offsets
//! land in the coredump register table.

pub mod file;

pub use file::ConfigFile;

use crate::reset::ResetMethod;
use serde::{Deserialize, Serialize};

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub recovery: RecoveryConfig,
}

/// Recovery policy settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecoveryConfig {
    /// Default reset method when the caller does not request one
    pub method: ResetMethod,
    /// Whether to capture a coredump before each attempt
    pub coredump: bool,
    /// Register offsets dumped into the coredump register table
    pub reg_dump: Vec<u32>,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            method: ResetMethod::Auto,
            coredump: true,
            reg_dump: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.recovery.method, ResetMethod::Auto);
        assert!(config.recovery.coredump);
        assert!(config.recovery.reg_dump.is_empty());
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
            [recovery]
            method = "engine"
            coredump = false
            reg_dump = [0x98, 0x9c]
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.recovery.method, ResetMethod::Engine);
        assert!(!config.recovery.coredump);
        assert_eq!(config.recovery.reg_dump, vec![0x98, 0x9c]);
    }

    #[test]
    fn test_parse_partial_config_uses_defaults() {
        let toml = r#"
            [recovery]
            method = "full"
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.recovery.method, ResetMethod::Full);
        assert!(config.recovery.coredump);
    }

    #[test]
    fn test_unknown_method_rejected() {
        let toml = r#"
            [recovery]
            method = "warp"
        "#;
        assert!(toml::from_str::<Config>(toml).is_err());
    }
}
