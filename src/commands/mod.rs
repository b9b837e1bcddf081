//! Command handlers for the resetctl binary

pub mod coredump;
pub mod simulate;

pub use coredump::run_coredump;
pub use simulate::run_simulate;

use crate::device::HwVersion;
use crate::error::{AppError, ConfigError, Result};

/// Parse a major.minor.patch revision string from the CLI
pub(crate) fn parse_hw_version(s: &str) -> Result<HwVersion> {
    s.parse().map_err(|message| {
        AppError::Config(ConfigError::InvalidValue {
            key: "hw-version".to_string(),
            message,
        })
    })
}
