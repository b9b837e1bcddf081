//! Device identification domain types
//!
//! Provides the hardware revision identifier that keys reset-handler
//! dispatch, and general device metadata.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Hardware revision identifier (major/minor/patch of the power
/// management IP block)
///
/// Reset handlers are selected by exact revision match; revisions with
/// no matching handler simply have no custom reset support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HwVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl HwVersion {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl fmt::Display for HwVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for HwVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split('.');
        let mut next = || {
            parts
                .next()
                .ok_or_else(|| format!("Invalid hardware version: {}", s))?
                .parse::<u32>()
                .map_err(|_| format!("Invalid hardware version: {}", s))
        };
        let version = HwVersion::new(next()?, next()?, next()?);
        if parts.next().is_some() {
            return Err(format!("Invalid hardware version: {}", s));
        }
        Ok(version)
    }
}

/// Device information and identification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// Device name (e.g., "gfx-accel 0")
    pub name: String,
    /// Hardware revision of the power management IP
    pub hw_version: HwVersion,
    /// PCI bus ID
    pub pci_bus_id: Option<String>,
    /// Firmware version string
    pub firmware_version: Option<String>,
}

impl DeviceInfo {
    /// Create new device info
    pub fn new(name: String, hw_version: HwVersion) -> Self {
        Self {
            name,
            hw_version,
            pci_bus_id: None,
            firmware_version: None,
        }
    }

    /// Set the PCI bus ID
    pub fn with_pci_bus_id(mut self, bus_id: String) -> Self {
        self.pci_bus_id = Some(bus_id);
        self
    }

    /// Set the firmware version
    pub fn with_firmware_version(mut self, version: String) -> Self {
        self.firmware_version = Some(version);
        self
    }
}

impl fmt::Display for DeviceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (rev {})", self.name, self.hw_version)
    }
}
