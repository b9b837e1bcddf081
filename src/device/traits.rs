//! Trait definitions for device operations
//!
//! These traits abstract over the accelerator hardware to enable testing
//! with simulated devices.

use crate::device::{DeviceInfo, HwVersion, PageFaultInfo, RingSnapshot};
use crate::error::DeviceError;

/// Trait for accelerator device operations
///
/// The read-only half feeds diagnostic capture; the narrow destructive
/// surface (`quiesce`/`soc_reset`/`resume`) is what reset handlers drive.
/// Vendor-specific register sequences stay behind this trait.
pub trait GpuDevice: Send + Sync {
    /// Get device information
    fn info(&self) -> DeviceInfo;

    /// Hardware revision used for reset-handler dispatch
    fn hw_version(&self) -> HwVersion {
        self.info().hw_version
    }

    /// Snapshot the full contents and pointers of every ring
    ///
    /// Must be cheap (a raw memory copy); called on the locked recovery
    /// path before any destructive step.
    fn ring_snapshots(&self) -> Result<Vec<RingSnapshot>, DeviceError>;

    /// Last observed unrecoverable page fault, if any
    fn fault_info(&self) -> Option<PageFaultInfo>;

    /// Read a single register
    fn read_register(&self, offset: u32) -> Result<u32, DeviceError>;

    /// Read a list of registers, skipping any that fail
    ///
    /// Used for the coredump register table; capture is best-effort so
    /// an unreadable register is dropped rather than propagated.
    fn dump_registers(&self, offsets: &[u32]) -> Vec<(u32, u32)> {
        offsets
            .iter()
            .filter_map(|&offset| self.read_register(offset).ok().map(|v| (offset, v)))
            .collect()
    }

    // Destructive surface, driven by reset handlers only.

    /// Stop ring processing and fence off new submissions
    ///
    /// Must be reversible by `resume` without an intervening reset; the
    /// prepare phase relies on that.
    fn quiesce(&mut self) -> Result<(), DeviceError>;

    /// Execute the hardware reset
    ///
    /// `full` selects a whole-device reset over an engine-only one.
    /// Irreversible; there is no way to cancel once this is entered.
    fn soc_reset(&mut self, full: bool) -> Result<(), DeviceError>;

    /// Reprogram the saved ring state and resume processing after a
    /// successful reset
    ///
    /// `rings` is the snapshot taken by the prepare phase; an empty
    /// slice resumes with whatever state the device currently holds.
    fn resume(&mut self, rings: &[RingSnapshot]) -> Result<(), DeviceError>;
}
