//! Device abstraction layer
//!
//! Provides trait-based abstractions over the accelerator hardware so the
//! recovery core can be exercised against simulated devices in tests.

pub mod fault;
pub mod info;
pub mod ring;
pub mod traits;

pub use fault::{FaultHub, PageFaultInfo, TaskInfo};
pub use info::{DeviceInfo, HwVersion};
pub use ring::{RingId, RingSnapshot};
pub use traits::GpuDevice;
