//! Simulated accelerator device
//!
//! Backs the `simulate`/`coredump` CLI commands and the unit tests.
//! Supports scripted failure injection at each hardware touchpoint and
//! records every destructive operation so tests can assert ordering.

use crate::device::{DeviceInfo, GpuDevice, HwVersion, PageFaultInfo, RingId, RingSnapshot};
use crate::error::DeviceError;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

/// Hardware touchpoint at which a scripted failure fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailPoint {
    /// Ring snapshotting (feeds both capture and prepare)
    Snapshot,
    /// Ring quiesce in the prepare phase
    Quiesce,
    /// The reset itself
    SocReset,
    /// Ring resume in the restore phase
    Resume,
}

/// Destructive operation recorded by the simulator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimOp {
    Quiesce,
    SocReset { full: bool },
    Resume,
}

/// Shared operation log; entries are (device name, operation)
pub type SimLog = Arc<Mutex<Vec<(String, SimOp)>>>;

struct FailScript {
    point: FailPoint,
    once: bool,
    spent: bool,
}

/// Simulated device with scripted failures
pub struct SimDevice {
    name: String,
    hw_version: HwVersion,
    rings: Vec<RingSnapshot>,
    fault: Option<PageFaultInfo>,
    registers: HashMap<u32, u32>,
    reset_delay: Duration,
    fail: Mutex<Option<FailScript>>,
    log: SimLog,
}

impl SimDevice {
    /// Create a device with no rings and no scripted failures
    pub fn new(hw_version: HwVersion) -> Self {
        Self {
            name: "sim0".to_string(),
            hw_version,
            rings: Vec::new(),
            fault: None,
            registers: HashMap::new(),
            reset_delay: Duration::ZERO,
            fail: Mutex::new(None),
            log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Builder: set the device name
    pub fn named(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    /// Builder: populate `count` rings of `dwords` dwords each
    pub fn with_rings(mut self, count: u32, dwords: usize) -> Self {
        self.rings = (0..count)
            .map(|i| RingSnapshot {
                id: RingId(i),
                name: ring_name(i),
                rptr: 0,
                wptr: dwords as u64 / 2,
                mask: dwords.saturating_sub(1) as u32,
                data: vec![0; dwords],
            })
            .collect();
        self
    }

    /// Builder: fill every ring with one value
    pub fn with_ring_value(mut self, value: u32) -> Self {
        for ring in &mut self.rings {
            ring.data.fill(value);
        }
        self
    }

    /// Builder: set a last observed page fault
    pub fn with_fault(mut self, fault: PageFaultInfo) -> Self {
        self.fault = Some(fault);
        self
    }

    /// Builder: make a register readable
    pub fn with_register(mut self, offset: u32, value: u32) -> Self {
        self.registers.insert(offset, value);
        self
    }

    /// Builder: fail every operation at `point`
    pub fn with_fail(self, point: FailPoint) -> Self {
        *self.fail.lock().unwrap() = Some(FailScript {
            point,
            once: false,
            spent: false,
        });
        self
    }

    /// Builder: fail only the first operation at `point`
    pub fn with_fail_once(self, point: FailPoint) -> Self {
        *self.fail.lock().unwrap() = Some(FailScript {
            point,
            once: true,
            spent: false,
        });
        self
    }

    /// Builder: make `soc_reset` take this long
    pub fn with_reset_delay(mut self, delay: Duration) -> Self {
        self.reset_delay = delay;
        self
    }

    /// Builder: share an operation log with other simulated devices
    pub fn with_shared_log(mut self, log: SimLog) -> Self {
        self.log = log;
        self
    }

    /// Destructive operations this device saw, in order
    pub fn ops(&self) -> Vec<SimOp> {
        self.log
            .lock()
            .unwrap()
            .iter()
            .filter(|(name, _)| *name == self.name)
            .map(|(_, op)| *op)
            .collect()
    }

    fn should_fail(&self, point: FailPoint) -> bool {
        let mut script = self.fail.lock().unwrap();
        match script.as_mut() {
            Some(s) if s.point == point && !s.spent => {
                if s.once {
                    s.spent = true;
                }
                true
            }
            _ => false,
        }
    }

    fn record(&self, op: SimOp) {
        self.log.lock().unwrap().push((self.name.clone(), op));
    }
}

fn ring_name(index: u32) -> String {
    match index {
        0 => "gfx".to_string(),
        1 => "comp0".to_string(),
        2 => "sdma0".to_string(),
        n => format!("ring{}", n),
    }
}

impl GpuDevice for SimDevice {
    fn info(&self) -> DeviceInfo {
        DeviceInfo::new(self.name.clone(), self.hw_version)
            .with_pci_bus_id("0000:03:00.0".to_string())
    }

    fn ring_snapshots(&self) -> Result<Vec<RingSnapshot>, DeviceError> {
        if self.should_fail(FailPoint::Snapshot) {
            return Err(DeviceError::SnapshotUnavailable(
                "simulated allocation failure".into(),
            ));
        }
        Ok(self.rings.clone())
    }

    fn fault_info(&self) -> Option<PageFaultInfo> {
        self.fault
    }

    fn read_register(&self, offset: u32) -> Result<u32, DeviceError> {
        self.registers
            .get(&offset)
            .copied()
            .ok_or(DeviceError::RegisterAccess { offset })
    }

    fn quiesce(&mut self) -> Result<(), DeviceError> {
        self.record(SimOp::Quiesce);
        if self.should_fail(FailPoint::Quiesce) {
            return Err(DeviceError::RingStalled("gfx".into()));
        }
        Ok(())
    }

    fn soc_reset(&mut self, full: bool) -> Result<(), DeviceError> {
        self.record(SimOp::SocReset { full });
        if !self.reset_delay.is_zero() {
            thread::sleep(self.reset_delay);
        }
        if self.should_fail(FailPoint::SocReset) {
            return Err(DeviceError::HwTimeout("soc reset".into()));
        }
        if full {
            // A full reset wipes VRAM-backed ring contents.
            for ring in &mut self.rings {
                ring.data.fill(0);
                ring.rptr = 0;
                ring.wptr = 0;
            }
        }
        Ok(())
    }

    fn resume(&mut self, rings: &[RingSnapshot]) -> Result<(), DeviceError> {
        self.record(SimOp::Resume);
        if self.should_fail(FailPoint::Resume) {
            return Err(DeviceError::HwTimeout("ring resume".into()));
        }
        // Reprogram each ring from its saved snapshot.
        for saved in rings {
            if let Some(ring) = self.rings.iter_mut().find(|r| r.id == saved.id) {
                ring.data = saved.data.clone();
                ring.rptr = saved.rptr;
                ring.wptr = saved.wptr;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sim_device_rings() {
        let device = SimDevice::new(HwVersion::new(13, 0, 2)).with_rings(3, 8);
        let rings = device.ring_snapshots().unwrap();
        assert_eq!(rings.len(), 3);
        assert_eq!(rings[0].name, "gfx");
        assert_eq!(rings[1].name, "comp0");
        assert_eq!(rings[0].size_dwords(), 8);
    }

    #[test]
    fn test_register_reads() {
        let device = SimDevice::new(HwVersion::new(13, 0, 2)).with_register(0x98, 42);
        assert_eq!(device.read_register(0x98).unwrap(), 42);
        assert!(matches!(
            device.read_register(0x9c),
            Err(DeviceError::RegisterAccess { offset: 0x9c })
        ));
        // dump_registers silently skips unreadable offsets
        assert_eq!(device.dump_registers(&[0x98, 0x9c]), vec![(0x98, 42)]);
    }

    #[test]
    fn test_fail_once_fires_once() {
        let device = SimDevice::new(HwVersion::new(13, 0, 2))
            .with_rings(1, 4)
            .with_fail_once(FailPoint::Snapshot);
        assert!(device.ring_snapshots().is_err());
        assert!(device.ring_snapshots().is_ok());
    }

    #[test]
    fn test_persistent_fail_keeps_firing() {
        let mut device = SimDevice::new(HwVersion::new(13, 0, 2)).with_fail(FailPoint::Resume);
        assert!(device.resume(&[]).is_err());
        assert!(device.resume(&[]).is_err());
    }

    #[test]
    fn test_full_reset_wipes_rings() {
        let mut device = SimDevice::new(HwVersion::new(11, 0, 7))
            .with_rings(1, 4)
            .with_ring_value(0xcafe);
        device.soc_reset(true).unwrap();
        assert_eq!(device.ring_snapshots().unwrap()[0].data, vec![0; 4]);
    }

    #[test]
    fn test_resume_reprograms_saved_rings() {
        let mut device = SimDevice::new(HwVersion::new(11, 0, 7))
            .with_rings(1, 4)
            .with_ring_value(0xcafe);
        let saved = device.ring_snapshots().unwrap();
        device.soc_reset(true).unwrap();
        assert_eq!(device.ring_snapshots().unwrap()[0].data, vec![0; 4]);
        device.resume(&saved).unwrap();
        let restored = device.ring_snapshots().unwrap();
        assert_eq!(restored[0].data, vec![0xcafe; 4]);
        assert_eq!(restored[0].wptr, saved[0].wptr);
    }

    #[test]
    fn test_ops_recorded_in_order() {
        let mut device = SimDevice::new(HwVersion::new(13, 0, 2)).with_rings(1, 4);
        device.quiesce().unwrap();
        device.soc_reset(false).unwrap();
        device.resume(&[]).unwrap();
        assert_eq!(
            device.ops(),
            vec![SimOp::Quiesce, SimOp::SocReset { full: false }, SimOp::Resume]
        );
    }
}
