//! Device coredump recorder
//!
//! Captures an immutable snapshot of device state at the moment recovery
//! begins, before any destructive step runs. Capture is best-effort: a
//! failure is logged and swallowed, never slowing down or aborting the
//! recovery path. Formatting the (potentially large) report is deferred
//! to whoever reads the artifact, and may never happen at all.

pub mod render;

use crate::device::{DeviceInfo, GpuDevice, PageFaultInfo, RingId, RingSnapshot, TaskInfo};
use crate::error::CoredumpError;
use crate::reset::ResetContext;

use std::sync::OnceLock;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Versioned textual schema identifier embedded in the report header
pub const COREDUMP_VERSION: &str = "1";

/// Immutable snapshot of device state, created once per reset attempt
///
/// Fields are filled synchronously and cheaply at capture time; no
/// formatting happens here. Never mutated after construction.
#[derive(Debug, Clone)]
pub struct CoredumpInfo {
    /// Capture time as an offset from the Unix epoch
    pub timestamp: Duration,
    /// Device identity at capture time
    pub device: DeviceInfo,
    /// Offending process, when known
    pub task: Option<TaskInfo>,
    /// Ring whose job triggered recovery, when known
    pub ring: Option<(RingId, String)>,
    /// Last observed page fault, when any
    pub fault: Option<PageFaultInfo>,
    /// Whether VRAM contents will be lost by this reset
    pub vram_lost: bool,
    /// Full contents and pointers of every ring on the device
    pub rings: Vec<RingSnapshot>,
    /// Register dump as (offset, value) pairs
    pub regs: Vec<(u32, u32)>,
}

impl CoredumpInfo {
    /// Snapshot device state for one reset attempt
    ///
    /// Must run before any destructive recovery step so the snapshot
    /// reflects pre-recovery state.
    pub fn capture<D: GpuDevice>(
        device: &D,
        vram_lost: bool,
        ctx: &ResetContext,
        reg_offsets: &[u32],
    ) -> Result<Self, CoredumpError> {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();

        let rings = device.ring_snapshots()?;
        let regs = device.dump_registers(reg_offsets);

        Ok(Self {
            timestamp,
            device: device.info(),
            task: ctx.job.as_ref().and_then(|j| j.task.clone()),
            ring: ctx.job.as_ref().map(|j| (j.ring, j.ring_name.clone())),
            fault: device.fault_info(),
            vram_lost,
            rings,
            regs,
        })
    }
}

/// Lazily rendered diagnostic artifact wrapping one snapshot
///
/// The report text is produced on first read and cached; every read of
/// the same artifact sees identical bytes. Dropping (or `discard`ing)
/// the artifact releases the snapshot's backing memory, after which no
/// further renders are possible.
pub struct Coredump {
    info: CoredumpInfo,
    rendered: OnceLock<String>,
}

impl Coredump {
    pub fn new(info: CoredumpInfo) -> Self {
        Self {
            info,
            rendered: OnceLock::new(),
        }
    }

    /// The retained snapshot
    pub fn info(&self) -> &CoredumpInfo {
        &self.info
    }

    fn report(&self) -> &str {
        self.rendered
            .get_or_init(|| render::render_report(&self.info))
    }

    /// Total length of the rendered report in bytes
    pub fn len(&self) -> usize {
        self.report().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy up to `buf.len()` bytes of the report starting at `offset`
    ///
    /// Returns the number of bytes copied; zero past the end.
    pub fn read(&self, offset: usize, buf: &mut [u8]) -> usize {
        let report = self.report().as_bytes();
        if offset >= report.len() {
            return 0;
        }
        let end = offset.saturating_add(buf.len()).min(report.len());
        let count = end - offset;
        buf[..count].copy_from_slice(&report[offset..end]);
        count
    }

    /// Produce exactly the requested byte range of the report
    ///
    /// The range is clamped to the report length.
    pub fn render(&self, offset: usize, length: usize) -> Vec<u8> {
        let report = self.report().as_bytes();
        if offset >= report.len() {
            return Vec::new();
        }
        let end = offset.saturating_add(length).min(report.len());
        report[offset..end].to_vec()
    }

    /// Release the snapshot without reading it
    pub fn discard(self) {}
}

/// Destination for finished artifacts (the surrounding platform's
/// crash/diagnostic facility; opaque to this crate)
pub trait DumpSink: Send + Sync {
    fn register(&self, dump: Coredump);
}

/// Coredump recorder configured with the register-dump list
///
/// One recorder serves every attempt on a device; each call to
/// [`CoredumpRecorder::capture`] produces an independent artifact.
pub struct CoredumpRecorder {
    enabled: bool,
    reg_offsets: Vec<u32>,
}

impl CoredumpRecorder {
    pub fn new(enabled: bool, reg_offsets: Vec<u32>) -> Self {
        Self {
            enabled,
            reg_offsets,
        }
    }

    /// Capture a snapshot, best-effort
    ///
    /// Failure is recorded in the log only; the caller's recovery path
    /// is never delayed or aborted by a capture failure.
    pub fn capture<D: GpuDevice>(
        &self,
        device: &D,
        vram_lost: bool,
        ctx: &ResetContext,
    ) -> Option<Coredump> {
        if !self.enabled {
            return None;
        }

        match CoredumpInfo::capture(device, vram_lost, ctx, &self.reg_offsets) {
            Ok(info) => Some(Coredump::new(info)),
            Err(e) => {
                log::warn!("coredump capture failed: {}", e);
                None
            }
        }
    }
}

impl Default for CoredumpRecorder {
    fn default() -> Self {
        Self::new(true, Vec::new())
    }
}
