//! Hardware-revision-specific reset handlers
//!
//! The handler set is closed and known at build time, so dispatch is a
//! tagged enum over concrete variants rather than open dynamic dispatch.
//! Handlers are stateless across attempts apart from the saved-context
//! slot allocated at init and released at fini; attempts on one domain
//! are serialized by the domain lock, so the slot is never contended by
//! two live attempts.
//!
//! Contract for every variant: the prepare phase is all-or-nothing. It
//! must not leave partial destructive mutation behind when it fails;
//! everything it does has to be undone by `resume` without a reset in
//! between. The orchestrator does not (and cannot) enforce this.

use crate::device::{GpuDevice, RingSnapshot};
use crate::error::{DeviceError, ResetError};
use crate::reset::context::{ResetContext, ResetMethod};

use std::sync::Mutex;

/// Soft state a handler saves in prepare and reprograms in restore
#[derive(Debug)]
struct SavedContext {
    rings: Vec<RingSnapshot>,
}

/// Engine-only ("mode 2") reset handler
///
/// Resets the compute/graphics engines while leaving VRAM intact.
pub struct Mode2Handler {
    saved: Mutex<Option<SavedContext>>,
}

impl Mode2Handler {
    pub(crate) fn new() -> Self {
        Self {
            saved: Mutex::new(None),
        }
    }

    fn prepare<D: GpuDevice>(&self, device: &mut D, _ctx: &ResetContext) -> Result<(), DeviceError> {
        let rings = device.ring_snapshots()?;
        device.quiesce()?;
        *self.saved.lock().unwrap_or_else(|p| p.into_inner()) = Some(SavedContext { rings });
        Ok(())
    }

    fn perform<D: GpuDevice>(&self, device: &mut D, _ctx: &ResetContext) -> Result<(), DeviceError> {
        device.soc_reset(false)
    }

    fn restore<D: GpuDevice>(&self, device: &mut D, _ctx: &ResetContext) -> Result<(), DeviceError> {
        let saved = self
            .saved
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .take()
            .ok_or_else(|| DeviceError::SnapshotUnavailable("no saved hardware context".into()))?;
        log::debug!("mode2: restoring {} saved rings", saved.rings.len());
        device.resume(&saved.rings)
    }

    fn fini(&self) {
        *self.saved.lock().unwrap_or_else(|p| p.into_inner()) = None;
    }
}

/// Whole-chip reset handler driven through the security processor
///
/// VRAM contents do not survive this reset.
pub struct PspHandler {
    saved: Mutex<Option<SavedContext>>,
}

impl PspHandler {
    pub(crate) fn new() -> Self {
        Self {
            saved: Mutex::new(None),
        }
    }

    fn prepare<D: GpuDevice>(&self, device: &mut D, _ctx: &ResetContext) -> Result<(), DeviceError> {
        // No quiesce: the whole chip goes down anyway. Only the soft
        // state needed to rebuild the rings afterwards is kept.
        let rings = device.ring_snapshots()?;
        *self.saved.lock().unwrap_or_else(|p| p.into_inner()) = Some(SavedContext { rings });
        Ok(())
    }

    fn perform<D: GpuDevice>(&self, device: &mut D, _ctx: &ResetContext) -> Result<(), DeviceError> {
        device.soc_reset(true)
    }

    fn restore<D: GpuDevice>(&self, device: &mut D, _ctx: &ResetContext) -> Result<(), DeviceError> {
        let saved = self
            .saved
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .take()
            .ok_or_else(|| DeviceError::SnapshotUnavailable("no saved hardware context".into()))?;
        log::debug!("psp: reinitializing {} rings after full reset", saved.rings.len());
        device.resume(&saved.rings)
    }

    fn fini(&self) {
        *self.saved.lock().unwrap_or_else(|p| p.into_inner()) = None;
    }
}

/// Concrete reset-handler variant selected per hardware revision
pub enum ResetHandler {
    Mode2(Mode2Handler),
    Psp(PspHandler),
}

impl ResetHandler {
    /// Handler name for logs and reports
    pub fn name(&self) -> &'static str {
        match self {
            Self::Mode2(_) => "mode2",
            Self::Psp(_) => "psp",
        }
    }

    /// Whether VRAM contents survive this handler's reset
    ///
    /// Determined by the handler that will actually run, not by the
    /// requested scope: psp takes the whole chip down even when the
    /// caller only asked for `Auto`.
    pub fn loses_vram(&self) -> bool {
        matches!(self, Self::Psp(_))
    }

    /// Whether this handler can serve the given context
    pub fn supports(&self, ctx: &ResetContext) -> bool {
        match self {
            // Engine-only reset cannot satisfy a full-device request.
            Self::Mode2(_) => {
                !ctx.full_reset && matches!(ctx.method, ResetMethod::Auto | ResetMethod::Engine)
            }
            Self::Psp(_) => matches!(ctx.method, ResetMethod::Auto | ResetMethod::Full),
        }
    }

    /// Prepare phase: save resumable state, no irreversible changes
    pub fn prepare_hwcontext<D: GpuDevice>(
        &self,
        device: &mut D,
        ctx: &ResetContext,
    ) -> Result<(), ResetError> {
        match self {
            Self::Mode2(h) => h.prepare(device, ctx),
            Self::Psp(h) => h.prepare(device, ctx),
        }
        .map_err(ResetError::PrepareFailed)
    }

    /// Perform phase: the actual hardware reset, not cancellable
    pub fn perform_reset<D: GpuDevice>(
        &self,
        device: &mut D,
        ctx: &ResetContext,
    ) -> Result<(), ResetError> {
        match self {
            Self::Mode2(h) => h.perform(device, ctx),
            Self::Psp(h) => h.perform(device, ctx),
        }
        .map_err(ResetError::ResetFailed)
    }

    /// Restore phase: reprogram saved state, resume operation
    pub fn restore_hwcontext<D: GpuDevice>(
        &self,
        device: &mut D,
        ctx: &ResetContext,
    ) -> Result<(), ResetError> {
        match self {
            Self::Mode2(h) => h.restore(device, ctx),
            Self::Psp(h) => h.restore(device, ctx),
        }
        .map_err(ResetError::RestoreFailed)
    }

    /// Release handler-private resources
    pub(crate) fn fini(&self) {
        match self {
            Self::Mode2(h) => h.fini(),
            Self::Psp(h) => h.fini(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode2_rejects_full_requests() {
        let handler = ResetHandler::Mode2(Mode2Handler::new());
        assert!(handler.supports(&ResetContext::new(ResetMethod::Auto)));
        assert!(handler.supports(&ResetContext::new(ResetMethod::Engine)));
        assert!(!handler.supports(&ResetContext::new(ResetMethod::Full)));
        assert!(!handler.supports(&ResetContext::new(ResetMethod::Auto).with_full_reset()));
    }

    #[test]
    fn test_psp_rejects_engine_requests() {
        let handler = ResetHandler::Psp(PspHandler::new());
        assert!(handler.supports(&ResetContext::new(ResetMethod::Auto)));
        assert!(handler.supports(&ResetContext::new(ResetMethod::Full)));
        assert!(!handler.supports(&ResetContext::new(ResetMethod::Engine)));
    }

    #[test]
    fn test_handler_names() {
        assert_eq!(ResetHandler::Mode2(Mode2Handler::new()).name(), "mode2");
        assert_eq!(ResetHandler::Psp(PspHandler::new()).name(), "psp");
    }

    #[test]
    fn test_vram_survival_per_handler() {
        assert!(!ResetHandler::Mode2(Mode2Handler::new()).loses_vram());
        assert!(ResetHandler::Psp(PspHandler::new()).loses_vram());
    }
}
