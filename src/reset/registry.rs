//! Revision-keyed reset-handler registry
//!
//! Built once at device bring-up. Revisions absent from the table get no
//! custom handler, which is not an error: recovery for them reports
//! `Unsupported` and the caller falls back to whatever legacy path it
//! has outside this crate.

use crate::device::{GpuDevice, HwVersion};
use crate::error::ResetError;
use crate::reset::context::ResetContext;
use crate::reset::handler::{Mode2Handler, PspHandler, ResetHandler};

#[derive(Debug, Clone, Copy)]
enum HandlerKind {
    Mode2,
    Psp,
}

/// Build-time table mapping hardware revisions to handler variants
const HANDLER_TABLE: &[(HwVersion, HandlerKind)] = &[
    (HwVersion::new(13, 0, 2), HandlerKind::Mode2),
    (HwVersion::new(13, 0, 6), HandlerKind::Mode2),
    (HwVersion::new(11, 0, 7), HandlerKind::Psp),
    (HwVersion::new(13, 0, 10), HandlerKind::Psp),
];

fn lookup(hw: HwVersion) -> Option<HandlerKind> {
    HANDLER_TABLE
        .iter()
        .find(|(version, _)| *version == hw)
        .map(|(_, kind)| *kind)
}

/// Maps a hardware revision to a concrete reset handler
pub struct ResetHandlerRegistry {
    handler: Option<ResetHandler>,
}

impl ResetHandlerRegistry {
    /// Look up the revision and run the matching variant's one-time
    /// setup. Unrecognized revisions succeed with no handler installed.
    pub fn init(hw: HwVersion) -> Result<Self, ResetError> {
        let handler = match lookup(hw) {
            Some(HandlerKind::Mode2) => {
                log::info!("reset handler mode2 installed for rev {}", hw);
                Some(ResetHandler::Mode2(Mode2Handler::new()))
            }
            Some(HandlerKind::Psp) => {
                log::info!("reset handler psp installed for rev {}", hw);
                Some(ResetHandler::Psp(PspHandler::new()))
            }
            None => {
                log::debug!("no custom reset handler for rev {}", hw);
                None
            }
        };

        Ok(Self { handler })
    }

    /// Mirror teardown of whatever `init` allocated; no-op if no handler
    /// was installed
    pub fn fini(&mut self) {
        if let Some(handler) = self.handler.take() {
            handler.fini();
        }
    }

    /// Whether a handler was installed for this hardware
    pub fn has_handler(&self) -> bool {
        self.handler.is_some()
    }

    /// Return the handler to use for this context, or `None` when the
    /// hardware/context combination is unsupported
    pub fn resolve(&self, ctx: &ResetContext) -> Option<&ResetHandler> {
        self.handler.as_ref().filter(|h| h.supports(ctx))
    }

    /// Dispatch the prepare phase, re-resolving for this call
    pub fn prepare_hwcontext<D: GpuDevice>(
        &self,
        device: &mut D,
        ctx: &ResetContext,
    ) -> Result<(), ResetError> {
        self.resolve(ctx)
            .ok_or(ResetError::Unsupported)?
            .prepare_hwcontext(device, ctx)
    }

    /// Dispatch the perform phase, re-resolving for this call
    pub fn perform_reset<D: GpuDevice>(
        &self,
        device: &mut D,
        ctx: &ResetContext,
    ) -> Result<(), ResetError> {
        self.resolve(ctx)
            .ok_or(ResetError::Unsupported)?
            .perform_reset(device, ctx)
    }

    /// Dispatch the restore phase, re-resolving for this call
    pub fn restore_hwcontext<D: GpuDevice>(
        &self,
        device: &mut D,
        ctx: &ResetContext,
    ) -> Result<(), ResetError> {
        self.resolve(ctx)
            .ok_or(ResetError::Unsupported)?
            .restore_hwcontext(device, ctx)
    }
}

impl Drop for ResetHandlerRegistry {
    fn drop(&mut self) {
        self.fini();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reset::context::ResetMethod;
    use crate::sim::{SimDevice, SimOp};

    #[test]
    fn test_known_revisions_install_handlers() {
        let registry = ResetHandlerRegistry::init(HwVersion::new(13, 0, 2)).unwrap();
        assert!(registry.has_handler());
        let handler = registry.resolve(&ResetContext::new(ResetMethod::Auto)).unwrap();
        assert_eq!(handler.name(), "mode2");

        let registry = ResetHandlerRegistry::init(HwVersion::new(11, 0, 7)).unwrap();
        let handler = registry.resolve(&ResetContext::new(ResetMethod::Auto)).unwrap();
        assert_eq!(handler.name(), "psp");
    }

    #[test]
    fn test_unknown_revision_is_not_an_error() {
        let mut registry = ResetHandlerRegistry::init(HwVersion::new(99, 9, 9)).unwrap();
        assert!(!registry.has_handler());
        assert!(registry.resolve(&ResetContext::new(ResetMethod::Auto)).is_none());
        // fini on an empty registry is a no-op
        registry.fini();
        registry.fini();
    }

    #[test]
    fn test_resolve_narrows_by_method() {
        let registry = ResetHandlerRegistry::init(HwVersion::new(13, 0, 2)).unwrap();
        // mode2 cannot serve a full-device request
        assert!(registry.resolve(&ResetContext::new(ResetMethod::Full)).is_none());
        assert!(registry.resolve(&ResetContext::new(ResetMethod::Engine)).is_some());
    }

    #[test]
    fn test_phase_dispatch_drives_full_sequence() {
        let registry = ResetHandlerRegistry::init(HwVersion::new(13, 0, 2)).unwrap();
        let mut device = SimDevice::new(HwVersion::new(13, 0, 2)).with_rings(1, 4);
        let ctx = ResetContext::new(ResetMethod::Engine);

        registry.prepare_hwcontext(&mut device, &ctx).unwrap();
        registry.perform_reset(&mut device, &ctx).unwrap();
        registry.restore_hwcontext(&mut device, &ctx).unwrap();

        assert_eq!(
            device.ops(),
            vec![SimOp::Quiesce, SimOp::SocReset { full: false }, SimOp::Resume]
        );
    }

    #[test]
    fn test_phase_dispatch_reresolves_each_call() {
        let registry = ResetHandlerRegistry::init(HwVersion::new(13, 0, 2)).unwrap();
        let mut device = SimDevice::new(HwVersion::new(13, 0, 2)).with_rings(1, 4);

        registry
            .prepare_hwcontext(&mut device, &ResetContext::new(ResetMethod::Engine))
            .unwrap();

        // A context the installed handler cannot serve is rejected at
        // the phase call itself, even mid-sequence.
        let err = registry
            .perform_reset(&mut device, &ResetContext::new(ResetMethod::Full))
            .unwrap_err();
        assert!(matches!(err, ResetError::Unsupported));
        assert!(!device
            .ops()
            .iter()
            .any(|op| matches!(op, SimOp::SocReset { .. })));
    }

    #[test]
    fn test_fini_releases_handler() {
        let mut registry = ResetHandlerRegistry::init(HwVersion::new(13, 0, 10)).unwrap();
        assert!(registry.has_handler());
        registry.fini();
        assert!(!registry.has_handler());
        assert!(registry.resolve(&ResetContext::new(ResetMethod::Auto)).is_none());
    }
}
