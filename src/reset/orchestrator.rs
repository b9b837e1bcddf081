//! Three-phase reset protocol driver
//!
//! One call to [`ResetOrchestrator::run_attempt`] is one complete
//! attempt: acquire the domain, capture a coredump, then prepare,
//! perform, and restore through the resolved handler. Retry policy
//! belongs to the caller.

use crate::coredump::{CoredumpRecorder, DumpSink};
use crate::device::GpuDevice;
use crate::error::ResetError;
use crate::reset::context::ResetContext;
use crate::reset::domain::ResetDomain;
use crate::reset::registry::ResetHandlerRegistry;

use serde::Serialize;
use std::fmt;

/// Phase the current (or last) attempt is in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AttemptState {
    Idle,
    Preparing,
    Resetting,
    Restoring,
    Aborted,
}

impl fmt::Display for AttemptState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Preparing => write!(f, "preparing"),
            Self::Resetting => write!(f, "resetting"),
            Self::Restoring => write!(f, "restoring"),
            Self::Aborted => write!(f, "aborted"),
        }
    }
}

/// Drives the prepare/perform/restore protocol for one device
pub struct ResetOrchestrator<'a> {
    registry: &'a ResetHandlerRegistry,
    recorder: CoredumpRecorder,
    sink: Option<Box<dyn DumpSink>>,
    state: AttemptState,
}

impl<'a> ResetOrchestrator<'a> {
    pub fn new(registry: &'a ResetHandlerRegistry) -> Self {
        Self {
            registry,
            recorder: CoredumpRecorder::default(),
            sink: None,
            state: AttemptState::Idle,
        }
    }

    /// Use a configured recorder instead of the default one
    pub fn with_recorder(mut self, recorder: CoredumpRecorder) -> Self {
        self.recorder = recorder;
        self
    }

    /// Register the destination for captured artifacts
    pub fn with_sink(mut self, sink: Box<dyn DumpSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Phase of the current attempt, or where the last one ended
    pub fn state(&self) -> AttemptState {
        self.state
    }

    /// Run one complete reset attempt
    ///
    /// Holds the domain's exclusive lock from before the coredump
    /// capture until after restore (or the abort). The terminal result
    /// is also recorded in the domain's last-reset-result atomic.
    pub fn run_attempt<D: GpuDevice>(
        &mut self,
        domain: &ResetDomain,
        device: &mut D,
        ctx: &ResetContext,
    ) -> Result<(), ResetError> {
        self.state = AttemptState::Idle;

        let guard = domain.lock();
        let result = self.locked_attempt(device, ctx);
        match &result {
            Ok(()) => domain.set_last_reset_result(0),
            Err(e) => domain.set_last_reset_result(e.code()),
        }
        drop(guard);

        result
    }

    fn locked_attempt<D: GpuDevice>(
        &mut self,
        device: &mut D,
        ctx: &ResetContext,
    ) -> Result<(), ResetError> {
        let registry = self.registry;
        let Some(handler) = registry.resolve(ctx) else {
            // No handler: fail fast with no side effects, state stays
            // Idle so the caller can distinguish this from an abort.
            return Err(ResetError::Unsupported);
        };

        log::info!(
            "reset attempt on {} via {} (method {})",
            device.info(),
            handler.name(),
            ctx.method
        );

        // Snapshot before anything destructive runs. A capture failure
        // must not change the course of the attempt. VRAM fate follows
        // the handler that will run, not the requested scope: an Auto
        // request served by psp still wipes VRAM.
        let vram_lost = handler.loses_vram();
        if let Some(dump) = self.recorder.capture(device, vram_lost, ctx) {
            match &self.sink {
                Some(sink) => sink.register(dump),
                None => {
                    log::debug!("coredump captured but no sink registered, discarding");
                    dump.discard();
                }
            }
        }

        // The phases dispatch through the registry, which re-resolves
        // the handler for each call. The up-front resolve above only
        // serves the fast-fail path and the VRAM-fate decision.
        self.state = AttemptState::Preparing;
        if let Err(e) = registry.prepare_hwcontext(device, ctx) {
            log::error!("prepare failed: {}", e);
            self.state = AttemptState::Aborted;
            return Err(e);
        }

        // Point of no return: perform must run to completion.
        self.state = AttemptState::Resetting;
        if let Err(e) = registry.perform_reset(device, ctx) {
            log::error!("hardware reset failed, device state indeterminate: {}", e);
            self.state = AttemptState::Aborted;
            return Err(e);
        }

        self.state = AttemptState::Restoring;
        if let Err(e) = registry.restore_hwcontext(device, ctx) {
            log::error!("restore failed after successful reset: {}", e);
            self.state = AttemptState::Aborted;
            return Err(e);
        }

        log::info!("reset attempt completed on {}", device.info());
        self.state = AttemptState::Idle;
        Ok(())
    }
}
