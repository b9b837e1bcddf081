//! Per-attempt reset context

use crate::device::{RingId, TaskInfo};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Requested reset method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResetMethod {
    /// Let the handler pick whatever it supports
    Auto,
    /// Engine-only reset, VRAM preserved
    Engine,
    /// Whole-chip reset, VRAM contents lost
    Full,
}

impl Default for ResetMethod {
    fn default() -> Self {
        Self::Auto
    }
}

impl fmt::Display for ResetMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::Engine => write!(f, "engine"),
            Self::Full => write!(f, "full"),
        }
    }
}

/// The job that triggered recovery (best-effort identification)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobInfo {
    /// Ring the hung job was submitted on
    pub ring: RingId,
    /// Ring name for diagnostics
    pub ring_name: String,
    /// Owning process, when known
    pub task: Option<TaskInfo>,
}

/// Per-attempt data bundle threaded through the three phases
///
/// Created by the recovery caller, consumed across prepare, perform, and
/// restore, discarded after the attempt.
#[derive(Debug, Clone, Default)]
pub struct ResetContext {
    /// Triggering job, if recovery was started by a hang rather than a
    /// manual request
    pub job: Option<JobInfo>,
    /// Requested reset method
    pub method: ResetMethod,
    /// Request a full (whole-device) reset regardless of method support
    pub full_reset: bool,
}

impl ResetContext {
    pub fn new(method: ResetMethod) -> Self {
        Self {
            job: None,
            method,
            full_reset: matches!(method, ResetMethod::Full),
        }
    }

    /// Attach the triggering job
    pub fn with_job(mut self, job: JobInfo) -> Self {
        self.job = Some(job);
        self
    }

    /// Request a full device reset
    pub fn with_full_reset(mut self) -> Self {
        self.full_reset = true;
        self
    }
}
