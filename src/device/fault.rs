//! Page-fault and offending-task domain types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which memory hub observed the fault
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FaultHub {
    /// Graphics hub
    Gfx,
    /// Multimedia hub
    Mm,
}

impl fmt::Display for FaultHub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gfx => write!(f, "gfxhub"),
            Self::Mm => write!(f, "mmhub"),
        }
    }
}

/// Last observed unrecoverable page fault
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageFaultInfo {
    pub hub: FaultHub,
    /// Starting address of the faulting page
    pub address: u64,
    /// Raw protection fault status register value
    pub status: u32,
}

/// Identity of the process whose job triggered recovery (best-effort)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskInfo {
    pub process_name: String,
    pub pid: u32,
}

impl fmt::Display for TaskInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} PID: {}", self.process_name, self.pid)
    }
}
