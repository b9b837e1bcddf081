//! Reset coordination core
//!
//! A [`ResetDomain`] serializes recovery against normal device use, the
//! [`ResetHandlerRegistry`] dispatches to a hardware-revision-specific
//! handler, and the [`ResetOrchestrator`] drives the three-phase
//! prepare/perform/restore protocol.

pub mod context;
pub mod domain;
pub mod handler;
pub mod orchestrator;
pub mod queue;
pub mod registry;

pub use context::{JobInfo, ResetContext, ResetMethod};
pub use domain::{DomainKind, ResetDomain, ResetGuard};
pub use handler::ResetHandler;
pub use orchestrator::{AttemptState, ResetOrchestrator};
pub use queue::ResetQueue;
pub use registry::ResetHandlerRegistry;
