//! resetctl - GPU reset coordination library
//!
//! This library provides the core machinery for recovering a hung
//! compute/graphics accelerator: reset domains that serialize recovery
//! against normal device use, revision-keyed reset handlers, the
//! three-phase prepare/perform/restore protocol, and a lazily rendered
//! device coredump.
//!
//! # Modules
//!
//! - [`cli`]: Command-line interface definitions
//! - [`commands`]: Command handlers
//! - [`config`]: Configuration system
//! - [`coredump`]: Diagnostic snapshot capture and rendering
//! - [`device`]: Device abstraction layer
//! - [`error`]: Error types
//! - [`reset`]: Reset domain, handler dispatch, and orchestration
//! - [`sim`]: Simulated device for tests and the CLI

pub mod cli;
pub mod commands;
pub mod config;
pub mod coredump;
pub mod device;
pub mod error;
pub mod reset;
pub mod sim;

pub use error::{AppError, Result};
