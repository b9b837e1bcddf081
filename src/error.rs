//! Unified error types for resetctl
//!
//! This module defines all error types used throughout the crate.
//! Uses thiserror for ergonomic error definitions.

use thiserror::Error;

/// Top-level application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a recovery attempt
    #[error("Reset error: {0}")]
    Reset(#[from] ResetError),

    /// Error from device access
    #[error("Device error: {0}")]
    Device(#[from] DeviceError),

    /// Error from configuration parsing/validation
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Terminal result of a single reset attempt
///
/// One attempt produces exactly one of these; there is no partial or
/// streaming status.
#[derive(Error, Debug)]
pub enum ResetError {
    /// No reset handler matches this hardware/context combination
    #[error("No reset handler for this hardware/context combination")]
    Unsupported,

    /// The prepare phase failed; the device is unchanged
    #[error("Reset preparation failed: {0}")]
    PrepareFailed(#[source] DeviceError),

    /// The perform phase failed; device state is indeterminate and the
    /// caller must assume a full reinitialization is needed
    #[error("Hardware reset failed: {0}")]
    ResetFailed(#[source] DeviceError),

    /// The restore phase failed; the reset itself succeeded but
    /// restoration is incomplete
    #[error("Post-reset restore failed: {0}")]
    RestoreFailed(#[source] DeviceError),

    /// Domain or worker-queue allocation failed; nothing was partially
    /// constructed
    #[error("Resource exhausted: {0}")]
    ResourceExhausted(String),
}

impl ResetError {
    /// Errno-style code stored in the domain's last-reset-result atomic.
    /// Zero is reserved for success.
    pub fn code(&self) -> i32 {
        match self {
            ResetError::Unsupported => -95,
            ResetError::PrepareFailed(_) => -16,
            ResetError::ResetFailed(_) => -5,
            ResetError::RestoreFailed(_) => -121,
            ResetError::ResourceExhausted(_) => -12,
        }
    }
}

/// Errors from device access, raised by `GpuDevice` implementations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeviceError {
    /// A hardware operation did not complete in time
    #[error("Hardware timeout during {0}")]
    HwTimeout(String),

    /// A register read or write failed
    #[error("Register access failed at offset {offset:#010x}")]
    RegisterAccess { offset: u32 },

    /// A ring refused to quiesce
    #[error("Ring {0} failed to quiesce")]
    RingStalled(String),

    /// The device fell off the bus or stopped responding entirely
    #[error("Device is lost or has become inaccessible")]
    DeviceLost,

    /// Operation not supported by this device
    #[error("Operation not supported: {0}")]
    NotSupported(String),

    /// Snapshot data could not be produced
    #[error("Snapshot unavailable: {0}")]
    SnapshotUnavailable(String),
}

/// Errors from diagnostic capture
///
/// These are logged and swallowed at the capture boundary; they never
/// alter the outcome of the surrounding reset attempt.
#[derive(Error, Debug)]
pub enum CoredumpError {
    /// Snapshot allocation or copy failed
    #[error("Failed to snapshot device state: {0}")]
    Capture(#[from] DeviceError),
}

/// Errors from configuration parsing and validation
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file not found
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    /// Invalid config value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;
