//! Error types and exit codes for skelcast

use std::process::ExitCode;
use thiserror::Error;

/// Main error type for skelcast operations
#[derive(Error, Debug)]
pub enum SkelcastError {
    #[error("Failed to open body-tracking sensor. Make sure the device is connected and drivers installed.")]
    SensorUnavailable,

    #[error("Failed to load replay file {path}: {message}")]
    ReplayLoad { path: String, message: String },

    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        source: std::io::Error,
    },
}

impl SkelcastError {
    /// Convert error to an exit code:
    /// - 0: Success
    /// - 1: Sensor unavailable
    /// - 2: Replay source unreadable
    /// - 3: Could not bind the listen address
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::SensorUnavailable => ExitCode::from(1),
            Self::ReplayLoad { .. } => ExitCode::from(2),
            Self::Bind { .. } => ExitCode::from(3),
        }
    }
}

/// Result type alias for skelcast operations
pub type Result<T> = std::result::Result<T, SkelcastError>;
