//! Crate-level error type.
//!
//! Only conditions that end the program are represented here. Per-device
//! trouble (a node that will not open, a rejected grab, a failed probe or read)
//! is logged where it happens and never becomes an [`Error`].

use std::path::PathBuf;

/// Fatal errors surfaced to the binary.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Generic I/O failure outside of any single device.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration file exists but could not be read or parsed.
    #[error("invalid configuration {path}: {reason}")]
    Config { path: PathBuf, reason: String },

    /// Discovery found nothing usable under the configured directory.
    #[error("no input devices found matching {prefix}* in {directory}")]
    NoInputDevices { directory: PathBuf, prefix: String },

    /// No renderable surface could be produced.
    #[error("failed to acquire render surface: {0}")]
    Surface(String),

    /// The multiplexing wait itself failed (not a single device).
    #[error("poll failed: {0}")]
    Poll(std::io::Error),

    /// Registry report serialization failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;
