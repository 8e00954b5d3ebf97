//! Error types shared across CineLens crates.

use std::path::PathBuf;

/// Top-level error type for CineLens operations.
#[derive(Debug, thiserror::Error)]
pub enum CinelensError {
    #[error("Event log error: {message}")]
    EventLog { message: String },

    #[error("Motion engine error: {message}")]
    Motion { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Unsupported operation: {message}")]
    Unsupported { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using CinelensError.
pub type CinelensResult<T> = Result<T, CinelensError>;

impl CinelensError {
    pub fn event_log(msg: impl Into<String>) -> Self {
        Self::EventLog {
            message: msg.into(),
        }
    }

    pub fn motion(msg: impl Into<String>) -> Self {
        Self::Motion {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported {
            message: msg.into(),
        }
    }
}
