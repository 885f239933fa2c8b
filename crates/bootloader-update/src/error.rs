//! Error types for the update pipeline
//!
//! "Already up to date" is deliberately absent: it is a normal outcome,
//! reported through [`crate::UpdateCheck::UpToDate`].

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using the update pipeline's error type
pub type Result<T> = std::result::Result<T, UpdateError>;

/// Fatal failures of the update pipeline
#[derive(Error, Debug)]
pub enum UpdateError {
    /// Settings missing, blank, or malformed
    #[error("Configuration error: {0}")]
    Configuration(#[from] bootloader_core::Error),

    /// Update service answered with a status other than 2xx or 404
    #[error("Update service returned {status} for {url}")]
    Upstream {
        status: reqwest::StatusCode,
        url: String,
    },

    /// Reading or writing the application binary failed
    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Response body was not a valid update payload
    #[error("Malformed update payload: {0}")]
    Deserialization(#[from] serde_json::Error),

    /// HTTP request could not be completed
    #[error("Request to update service failed: {0}")]
    Transport(#[source] reqwest::Error),

    /// Update service did not answer in time
    #[error("Update service did not respond within {secs}s")]
    Timeout { secs: u64 },

    /// Caller cancelled the update check
    #[error("Update check cancelled")]
    Cancelled,
}

impl UpdateError {
    /// Create an IO error for the given path
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
