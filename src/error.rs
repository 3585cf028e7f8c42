//! Library error types.
//!
//! Binaries wrap these in `anyhow` with context; per-item fetch failures inside
//! a batch are logged and counted by the aggregator instead of surfacing here.

use std::path::PathBuf;
use thiserror::Error;

/// Library result type alias
pub type Result<T> = std::result::Result<T, ScanError>;

#[derive(Debug, Error)]
pub enum ScanError {
    /// Unusable run configuration (empty keyword source, unsafe output paths, bad pattern)
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Transport-level failure (DNS, connect, timeout, body read)
    #[error("Failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        source: reqwest::Error,
    },

    /// Non-success HTTP status
    #[error("Failed to fetch {url}: HTTP {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    /// IO error with path context
    #[error("IO error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("CSV export error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ScanError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// True for errors caused by a single page request; these are recoverable within a batch.
    pub fn is_fetch_failure(&self) -> bool {
        matches!(self, Self::Fetch { .. } | Self::Status { .. })
    }
}
