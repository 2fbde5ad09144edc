//! Typed error hierarchy for the activity pipeline.
//!
//! Three top-level enums cover the three subsystems:
//! - `ProxyError`: upstream fetch and validation failures on the server side
//! - `WidgetError`: proxy call failures on the client side
//! - `CacheError`: local cache storage failures

use thiserror::Error;

/// Errors from fetching and validating the upstream contributions feed.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("GitHub API responded with status {status}")]
    UpstreamStatus { status: u16 },

    #[error("Invalid data structure from GitHub API")]
    InvalidShape { reason: String },

    #[error("Request timed out")]
    TimedOut,

    #[error("Failed to reach GitHub API: {0}")]
    Transport(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Errors from the widget's call to the activity proxy.
#[derive(Debug, Error)]
pub enum WidgetError {
    #[error("Request timed out")]
    TimedOut,

    #[error("Request cancelled")]
    Cancelled,

    /// Non-success response; `message` is the proxy's `error` field or a generic fallback.
    #[error("{message}")]
    Status { status: u16, message: String },

    #[error("{0}")]
    Transport(String),

    #[error("Invalid activity payload: {0}")]
    Decode(String),
}

/// Errors from reading or writing the local cache record.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Failed to access cache file at {path}: {source}")]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize cache record: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Cache storage lock poisoned")]
    LockPoisoned,
}
