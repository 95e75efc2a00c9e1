//! Error types for the MGNREGA dashboard backend
//!
//! Defines one error enum covering configuration, upstream, storage and
//! serialization failures. Uses thiserror for ergonomic error handling.

use thiserror::Error;

/// Result type alias for dashboard operations
pub type Result<T> = std::result::Result<T, MgnregaError>;

/// Error type for dashboard operations
#[derive(Error, Debug)]
pub enum MgnregaError {
    /// Configuration errors (missing API key, bad port, ...)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Upstream unreachable, non-2xx, or unreadable body
    #[error("Upstream fetch error: {0}")]
    UpstreamFetch(String),

    /// Upstream answered, but without a `records` collection
    #[error("Invalid upstream response: {0}")]
    InvalidUpstreamResponse(String),

    /// Cache store could not be opened or queried
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// SQLite database errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Other errors
    #[error("{0}")]
    Other(String),

    /// Anyhow errors (for more context); displays the whole context chain
    #[error("{0:#}")]
    Anyhow(#[from] anyhow::Error),
}

impl MgnregaError {
    /// Whether the failure originated in the cache store
    pub fn is_storage(&self) -> bool {
        matches!(
            self,
            MgnregaError::StorageUnavailable(_) | MgnregaError::Database(_)
        )
    }

    /// Whether the failure originated in the upstream call
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            MgnregaError::UpstreamFetch(_)
                | MgnregaError::InvalidUpstreamResponse(_)
                | MgnregaError::Http(_)
        )
    }

    /// Short label used for metrics and log fields
    pub fn kind(&self) -> &'static str {
        match self {
            MgnregaError::Config(_) => "config",
            MgnregaError::UpstreamFetch(_) | MgnregaError::Http(_) => "upstream_fetch",
            MgnregaError::InvalidUpstreamResponse(_) => "invalid_upstream_response",
            MgnregaError::StorageUnavailable(_) | MgnregaError::Database(_) => "storage",
            MgnregaError::Io(_) => "io",
            MgnregaError::Json(_) => "json",
            MgnregaError::Other(_) | MgnregaError::Anyhow(_) => "other",
        }
    }
}
