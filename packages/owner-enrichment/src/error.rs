//! Typed errors for the enrichment library.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to provide
//! strongly-typed, composable error handling.
//!
//! Capability errors (`SearchError`, `FetchError`) never escape the
//! discovery loop; they are logged and treated as an empty result.

use thiserror::Error;

/// Errors that can abort an enrichment run before it starts.
#[derive(Debug, Error)]
pub enum EnrichError {
    /// Configuration rejected at run start
    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    /// Background job failed to complete
    #[error("job error: {0}")]
    Job(String),
}

impl EnrichError {
    pub(crate) fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }
}

/// Errors raised by a web search provider.
#[derive(Debug, Error)]
pub enum SearchError {
    /// No API key configured
    #[error("search provider credentials not configured")]
    MissingCredentials,

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Provider answered with a non-success status
    #[error("search provider returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// Response body could not be decoded
    #[error("failed to decode search response: {0}")]
    Decode(String),
}

/// Errors raised while fetching a result page.
#[derive(Debug, Error)]
pub enum FetchError {
    /// URL could not be normalized into something fetchable
    #[error("invalid URL: {url}")]
    InvalidUrl { url: String },

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Request exceeded the fetch timeout
    #[error("timeout fetching: {url}")]
    Timeout { url: String },

    /// Server answered with a non-success status
    #[error("HTTP {status} for {url}")]
    Status { status: u16, url: String },
}

/// Errors raised by checkpoint and job stores.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Referenced job does not exist
    #[error("job not found: {job_id}")]
    JobNotFound { job_id: String },
}

/// Result type alias for enrichment operations.
pub type Result<T> = std::result::Result<T, EnrichError>;

/// Result type alias for search operations.
pub type SearchResult<T> = std::result::Result<T, SearchError>;

/// Result type alias for fetch operations.
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Result type alias for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;
