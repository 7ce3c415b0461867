//! Errors raised while fetching documentation.
//!
//! Every variant is an upstream fetch failure. [`SearchCache`](crate::SearchCache)
//! absorbs them and keeps serving the previous index; only page lookups
//! surface them to callers.

use thiserror::Error;

/// Failure to fetch or decode a documentation source.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// The server answered with a non-success status.
    #[error("{url} answered with HTTP {status}")]
    Status {
        /// Requested URL.
        url: String,
        /// HTTP status code.
        status: u16,
    },

    /// The request could not be completed.
    #[error("request to {url} failed: {reason}")]
    Transport {
        /// Requested URL.
        url: String,
        /// Underlying error text.
        reason: String,
    },

    /// The body could not be decompressed.
    #[error("decompression failed: {0}")]
    Decompress(String),

    /// The body is not the expected XML.
    #[error("invalid XML: {0}")]
    Xml(String),

    /// The body is not the expected JSON.
    #[error("invalid JSON: {0}")]
    Json(String),

    /// The HTTP client could not be built.
    #[error("HTTP client setup failed: {0}")]
    Client(String),
}

impl FetchError {
    pub(crate) fn transport(url: &str, err: impl std::fmt::Display) -> Self {
        Self::Transport {
            url: url.to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type for fetch operations.
pub type FetchResult<T> = Result<T, FetchError>;
