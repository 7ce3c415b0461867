//! Runtime error types.

use thiserror::Error;
use tome_docs::FetchError;

use crate::config::ConfigError;

/// Errors that can occur while building or running the runtime.
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Configuration could not be loaded or failed validation.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The documentation sources could not be constructed.
    #[error("Failed to set up documentation sources: {0}")]
    Docs(#[from] FetchError),
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
