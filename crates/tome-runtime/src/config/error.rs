//! Configuration errors.

use std::path::PathBuf;

use thiserror::Error;

/// Failure to load or validate a [`TomeConfig`](super::TomeConfig).
#[derive(Error, Debug)]
pub enum ConfigError {
    /// An explicitly requested file does not exist.
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    /// The merged sources do not fit the schema.
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// A value is out of range.
    #[error("Invalid configuration: {message}")]
    ValidationError { message: String },

    /// A required value is empty.
    #[error("Missing required configuration field: {field}")]
    MissingField { field: String },

    /// A documentation URL is not http(s).
    #[error("Invalid URL for {field}: {url}")]
    InvalidUrl { field: String, url: String },

    /// `docs.djs.default_branch` names no configured branch.
    #[error("Default branch `{branch}` is not configured under docs.djs.branches")]
    UnknownBranch { branch: String },

    /// A branch name would break `<branch>:<query>` parsing or correlation ids.
    #[error("Invalid branch name `{0}`: must be non-empty and contain neither '/' nor ':'")]
    InvalidBranchName(String),
}

impl ConfigError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
        }
    }

    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
