//! Error types shared by every Tome crate.
//!
//! Dispatch-level errors (NotFound, PermissionDenied, ...) live in
//! tome-framework; fetch errors live in tome-docs.

use thiserror::Error;

// =============================================================================
// Reply Errors
// =============================================================================

/// Errors raised by a [`Responder`](crate::Responder) while talking to the
/// platform.
#[derive(Debug, Clone, Error)]
pub enum ReplyError {
    /// The platform rejected the request.
    #[error("platform rejected request ({status}): {message}")]
    Rejected {
        /// Status code reported by the platform.
        status: u16,
        /// Message reported by the platform.
        message: String,
    },

    /// The interaction was already acknowledged or its token expired.
    #[error("interaction {0} can no longer be answered")]
    Expired(String),

    /// The connection to the platform is gone.
    #[error("not connected to the platform")]
    NotConnected,

    /// Serializing the payload failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Anything else.
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for ReplyError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

// =============================================================================
// Parse Errors
// =============================================================================

/// Errors raised while classifying an inbound platform payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A required field is absent.
    #[error("missing field `{0}`")]
    MissingField(&'static str),

    /// A field is present but has the wrong shape.
    #[error("invalid field `{field}`: {reason}")]
    InvalidField {
        /// Name of the offending field.
        field: &'static str,
        /// What was wrong with it.
        reason: String,
    },

    /// The payload is not one of the four handled interaction kinds.
    #[error("unsupported interaction type {interaction_type} (component type {component_type:?})")]
    Unsupported {
        /// Raw `type` field.
        interaction_type: u64,
        /// Raw `data.component_type`, for component interactions.
        component_type: Option<u64>,
    },
}

impl ParseError {
    /// Creates an [`ParseError::InvalidField`].
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field,
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Correlation Id Errors
// =============================================================================

/// Errors raised by the correlation id codec.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CustomIdError {
    /// The id belongs to another handler.
    #[error("expected handler key `{expected}`, found `{found}`")]
    KeyMismatch {
        /// Key of the record being decoded.
        expected: &'static str,
        /// Key found in the id.
        found: String,
    },

    /// The id was produced by an incompatible record version.
    #[error("unsupported version `{found}` for `{key}` (expected v{expected})")]
    VersionMismatch {
        /// Key of the record being decoded.
        key: &'static str,
        /// Version this build understands.
        expected: u32,
        /// Version segment found in the id.
        found: String,
    },

    /// The id carries the wrong number of fields.
    #[error("`{key}` expects {expected} fields, found {found}")]
    FieldCount {
        /// Key of the record being decoded.
        key: &'static str,
        /// Accepted field count(s), rendered for the message.
        expected: String,
        /// Number of fields present.
        found: usize,
    },

    /// A field could not be unescaped or converted.
    #[error("invalid field {index} in `{key}`: {reason}")]
    InvalidField {
        /// Key of the record being decoded.
        key: &'static str,
        /// Zero-based field position.
        index: usize,
        /// What was wrong with it.
        reason: String,
    },

    /// The encoded id exceeds the platform limit.
    #[error("encoded id is {length} characters, limit is {limit}")]
    TooLong {
        /// Encoded length.
        length: usize,
        /// Platform limit.
        limit: usize,
    },
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for outbound platform calls.
pub type ReplyResult<T> = Result<T, ReplyError>;

/// Result type for inbound payload parsing.
pub type ParseResult<T> = Result<T, ParseError>;

/// Result type for correlation id decoding.
pub type CustomIdResult<T> = Result<T, CustomIdError>;
