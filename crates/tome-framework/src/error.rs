//! Error types for the Tome framework.
//!
//! [`DispatchError`] describes why an interaction did not complete normally.
//! By the time a caller sees one, the dispatcher has already answered the
//! user; the value is returned for logging and tests only.

use std::time::Duration;

use thiserror::Error;
use tome_core::{InteractionKind, Permission};

/// Whose permissions a check was evaluated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionSubject {
    /// The bot itself.
    Bot,
    /// The invoking user.
    Author,
}

/// Outcome of an interaction that did not run its handler to completion.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// No handler is registered for the key.
    #[error("no {kind} handler registered for `{key}`")]
    NotFound {
        /// Namespace that was searched.
        kind: InteractionKind,
        /// Key that was looked up.
        key: String,
    },

    /// A guild-only command was invoked outside a guild.
    #[error("command `{command}` can only run in a guild")]
    GuildOnly {
        /// Command name.
        command: String,
    },

    /// The bot or the author lacks required permissions.
    #[error("{subject:?} is missing permissions: {missing:?}")]
    PermissionDenied {
        /// Whose permissions were insufficient.
        subject: PermissionSubject,
        /// Missing flags, in bit order.
        missing: Vec<Permission>,
    },

    /// The user is still on cooldown for the command.
    #[error("cooldown active for another {remaining:?}")]
    CooldownActive {
        /// Time until the cooldown expires.
        remaining: Duration,
    },

    /// The handler returned an error or panicked.
    #[error("{kind} handler `{key}` failed: {reason}")]
    HandlerExecution {
        /// Namespace of the handler.
        kind: InteractionKind,
        /// Key of the handler.
        key: String,
        /// Internal error text; never shown to users.
        reason: String,
    },
}

impl DispatchError {
    pub(crate) fn not_found(kind: InteractionKind, key: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            key: key.into(),
        }
    }
}

/// Errors raised while turning a command module into descriptors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModuleError {
    /// The module's build function returned an error.
    #[error("module `{module}` failed to build: {reason}")]
    Build {
        /// Module name.
        module: &'static str,
        /// Error text.
        reason: String,
    },

    /// The module's build function panicked.
    #[error("module `{module}` panicked while building: {reason}")]
    Panicked {
        /// Module name.
        module: &'static str,
        /// Panic payload, when it was a string.
        reason: String,
    },

    /// A descriptor was placed in the slot of another kind.
    #[error("descriptor `{key}` is a {found} handler but was added as {expected}")]
    KindMismatch {
        /// Descriptor key.
        key: String,
        /// Kind of the slot.
        expected: InteractionKind,
        /// Kind of the descriptor.
        found: InteractionKind,
    },

    /// An autocomplete handler does not belong to the module's command.
    #[error("autocomplete `{key}` does not belong to command `{command}`")]
    ForeignAutocomplete {
        /// Descriptor key.
        key: String,
        /// The module's command name.
        command: String,
    },
}

/// Returned when a handler asks for a service that was never provided.
#[derive(Debug, Clone, Error)]
#[error("service not found: {0}")]
pub struct ServiceNotFound(pub &'static str);

/// Result type for dispatch.
pub type DispatchResult<T> = Result<T, DispatchError>;
