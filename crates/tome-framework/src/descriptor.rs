//! Handler descriptors.
//!
//! A [`HandlerDescriptor`] binds an executor to a key in one of the four
//! namespaces and carries the admission requirements the gate enforces
//! before a command runs.
//!
//! | Kind           | Key                          |
//! |----------------|------------------------------|
//! | `Command`      | command name                 |
//! | `Button`       | first segment of the custom id |
//! | `SelectMenu`   | first segment of the custom id |
//! | `Autocomplete` | `<command>/<option>`         |

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tome_core::{InteractionKind, Permissions};
use tower::BoxError;

use crate::context::InteractionContext;
use crate::handler::{BoxedExecutor, executor};

/// Composes the autocomplete key for a command option.
pub fn autocomplete_key(command: &str, option: &str) -> String {
    format!("{command}/{option}")
}

/// Describes one registered handler.
#[derive(Clone)]
pub struct HandlerDescriptor {
    kind: InteractionKind,
    key: String,
    cooldown: Option<Duration>,
    bot_permissions: Option<Permissions>,
    author_permissions: Option<Permissions>,
    guild_only: bool,
    executor: BoxedExecutor,
}

impl HandlerDescriptor {
    /// Creates a descriptor from an already boxed executor.
    pub fn new(kind: InteractionKind, key: impl Into<String>, executor: BoxedExecutor) -> Self {
        Self {
            kind,
            key: key.into(),
            cooldown: None,
            bot_permissions: None,
            author_permissions: None,
            guild_only: false,
            executor,
        }
    }

    /// Describes a slash command handler.
    pub fn command<F, Fut>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(Arc<InteractionContext>) -> Fut + Clone + Send + Sync + 'static,
        Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
    {
        Self::new(InteractionKind::Command, name, executor(f))
    }

    /// Describes a button handler.
    pub fn button<F, Fut>(key: impl Into<String>, f: F) -> Self
    where
        F: Fn(Arc<InteractionContext>) -> Fut + Clone + Send + Sync + 'static,
        Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
    {
        Self::new(InteractionKind::Button, key, executor(f))
    }

    /// Describes a select menu handler.
    pub fn select_menu<F, Fut>(key: impl Into<String>, f: F) -> Self
    where
        F: Fn(Arc<InteractionContext>) -> Fut + Clone + Send + Sync + 'static,
        Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
    {
        Self::new(InteractionKind::SelectMenu, key, executor(f))
    }

    /// Describes an autocomplete handler for `command`'s `option`.
    pub fn autocomplete<F, Fut>(command: &str, option: &str, f: F) -> Self
    where
        F: Fn(Arc<InteractionContext>) -> Fut + Clone + Send + Sync + 'static,
        Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
    {
        Self::new(
            InteractionKind::Autocomplete,
            autocomplete_key(command, option),
            executor(f),
        )
    }

    // ─── Requirements ─────────────────────────────────────────────────────────

    /// Rejects repeated invocations by the same user within `cooldown`.
    pub fn cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = Some(cooldown);
        self
    }

    /// Permissions the bot needs in the channel.
    pub fn bot_permissions(mut self, permissions: impl Into<Permissions>) -> Self {
        self.bot_permissions = Some(permissions.into());
        self
    }

    /// Permissions the invoking user needs in the channel.
    pub fn author_permissions(mut self, permissions: impl Into<Permissions>) -> Self {
        self.author_permissions = Some(permissions.into());
        self
    }

    /// Refuses to run outside a guild.
    pub fn guild_only(mut self) -> Self {
        self.guild_only = true;
        self
    }

    // ─── Accessors ────────────────────────────────────────────────────────────

    pub fn kind(&self) -> InteractionKind {
        self.kind
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn cooldown_duration(&self) -> Option<Duration> {
        self.cooldown
    }

    pub fn required_bot_permissions(&self) -> Option<Permissions> {
        self.bot_permissions
    }

    pub fn required_author_permissions(&self) -> Option<Permissions> {
        self.author_permissions
    }

    pub fn is_guild_only(&self) -> bool {
        self.guild_only
    }

    /// Returns a fresh handle to the executor.
    pub fn executor(&self) -> BoxedExecutor {
        self.executor.clone()
    }
}

impl std::fmt::Debug for HandlerDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerDescriptor")
            .field("kind", &self.kind)
            .field("key", &self.key)
            .field("cooldown", &self.cooldown)
            .field("bot_permissions", &self.bot_permissions)
            .field("author_permissions", &self.author_permissions)
            .field("guild_only", &self.guild_only)
            .finish_non_exhaustive()
    }
}
