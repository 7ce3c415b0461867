//! Admission checks run before a command handler.
//!
//! The [`Gate`] performs two checks in order:
//!
//! 1. **Permissions** (stateless): guild-only commands are refused outside
//!    guilds; inside a guild the bot's and the author's effective channel
//!    permissions must cover the descriptor's requirements.
//! 2. **Cooldown** (stateful): a per `(user, command)` expiry kept in a
//!    [`CooldownStore`].
//!
//! When a check fails the gate answers the user itself and returns the
//! matching [`DispatchError`].
//!
//! Cooldown entries follow this lifecycle:
//!
//! ```text
//! no entry        ──invoke──▶ entry(expiry = now + cooldown), proceed
//! entry, now < expiry  ─────▶ reject with remaining time
//! entry, now ≥ expiry  ─────▶ entry removed, proceed (not re-armed)
//! ```
//!
//! The read, expire and arm steps happen under one lock, so two concurrent
//! invocations by the same user cannot both observe "no entry".

use std::collections::HashMap;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;
use tome_core::{Permissions, Reply, UserId, format_permission_list};
use tracing::{debug, warn};

use crate::context::InteractionContext;
use crate::descriptor::HandlerDescriptor;
use crate::error::{DispatchError, DispatchResult, PermissionSubject};

const GUILD_ONLY_MESSAGE: &str = "This is a guild exclusive command, not to be executed in a dm";

// =============================================================================
// CooldownStore
// =============================================================================

/// Result of a cooldown check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CooldownDecision {
    /// The invocation may proceed. `armed` is `true` when a new entry was set.
    Proceed {
        /// Whether this invocation started a new cooldown.
        armed: bool,
    },
    /// The invocation must wait.
    Wait {
        /// Time until the entry expires.
        remaining: Duration,
    },
}

/// Per `(user, command)` cooldown expiries.
#[derive(Debug, Default)]
pub struct CooldownStore {
    entries: Mutex<HashMap<(UserId, String), Instant>>,
}

impl CooldownStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically checks and updates the entry for `(user, command)`.
    pub fn check(&self, user: UserId, command: &str, cooldown: Duration, now: Instant) -> CooldownDecision {
        let mut entries = self.entries.lock();
        let key = (user, command.to_string());
        match entries.get(&key) {
            Some(&expiry) if now < expiry => CooldownDecision::Wait {
                remaining: expiry - now,
            },
            Some(_) => {
                entries.remove(&key);
                CooldownDecision::Proceed { armed: false }
            }
            None => {
                entries.insert(key, now + cooldown);
                CooldownDecision::Proceed { armed: true }
            }
        }
    }

    /// Returns the expiry recorded for `(user, command)`, if any.
    pub fn expiry(&self, user: UserId, command: &str) -> Option<Instant> {
        self.entries.lock().get(&(user, command.to_string())).copied()
    }

    /// Returns the number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Returns `true` if no entry is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

/// Renders a wait time for users, rounded up to whole seconds.
fn format_wait(remaining: Duration) -> String {
    let secs = remaining.as_secs() + u64::from(remaining.subsec_nanos() > 0);
    humantime::format_duration(Duration::from_secs(secs.max(1))).to_string()
}

// =============================================================================
// Gate
// =============================================================================

/// Permission and cooldown admission control for commands.
#[derive(Debug, Default)]
pub struct Gate {
    cooldowns: CooldownStore,
}

impl Gate {
    /// Creates a gate with an empty cooldown store.
    pub fn new() -> Self {
        Self::default()
    }

    /// The cooldown store backing this gate.
    pub fn cooldowns(&self) -> &CooldownStore {
        &self.cooldowns
    }

    /// Checks guild scope and bot/author permissions.
    pub async fn permission_check(
        &self,
        ctx: &InteractionContext,
        descriptor: &HandlerDescriptor,
    ) -> DispatchResult<()> {
        let Some(scope) = ctx.interaction().guild else {
            if descriptor.is_guild_only() {
                answer(ctx, GUILD_ONLY_MESSAGE.to_string()).await;
                return Err(DispatchError::GuildOnly {
                    command: descriptor.key().to_string(),
                });
            }
            // Permissions do not apply outside guilds.
            return Ok(());
        };

        check_subject(
            ctx,
            PermissionSubject::Bot,
            scope.bot_permissions,
            descriptor.required_bot_permissions(),
        )
        .await?;
        check_subject(
            ctx,
            PermissionSubject::Author,
            scope.author_permissions,
            descriptor.required_author_permissions(),
        )
        .await
    }

    /// Checks and updates the invoking user's cooldown for the command.
    pub async fn cooldown_check(
        &self,
        ctx: &InteractionContext,
        descriptor: &HandlerDescriptor,
    ) -> DispatchResult<()> {
        let Some(cooldown) = descriptor.cooldown_duration() else {
            return Ok(());
        };

        let user = ctx.user().id;
        match self.cooldowns.check(user, descriptor.key(), cooldown, Instant::now()) {
            CooldownDecision::Proceed { armed } => {
                debug!(user_id = %user, command = descriptor.key(), armed, "Cooldown passed");
                Ok(())
            }
            CooldownDecision::Wait { remaining } => {
                answer(
                    ctx,
                    format!(
                        "Please wait {} before using the command again",
                        format_wait(remaining)
                    ),
                )
                .await;
                Err(DispatchError::CooldownActive { remaining })
            }
        }
    }
}

async fn check_subject(
    ctx: &InteractionContext,
    subject: PermissionSubject,
    effective: Permissions,
    required: Option<Permissions>,
) -> DispatchResult<()> {
    let Some(required) = required else {
        return Ok(());
    };
    let missing = effective.missing(required);
    if missing.is_empty() {
        return Ok(());
    }

    let list = format_permission_list(&missing);
    let message = match subject {
        PermissionSubject::Bot => {
            format!("In order to run this command, I need the following permissions: {list}")
        }
        PermissionSubject::Author => format!("In order to run this command, you need: {list}"),
    };
    answer(ctx, message).await;
    Err(DispatchError::PermissionDenied { subject, missing })
}

async fn answer(ctx: &InteractionContext, message: String) {
    if let Err(e) = ctx.respond(Reply::text(message).ephemeral()).await {
        warn!(error = %e, "Failed to send gate rejection");
    }
}
