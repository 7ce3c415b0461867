//! Per-interaction context handed to handlers.
//!
//! One [`InteractionContext`] is created for each dispatched interaction. It
//! owns the interaction, the responder used to answer it and a snapshot of
//! the shared services. It also remembers whether the interaction has been
//! acknowledged, so [`respond`](InteractionContext::respond) can pick between
//! an initial reply and an edit.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tome_core::{
    AutocompleteChoice, AutocompleteData, BoxedResponder, CommandData, ComponentData, Defer,
    Interaction, MessageId, Reply, ReplyError, ReplyResult, User,
};

use crate::error::ServiceNotFound;
use crate::services::ServiceMap;

/// The context passed to every handler.
pub struct InteractionContext {
    interaction: Interaction,
    responder: BoxedResponder,
    services: Arc<ServiceMap>,
    acknowledged: AtomicBool,
}

impl InteractionContext {
    /// Creates a context for a freshly received interaction.
    pub fn new(interaction: Interaction, responder: BoxedResponder, services: Arc<ServiceMap>) -> Self {
        Self {
            interaction,
            responder,
            services,
            acknowledged: AtomicBool::new(false),
        }
    }

    // ─── Accessors ────────────────────────────────────────────────────────────

    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    /// The invoking user.
    pub fn user(&self) -> &User {
        &self.interaction.user
    }

    pub fn responder(&self) -> &BoxedResponder {
        &self.responder
    }

    /// Command payload; `None` for other kinds.
    pub fn command(&self) -> Option<&CommandData> {
        self.interaction.command()
    }

    /// Button or select menu payload; `None` for other kinds.
    pub fn component(&self) -> Option<&ComponentData> {
        self.interaction.component()
    }

    /// Autocomplete payload; `None` for other kinds.
    pub fn autocomplete_data(&self) -> Option<&AutocompleteData> {
        self.interaction.autocomplete()
    }

    /// Looks up a shared service.
    pub fn service<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.services.get::<T>()
    }

    /// Looks up a shared service, failing if it was never provided.
    pub fn require_service<T: Send + Sync + 'static>(&self) -> Result<Arc<T>, ServiceNotFound> {
        self.services.require::<T>()
    }

    /// Returns `true` once the interaction has been deferred or answered.
    pub fn is_acknowledged(&self) -> bool {
        self.acknowledged.load(Ordering::SeqCst)
    }

    // ─── Answering ────────────────────────────────────────────────────────────

    /// Acknowledges the interaction without answering it yet.
    pub async fn defer(&self, defer: Defer) -> ReplyResult<()> {
        self.responder.defer(&self.interaction, defer).await?;
        self.acknowledged.store(true, Ordering::SeqCst);
        Ok(())
    }

    /// Answers the interaction: edits the response if already acknowledged,
    /// otherwise sends the initial reply.
    pub async fn respond(&self, reply: Reply) -> ReplyResult<()> {
        if self.is_acknowledged() {
            self.responder.edit_reply(&self.interaction, reply).await
        } else {
            self.responder.reply(&self.interaction, reply).await?;
            self.acknowledged.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    /// Answers a component interaction by editing its message.
    pub async fn update_message(&self, reply: Reply) -> ReplyResult<()> {
        self.responder.update_message(&self.interaction, reply).await?;
        self.acknowledged.store(true, Ordering::SeqCst);
        Ok(())
    }

    /// Answers an autocomplete request.
    pub async fn suggest(&self, choices: Vec<AutocompleteChoice>) -> ReplyResult<()> {
        self.responder.autocomplete(&self.interaction, choices).await
    }

    /// Posts a channel-visible message in the interaction's channel.
    pub async fn send_to_channel(&self, reply: Reply) -> ReplyResult<MessageId> {
        let channel = self
            .interaction
            .channel_id
            .ok_or_else(|| ReplyError::Other("interaction has no channel".into()))?;
        self.responder.send_message(channel, reply).await
    }

    /// Deletes a message in the interaction's channel.
    pub async fn delete_in_channel(&self, message: MessageId) -> ReplyResult<()> {
        let channel = self
            .interaction
            .channel_id
            .ok_or_else(|| ReplyError::Other("interaction has no channel".into()))?;
        self.responder.delete_message(channel, message).await
    }
}

impl std::fmt::Debug for InteractionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InteractionContext")
            .field("interaction", &self.interaction.id)
            .field("kind", &self.interaction.kind())
            .field("acknowledged", &self.is_acknowledged())
            .finish_non_exhaustive()
    }
}
