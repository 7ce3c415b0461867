//! Outbound side of the platform connection.
//!
//! The [`Responder`] trait is implemented by the platform adapter. Handlers
//! never talk to the platform directly; everything they send goes through a
//! responder so tests can substitute a recording double.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::ReplyResult;
use crate::ids::{ChannelId, MessageId};
use crate::interaction::{Interaction, User};
use crate::message::{AutocompleteChoice, Reply};

/// How an interaction is acknowledged before the real answer is ready.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Defer {
    /// Show a private "thinking" state; the answer arrives via
    /// [`Responder::edit_reply`].
    Ephemeral,
    /// Acknowledge a component interaction without changing its message yet;
    /// [`Responder::edit_reply`] then edits the message the component is on.
    Update,
}

/// Sends replies and channel messages to the platform.
#[async_trait]
pub trait Responder: Send + Sync {
    /// Acknowledges an interaction without answering it yet.
    async fn defer(&self, interaction: &Interaction, defer: Defer) -> ReplyResult<()>;

    /// Sends the initial response to a not yet acknowledged interaction.
    async fn reply(&self, interaction: &Interaction, reply: Reply) -> ReplyResult<()>;

    /// Replaces the response of an acknowledged interaction.
    async fn edit_reply(&self, interaction: &Interaction, reply: Reply) -> ReplyResult<()>;

    /// Answers a component interaction by editing the message it is attached to.
    async fn update_message(&self, interaction: &Interaction, reply: Reply) -> ReplyResult<()>;

    /// Answers an autocomplete request.
    async fn autocomplete(
        &self,
        interaction: &Interaction,
        choices: Vec<AutocompleteChoice>,
    ) -> ReplyResult<()>;

    /// Posts a channel-visible message and returns its id.
    async fn send_message(&self, channel: ChannelId, reply: Reply) -> ReplyResult<MessageId>;

    /// Posts a message replying to another message.
    async fn reply_to_message(
        &self,
        channel: ChannelId,
        message: MessageId,
        reply: Reply,
    ) -> ReplyResult<MessageId> {
        let _ = message;
        self.send_message(channel, reply).await
    }

    /// Deletes a channel message.
    async fn delete_message(&self, channel: ChannelId, message: MessageId) -> ReplyResult<()>;

    /// Returns the bot's own user, once known.
    fn current_user(&self) -> Option<User> {
        None
    }

    /// Returns the latest gateway heartbeat latency, once measured.
    fn latency(&self) -> Option<Duration> {
        None
    }
}

/// Type alias for a shared responder.
pub type BoxedResponder = Arc<dyn Responder>;

#[cfg(any(test, feature = "testing"))]
pub use recording::{Recorded, RecordingResponder};

#[cfg(any(test, feature = "testing"))]
mod recording {
    use std::sync::atomic::{AtomicU64, Ordering};

    use parking_lot::Mutex;

    use super::*;
    use crate::error::ReplyError;

    /// One call captured by [`RecordingResponder`].
    #[derive(Debug, Clone, PartialEq)]
    pub enum Recorded {
        Defer(Defer),
        Reply(Reply),
        EditReply(Reply),
        UpdateMessage(Reply),
        Autocomplete(Vec<AutocompleteChoice>),
        SendMessage(ChannelId, Reply),
        ReplyToMessage(ChannelId, MessageId, Reply),
        DeleteMessage(ChannelId, MessageId),
    }

    /// Responder that records every call instead of talking to a platform.
    ///
    /// Sent messages receive ids counting up from 1000.
    #[derive(Debug, Default)]
    pub struct RecordingResponder {
        calls: Mutex<Vec<Recorded>>,
        next_message: AtomicU64,
        fail_sends: bool,
        user: Option<User>,
        latency: Option<Duration>,
    }

    impl RecordingResponder {
        pub fn new() -> Self {
            Self::default()
        }

        /// Makes every `send_message` call fail.
        pub fn failing_sends(mut self) -> Self {
            self.fail_sends = true;
            self
        }

        pub fn with_user(mut self, user: User) -> Self {
            self.user = Some(user);
            self
        }

        pub fn with_latency(mut self, latency: Duration) -> Self {
            self.latency = Some(latency);
            self
        }

        /// Returns every call recorded so far.
        pub fn calls(&self) -> Vec<Recorded> {
            self.calls.lock().clone()
        }

        /// Returns the last call, if any.
        pub fn last(&self) -> Option<Recorded> {
            self.calls.lock().last().cloned()
        }

        /// Returns the content of the last reply or edit sent for an
        /// interaction.
        pub fn last_text(&self) -> Option<String> {
            self.calls.lock().iter().rev().find_map(|call| match call {
                Recorded::Reply(r) | Recorded::EditReply(r) | Recorded::UpdateMessage(r) => {
                    r.content.clone()
                }
                _ => None,
            })
        }

        fn push(&self, call: Recorded) {
            self.calls.lock().push(call);
        }

        fn next_id(&self) -> MessageId {
            MessageId(1000 + self.next_message.fetch_add(1, Ordering::SeqCst))
        }
    }

    #[async_trait]
    impl Responder for RecordingResponder {
        async fn defer(&self, _interaction: &Interaction, defer: Defer) -> ReplyResult<()> {
            self.push(Recorded::Defer(defer));
            Ok(())
        }

        async fn reply(&self, _interaction: &Interaction, reply: Reply) -> ReplyResult<()> {
            self.push(Recorded::Reply(reply));
            Ok(())
        }

        async fn edit_reply(&self, _interaction: &Interaction, reply: Reply) -> ReplyResult<()> {
            self.push(Recorded::EditReply(reply));
            Ok(())
        }

        async fn update_message(&self, _interaction: &Interaction, reply: Reply) -> ReplyResult<()> {
            self.push(Recorded::UpdateMessage(reply));
            Ok(())
        }

        async fn autocomplete(
            &self,
            _interaction: &Interaction,
            choices: Vec<AutocompleteChoice>,
        ) -> ReplyResult<()> {
            self.push(Recorded::Autocomplete(choices));
            Ok(())
        }

        async fn send_message(&self, channel: ChannelId, reply: Reply) -> ReplyResult<MessageId> {
            if self.fail_sends {
                return Err(ReplyError::Rejected {
                    status: 403,
                    message: "Missing Access".into(),
                });
            }
            self.push(Recorded::SendMessage(channel, reply));
            Ok(self.next_id())
        }

        async fn reply_to_message(
            &self,
            channel: ChannelId,
            message: MessageId,
            reply: Reply,
        ) -> ReplyResult<MessageId> {
            self.push(Recorded::ReplyToMessage(channel, message, reply));
            Ok(self.next_id())
        }

        async fn delete_message(&self, channel: ChannelId, message: MessageId) -> ReplyResult<()> {
            self.push(Recorded::DeleteMessage(channel, message));
            Ok(())
        }

        fn current_user(&self) -> Option<User> {
            self.user.clone()
        }

        fn latency(&self) -> Option<Duration> {
            self.latency
        }
    }
}
