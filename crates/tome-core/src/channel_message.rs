//! Inbound channel messages.

use serde::Deserialize;
use serde_json::Value;

use crate::error::{ParseError, ParseResult};
use crate::ids::{ChannelId, GuildId, MessageId, UserId};
use crate::interaction::User;

/// A message posted in a channel the bot can read.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChannelMessage {
    pub id: MessageId,
    pub channel_id: ChannelId,
    #[serde(default)]
    pub guild_id: Option<GuildId>,
    pub author: User,
    #[serde(default)]
    pub content: String,
}

impl ChannelMessage {
    /// Parses a message-create payload.
    pub fn from_value(value: Value) -> ParseResult<Self> {
        serde_json::from_value(value).map_err(|e| ParseError::invalid("message", e.to_string()))
    }

    /// Returns `true` if the trimmed content is nothing but a mention of `user`.
    pub fn is_bare_mention_of(&self, user: UserId) -> bool {
        let content = self.content.trim();
        content == format!("<@{user}>") || content == format!("<@!{user}>")
    }
}
