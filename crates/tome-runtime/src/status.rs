//! Status reply to a bare mention of the bot.
//!
//! Posting nothing but `@Tome` in a channel answers with an embed naming the
//! bot, its version, the supported documentation sets, uptime and latency.

use std::time::Duration;

use tokio::time::Instant;
use tome_core::{ChannelMessage, Embed, Reply, ReplyResult, Responder};
use tracing::debug;

use crate::config::BotConfig;

const STATUS_COLOR: u32 = 0xd250c7;
const SUPPORTED_DOCS: &str = "`discord.js`, `Javascript (mdn)`";
const JUST_STARTED: &str = "Just turned on";

/// Answers bare mentions with the bot's status.
#[derive(Debug, Clone)]
pub struct StatusResponder {
    name: String,
    version: String,
    description: String,
    repository_url: String,
    started_at: Instant,
}

impl StatusResponder {
    /// Creates a responder whose uptime starts now.
    pub fn new(bot: &BotConfig, version: impl Into<String>) -> Self {
        Self {
            name: bot.name.clone(),
            version: version.into(),
            description: bot.description.clone(),
            repository_url: bot.repository_url.clone(),
            started_at: Instant::now(),
        }
    }

    /// Time since the responder was created.
    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Replies to `message` if it is a bare mention of the bot.
    ///
    /// Returns whether a status reply was sent. Messages from bots and
    /// messages seen before the bot user is known are ignored.
    pub async fn handle(&self, message: &ChannelMessage, responder: &dyn Responder) -> ReplyResult<bool> {
        if message.author.bot {
            return Ok(false);
        }
        let Some(me) = responder.current_user() else {
            return Ok(false);
        };
        if !message.is_bare_mention_of(me.id) {
            return Ok(false);
        }

        debug!(channel_id = %message.channel_id, user_id = %message.author.id, "Sending status");
        let embed = self.embed(&me.username, responder.latency());
        responder
            .reply_to_message(message.channel_id, message.id, Reply::with_embed(embed))
            .await?;
        Ok(true)
    }

    /// Builds the status embed.
    pub fn embed(&self, username: &str, latency: Option<Duration>) -> Embed {
        let display_name = if username.is_empty() { &self.name } else { username };
        let mut embed = Embed::new()
            .title(format!("{display_name} (v{})", self.version))
            .url(self.repository_url.clone())
            .color(STATUS_COLOR)
            .description(self.description.clone())
            .field("Currently Supported Docs", SUPPORTED_DOCS, false)
            .field("Uptime", format_uptime(self.uptime()), false);
        if let Some(latency) = latency {
            embed = embed.field("Ping", format!("{}ms", latency.as_millis()), true);
        }
        embed
            .field("Source", format!("[Github]({})", self.repository_url), true)
            .field(
                "Contributors",
                format!("[Link]({}/graphs/contributors)", self.repository_url),
                true,
            )
    }
}

/// Formats an uptime to whole seconds, e.g. `1h 2m 5s`.
pub fn format_uptime(uptime: Duration) -> String {
    if uptime < Duration::from_secs(1) {
        return JUST_STARTED.to_string();
    }
    humantime::format_duration(Duration::from_secs(uptime.as_secs())).to_string()
}
