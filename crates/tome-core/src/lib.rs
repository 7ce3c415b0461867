//! # Tome Core
//!
//! Platform-neutral vocabulary shared by every Tome crate.
//!
//! - **Identifiers**: typed snowflakes ([`UserId`], [`ChannelId`], ...)
//! - **Permissions**: platform bit flags and set difference ([`Permissions`])
//! - **Interactions**: inbound events classified by shape ([`Interaction`]),
//!   plus plain channel messages ([`ChannelMessage`])
//! - **Messages**: outbound replies, embeds and components ([`Reply`], [`Embed`])
//! - **Responder**: the outbound collaborator implemented by the platform
//!   adapter ([`Responder`])
//! - **Correlation ids**: typed, escaped custom ids ([`CorrelationRecord`])
//!
//! ```text
//! platform JSON ──▶ Interaction::from_value ──▶ Dispatcher (tome-framework)
//!                                                  │
//!                                   Responder ◀────┘ replies
//! ```

pub mod channel_message;
pub mod custom_id;
pub mod error;
pub mod ids;
pub mod interaction;
pub mod message;
pub mod permission;
pub mod responder;

pub use channel_message::ChannelMessage;
pub use custom_id::{CorrelationRecord, handler_key};
pub use error::{
    CustomIdError, CustomIdResult, ParseError, ParseResult, ReplyError, ReplyResult,
};
pub use ids::{ChannelId, GuildId, InteractionId, MessageId, UserId};
pub use interaction::{
    AutocompleteData, CommandData, CommandOption, ComponentData, FocusedOption, GuildScope,
    Interaction, InteractionData, InteractionKind, OptionValue, User,
};
pub use message::{
    AutocompleteChoice, ButtonStyle, Component, Embed, EmbedField, MAX_CHOICES,
    OPTION_TEXT_LIMIT, Reply, SelectOption, truncate,
};
pub use permission::{Permission, Permissions, format_permission_list};
pub use responder::{BoxedResponder, Defer, Responder};

#[cfg(any(test, feature = "testing"))]
pub use responder::{Recorded, RecordingResponder};
