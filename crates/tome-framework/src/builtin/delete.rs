//! The built-in delete button.
//!
//! Channel-visible results carry a button keyed to the user who asked for
//! them. Only that user may press it; doing so deletes the result and strips
//! the button from the ephemeral confirmation.

use std::sync::Arc;

use tome_core::custom_id::{CorrelationRecord, parse_field};
use tome_core::{ButtonStyle, Component, CustomIdResult, MessageId, Reply, UserId};
use tower::BoxError;
use tracing::warn;

use crate::context::InteractionContext;
use crate::descriptor::HandlerDescriptor;

/// Handler key of the delete button.
pub const DELETE_BUTTON_KEY: &str = "deletebtn";

const NOT_INITIATOR: &str = "Only the command initiator is allowed to delete this message";

/// Correlation record of the delete button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteButtonId {
    /// User allowed to delete the message.
    pub initiator: UserId,
    /// Channel message to delete.
    pub message: MessageId,
}

impl CorrelationRecord for DeleteButtonId {
    const KEY: &'static str = DELETE_BUTTON_KEY;
    const VERSION: u32 = 1;
    const FIELD_COUNT: usize = 2;

    fn to_fields(&self) -> Vec<String> {
        vec![self.initiator.to_string(), self.message.to_string()]
    }

    fn from_fields(fields: &[String]) -> CustomIdResult<Self> {
        Ok(Self {
            initiator: parse_field::<Self, _>(fields, 0)?,
            message: parse_field::<Self, _>(fields, 1)?,
        })
    }
}

/// Renders the delete button for `message`, pressable by `initiator`.
pub fn delete_button(initiator: UserId, message: MessageId) -> CustomIdResult<Component> {
    Ok(Component::Button {
        custom_id: DeleteButtonId { initiator, message }.encode()?,
        style: ButtonStyle::Secondary,
        label: None,
        emoji: Some("🗑".into()),
    })
}

/// Returns the descriptor of the delete button handler.
pub fn delete_button_handler() -> HandlerDescriptor {
    HandlerDescriptor::button(DELETE_BUTTON_KEY, on_delete)
}

async fn on_delete(ctx: Arc<InteractionContext>) -> Result<(), BoxError> {
    let component = ctx.component().ok_or("delete button invoked without component data")?;
    let id = DeleteButtonId::decode(&component.custom_id)?;

    if ctx.user().id != id.initiator {
        ctx.respond(Reply::text(NOT_INITIATOR).ephemeral()).await?;
        return Ok(());
    }

    if let Err(e) = ctx.delete_in_channel(id.message).await {
        warn!(message_id = %id.message, error = %e, "Failed to delete message");
    }
    ctx.update_message(Reply::new()).await?;
    Ok(())
}
