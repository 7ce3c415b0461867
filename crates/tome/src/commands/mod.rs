//! The documentation lookup commands.
//!
//! Both commands answer in the same shape:
//!
//! ```text
//! exact match ──▶ embed posted in the channel ──▶ "Sent documentation(s) for ..." + delete button
//! several     ──▶ select menu ──▶ chosen value re-enters the exact match path
//! none        ──▶ "no results" reply
//! ```

pub mod djs;
pub mod mdn;

use tome_core::{Embed, Reply, UserId};
use tome_framework::builtin::delete_button;
use tome_framework::{BoxError, InteractionContext, ModuleDescriptor};
use tracing::warn;

use crate::present::sent_by;

/// Every command module of the bot, in registration order.
pub static MODULES: [ModuleDescriptor; 2] = [djs::MODULE, mdn::MODULE];

pub(crate) const SELECT_PROMPT: &str = "Didn't find an exact match, please select one from below";
pub(crate) const SELECT_PLACEHOLDER: &str = "Select documentation to send";
const SEND_FAILED: &str = "There was an error trying to send the message";

/// Posts `embed` in the interaction's channel on behalf of `initiator`,
/// then replaces the private reply with `confirmation` and a delete button
/// for the posted message.
pub(crate) async fn deliver(
    ctx: &InteractionContext,
    initiator: UserId,
    target: Option<UserId>,
    embed: Embed,
    confirmation: String,
) -> Result<(), BoxError> {
    let message = Reply::with_embed(embed).content(sent_by(initiator, target));
    let sent = match ctx.send_to_channel(message).await {
        Ok(id) => id,
        Err(e) => {
            warn!(user_id = %initiator, error = %e, "Failed to post documentation");
            ctx.respond(Reply::text(SEND_FAILED)).await?;
            return Ok(());
        }
    };

    ctx.respond(Reply::text(confirmation).component(delete_button(initiator, sent)?))
        .await?;
    Ok(())
}
