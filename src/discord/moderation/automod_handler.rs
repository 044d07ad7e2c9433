// Discord-specific auto-mod handling - feeds guild messages to the core
// dispatcher and logs what it decided.

use super::actions::SerenityModerationActions;
use crate::core::moderation::{AutoModError, IncomingMessage, MemberRef};
use crate::discord::{Data, Error};
use poise::serenity_prelude as serenity;
use std::sync::Arc;

/// Run the guild's auto-mod filters against a message.
///
/// Returns `true` if the message broke a filter (and was handled).
pub async fn handle_message_for_automod(
    ctx: &serenity::Context,
    msg: &serenity::Message,
    data: &Data,
) -> Result<bool, Error> {
    // Skip bots
    if msg.author.bot {
        return Ok(false);
    }

    // Only check guild messages
    let guild_id = match msg.guild_id {
        Some(id) => id.get(),
        None => return Ok(false),
    };

    let config = data.automod_settings.get_config(guild_id).await?;
    if config.filters.is_empty() {
        return Ok(false);
    }

    let client_user_id = ctx.cache.current_user().id.get();
    let incoming = to_incoming_message(msg, guild_id, Some(client_user_id));
    let actions = SerenityModerationActions::new(Arc::clone(&ctx.http));

    match data
        .automod
        .validate_message(&actions, &incoming, &config)
        .await
    {
        Ok(()) => Ok(false),
        Err(AutoModError::Validation(violation)) => {
            tracing::info!(
                guild_id,
                user_id = msg.author.id.get(),
                filter = %violation.filter,
                "Message blocked by auto-mod: {}",
                violation
            );
            Ok(true)
        }
        Err(e) => Err(e.into()),
    }
}

/// Extract what the core needs from a serenity message.
fn to_incoming_message(
    msg: &serenity::Message,
    guild_id: u64,
    client_user_id: Option<u64>,
) -> IncomingMessage {
    // Only guild members can be warned; webhook and system messages carry no member.
    let author = msg.member.as_ref().map(|_| MemberRef {
        user_id: msg.author.id.get(),
        is_bot: msg.author.bot,
    });

    IncomingMessage {
        message_id: msg.id.get(),
        channel_id: msg.channel_id.get(),
        guild_id,
        content: msg.content.clone(),
        author,
        client_user_id,
    }
}
