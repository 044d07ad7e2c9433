// Manual warning commands.

use super::actions::SerenityModerationActions;
use crate::core::moderation::{AutoModError, MemberRef};
use crate::discord::{Context, Error};
use poise::serenity_prelude as serenity;
use std::sync::Arc;

// Embed descriptions are capped at 4096 characters.
const MAX_LISTED_WARNINGS: usize = 20;

/// Warn a member.
#[poise::command(slash_command, guild_only, required_permissions = "MODERATE_MEMBERS")]
pub async fn warn(
    ctx: Context<'_>,
    #[description = "Member to warn"] member: serenity::Member,
    #[description = "Why they are being warned"] reason: Option<String>,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be used in a server")?.get();
    // Resolved from this guild's member list, so non-members never get here
    let user = &member.user;

    let target = MemberRef {
        user_id: user.id.get(),
        is_bot: user.bot,
    };
    let actions = SerenityModerationActions::new(Arc::clone(&ctx.serenity_context().http));

    let result = ctx
        .data()
        .automod
        .warn_member(
            &actions,
            guild_id,
            target,
            ctx.author().id.get(),
            reason.as_deref(),
        )
        .await;

    match result {
        Ok(outcome) => {
            let dm_note = if outcome.notified {
                ""
            } else {
                "\n-# Could not send them a DM."
            };
            ctx.say(format!(
                "⚠️ <@{}> has been warned for `{}`.{}",
                user.id, outcome.warning.reason, dm_note
            ))
            .await?;
        }
        Err(AutoModError::InvalidArgument(message)) => {
            ctx.send(
                poise::CreateReply::default()
                    .content(format!("❌ {}", message))
                    .ephemeral(true),
            )
            .await?;
        }
        Err(e) => return Err(e.into()),
    }

    Ok(())
}

/// List a member's warnings.
#[poise::command(slash_command, guild_only, required_permissions = "MODERATE_MEMBERS")]
pub async fn warnings(
    ctx: Context<'_>,
    #[description = "Member to look up"] user: serenity::User,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be used in a server")?.get();

    let warnings = ctx
        .data()
        .automod
        .get_warnings(guild_id, user.id.get())
        .await?;

    if warnings.is_empty() {
        ctx.say(format!("<@{}> has no warnings. ✨", user.id)).await?;
        return Ok(());
    }

    // Newest last, only the most recent ones
    let skip = warnings.len().saturating_sub(MAX_LISTED_WARNINGS);
    let lines: Vec<String> = warnings
        .iter()
        .enumerate()
        .skip(skip)
        .map(|(i, w)| {
            format!(
                "`#{}` <t:{}:R> by <@{}>: {}",
                i + 1,
                w.at.timestamp(),
                w.instigator_id,
                w.reason
            )
        })
        .collect();

    let embed = serenity::CreateEmbed::new()
        .title(format!("Warnings for {}", user.name))
        .color(0xFFA500)
        .thumbnail(user.face())
        .description(lines.join("\n"))
        .footer(serenity::CreateEmbedFooter::new(format!(
            "{} warning{} total",
            warnings.len(),
            if warnings.len() == 1 { "" } else { "s" }
        )));

    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}
