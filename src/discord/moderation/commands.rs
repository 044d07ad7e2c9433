// Auto-mod slash commands for configuration.

use crate::core::moderation::FilterKind;
use crate::discord::{Context, Error};
use poise::serenity_prelude as serenity;

#[derive(Debug, Clone, Copy, poise::ChoiceParameter)]
pub enum FilterChoice {
    #[name = "Banned words"]
    Words,
    #[name = "Banned links"]
    Links,
    #[name = "Mass caps"]
    MassCaps,
    #[name = "Mass mention"]
    MassMention,
}

impl From<FilterChoice> for FilterKind {
    fn from(choice: FilterChoice) -> Self {
        match choice {
            FilterChoice::Words => FilterKind::Words,
            FilterChoice::Links => FilterKind::Links,
            FilterChoice::MassCaps => FilterKind::MassCaps,
            FilterChoice::MassMention => FilterKind::MassMention,
        }
    }
}

/// Auto-moderation configuration commands.
///
/// Configure which filters run and what happens when a message breaks one.
#[poise::command(
    slash_command,
    subcommands(
        "status",
        "filter_add",
        "filter_remove",
        "auto_delete",
        "auto_warn",
        "threshold",
        "ban_word_add",
        "ban_word_remove",
        "ban_link_add",
        "ban_link_remove"
    ),
    required_permissions = "MANAGE_GUILD",
    guild_only
)]
pub async fn automod(_ctx: Context<'_>) -> Result<(), Error> {
    // Parent command - shows help
    Ok(())
}

fn on_off(enabled: bool) -> &'static str {
    if enabled {
        "✅ On"
    } else {
        "❌ Off"
    }
}

/// Show current auto-mod settings.
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_GUILD")]
pub async fn status(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be used in a server")?;

    let config = ctx
        .data()
        .automod_settings
        .get_config(guild_id.get())
        .await?;

    let filters = if config.filters.is_empty() {
        "None (auto-mod is inactive)".to_string()
    } else {
        config
            .filters
            .iter()
            .enumerate()
            .map(|(i, kind)| format!("{}. {}", i + 1, kind))
            .collect::<Vec<_>>()
            .join("\n")
    };

    let embed = serenity::CreateEmbed::new()
        .title("🛡️ Auto-Mod Status")
        .color(if config.filters.is_empty() {
            0xFF0000
        } else {
            0x00FF00
        })
        .field("Active Filters (checked in order)", filters, false)
        .field("Delete Messages", on_off(config.auto_delete_messages), true)
        .field("Warn Users", on_off(config.auto_warn_users), true)
        .field(
            "Mention Threshold",
            format!("{} mentions", config.filter_threshold),
            true,
        )
        .field(
            "Ban Lists",
            format!(
                "{} word{} • {} link{}",
                config.ban_words.len(),
                if config.ban_words.len() == 1 { "" } else { "s" },
                config.ban_links.len(),
                if config.ban_links.len() == 1 { "" } else { "s" }
            ),
            false,
        );

    ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
        .await?;
    Ok(())
}

/// Activate a filter. New filters run after the ones already active.
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_GUILD")]
pub async fn filter_add(
    ctx: Context<'_>,
    #[description = "Filter to activate"] filter: FilterChoice,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be used in a server")?;
    let kind = FilterKind::from(filter);

    let added = ctx
        .data()
        .automod_settings
        .add_filter(guild_id.get(), kind)
        .await?;

    if added {
        ctx.say(format!("✅ Filter **{}** is now active.", kind))
            .await?;
    } else {
        ctx.say(format!("Filter **{}** is already active.", kind))
            .await?;
    }
    Ok(())
}

/// Deactivate a filter.
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_GUILD")]
pub async fn filter_remove(
    ctx: Context<'_>,
    #[description = "Filter to deactivate"] filter: FilterChoice,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be used in a server")?;
    let kind = FilterKind::from(filter);

    let removed = ctx
        .data()
        .automod_settings
        .remove_filter(guild_id.get(), kind)
        .await?;

    if removed {
        ctx.say(format!("❌ Filter **{}** has been deactivated.", kind))
            .await?;
    } else {
        ctx.say(format!("Filter **{}** was not active.", kind))
            .await?;
    }
    Ok(())
}

/// Choose whether messages that break a filter are deleted.
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_GUILD")]
pub async fn auto_delete(
    ctx: Context<'_>,
    #[description = "Delete offending messages"] enabled: bool,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be used in a server")?;

    ctx.data()
        .automod_settings
        .set_auto_delete(guild_id.get(), enabled)
        .await?;

    ctx.say(format!("Auto-delete: {}", on_off(enabled))).await?;
    Ok(())
}

/// Choose whether authors of offending messages are warned.
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_GUILD")]
pub async fn auto_warn(
    ctx: Context<'_>,
    #[description = "Warn offending members"] enabled: bool,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be used in a server")?;

    ctx.data()
        .automod_settings
        .set_auto_warn(guild_id.get(), enabled)
        .await?;

    ctx.say(format!("Auto-warn: {}", on_off(enabled))).await?;
    Ok(())
}

/// Set how many mentions trip the mass-mention filter.
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_GUILD")]
pub async fn threshold(
    ctx: Context<'_>,
    #[description = "Mentions per message (default: 5)"]
    #[min = 1]
    mentions: u32,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be used in a server")?;

    ctx.data()
        .automod_settings
        .set_threshold(guild_id.get(), mentions)
        .await?;

    ctx.say(format!(
        "✅ Messages with {} or more mentions will be filtered.",
        mentions
    ))
    .await?;
    Ok(())
}

/// Add a word to the ban list.
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_GUILD")]
pub async fn ban_word_add(
    ctx: Context<'_>,
    #[description = "Word to ban"] word: String,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be used in a server")?;

    let added = ctx
        .data()
        .automod_settings
        .add_ban_word(guild_id.get(), &word)
        .await?;

    reply_list_change(ctx, added, "Word added to the ban list.", "That word is already banned.")
        .await
}

/// Remove a word from the ban list.
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_GUILD")]
pub async fn ban_word_remove(
    ctx: Context<'_>,
    #[description = "Word to allow again"] word: String,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be used in a server")?;

    let removed = ctx
        .data()
        .automod_settings
        .remove_ban_word(guild_id.get(), &word)
        .await?;

    reply_list_change(
        ctx,
        removed,
        "Word removed from the ban list.",
        "That word was not banned.",
    )
    .await
}

/// Add a link (or part of one, e.g. a domain) to the ban list.
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_GUILD")]
pub async fn ban_link_add(
    ctx: Context<'_>,
    #[description = "Link or domain to ban"] link: String,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be used in a server")?;

    let added = ctx
        .data()
        .automod_settings
        .add_ban_link(guild_id.get(), &link)
        .await?;

    reply_list_change(ctx, added, "Link added to the ban list.", "That link is already banned.")
        .await
}

/// Remove a link from the ban list.
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_GUILD")]
pub async fn ban_link_remove(
    ctx: Context<'_>,
    #[description = "Link or domain to allow again"] link: String,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be used in a server")?;

    let removed = ctx
        .data()
        .automod_settings
        .remove_ban_link(guild_id.get(), &link)
        .await?;

    reply_list_change(
        ctx,
        removed,
        "Link removed from the ban list.",
        "That link was not banned.",
    )
    .await
}

// Ban list contents stay out of the channel, so these replies are ephemeral.
async fn reply_list_change(
    ctx: Context<'_>,
    changed: bool,
    changed_msg: &str,
    unchanged_msg: &str,
) -> Result<(), Error> {
    let content = if changed {
        format!("✅ {}", changed_msg)
    } else {
        unchanged_msg.to_string()
    };

    ctx.send(poise::CreateReply::default().content(content).ephemeral(true))
        .await?;
    Ok(())
}
