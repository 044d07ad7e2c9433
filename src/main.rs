// This is the entry point of the auto-moderation bot.
//
// **Architecture Overview:**
// - `core/` = Business logic (platform-agnostic)
// - `infra/` = Implementations of core traits (databases)
// - `discord/` = Discord-specific adapters (commands, events)
//
// This file's job is to:
// 1. Load configuration
// 2. Initialize services (dependency injection)
// 3. Set up the Discord framework
// 4. Register commands and event handlers

// These attrs point each module declaration at a more descriptive root file
// so we don't end up with half a dozen mod.rs files that all look the same.
#[path = "core/core_layer.rs"]
mod core;
#[path = "discord/discord_layer.rs"]
mod discord;
#[path = "infra/infra_layer.rs"]
mod infra;

use crate::core::moderation::{AutoModService, AutoModSettingsService};
use crate::discord::moderation::automod_handler::handle_message_for_automod;
use crate::discord::{Data, Error};
use crate::infra::moderation::{SqliteAutoModConfigStore, SqliteMemberStore};
use anyhow::Context as _;
use poise::serenity_prelude as serenity;
use std::path::PathBuf;
use std::sync::Arc;

/// Process-level settings read from the environment (and `.env`).
struct BotSettings {
    token: String,
    data_dir: PathBuf,
    database_path: PathBuf,
}

impl BotSettings {
    fn from_env() -> anyhow::Result<Self> {
        let token = std::env::var("DISCORD_TOKEN").context(
            "Missing DISCORD_TOKEN environment variable! Create a .env file with your bot token.",
        )?;

        // Keep runtime databases in a dedicated folder so the repo root stays tidy.
        let data_dir = PathBuf::from(std::env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string()));
        let database_path = std::env::var("AUTOMOD_DB")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_dir.join("automod.db"));

        Ok(Self {
            token,
            data_dir,
            database_path,
        })
    }
}

/// Event handler for non-command Discord events.
async fn event_handler(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, Data, Error>,
    data: &Data,
) -> Result<(), Error> {
    match event {
        serenity::FullEvent::Message { new_message } => {
            if let Err(e) = handle_message_for_automod(ctx, new_message, data).await {
                tracing::error!(
                    message_id = new_message.id.get(),
                    "Error running auto-mod on message: {}",
                    e
                );
            }
        }

        _ => {}
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging so we can see what's happening
    tracing_subscriber::fmt::init();

    // Load environment variables from .env file (if it exists)
    dotenv::dotenv().ok();

    let settings = BotSettings::from_env()?;
    std::fs::create_dir_all(&settings.data_dir)
        .context("Failed to create data directory for SQLite files")?;

    // ========================================================================
    // DEPENDENCY INJECTION
    // ========================================================================
    // This is the "composition root" where we wire everything together.

    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .connect(&format!(
            "sqlite://{}?mode=rwc",
            settings.database_path.display()
        ))
        .await
        .context("Failed to connect to auto-mod DB")?;

    let member_store = SqliteMemberStore::new(pool.clone());
    member_store.migrate().await?;
    let config_store = SqliteAutoModConfigStore::new(pool);
    config_store.migrate().await?;

    let data = Data {
        automod: Arc::new(AutoModService::new(member_store)),
        automod_settings: Arc::new(AutoModSettingsService::new(config_store)),
    };

    tracing::info!(
        database = %settings.database_path.display(),
        "Auto-mod storage ready"
    );

    // ========================================================================
    // DISCORD FRAMEWORK SETUP
    // ========================================================================

    let intents = serenity::GatewayIntents::GUILD_MESSAGES
        | serenity::GatewayIntents::MESSAGE_CONTENT // Required to read message content
        | serenity::GatewayIntents::GUILDS;

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![
                discord::moderation::commands::automod(),
                discord::moderation::warn_commands::warn(),
                discord::moderation::warn_commands::warnings(),
            ],
            event_handler: |ctx, event, framework, data| {
                Box::pin(event_handler(ctx, event, framework, data))
            },
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                tracing::info!(bot = %ready.user.name, "Commands registered, bot is ready");
                Ok(data)
            })
        })
        .build();

    let mut client = serenity::ClientBuilder::new(settings.token, intents)
        .framework(framework)
        .await
        .context("Error creating client")?;

    client.start().await.context("Error running bot")?;
    Ok(())
}
