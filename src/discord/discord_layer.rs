// Discord layer - commands and event handlers.

#[path = "moderation/mod.rs"]
pub mod moderation;

use crate::core::moderation::{AutoModService, AutoModSettingsService};
use crate::infra::moderation::{SqliteAutoModConfigStore, SqliteMemberStore};
use std::sync::Arc;

/// Shared state handed to every command and event.
pub struct Data {
    pub automod: Arc<AutoModService<SqliteMemberStore>>,
    pub automod_settings: Arc<AutoModSettingsService<SqliteAutoModConfigStore>>,
}

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;
