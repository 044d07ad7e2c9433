// Per-guild auto-moderation settings.
//
// Configs are read on every guild message, so they are cached in memory in
// front of the store. Writes go to the store first, then refresh the cache.

use super::moderation_models::{AutoModConfig, FilterKind};
use super::moderation_service::StoreError;
use async_trait::async_trait;
use dashmap::DashMap;

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
    #[error("Invalid value: {0}")]
    InvalidValue(String),
}

#[async_trait]
pub trait AutoModConfigStore: Send + Sync {
    async fn get_config(&self, guild_id: u64) -> Result<Option<AutoModConfig>, StoreError>;
    async fn save_config(&self, guild_id: u64, config: &AutoModConfig) -> Result<(), StoreError>;
}

pub struct AutoModSettingsService<S: AutoModConfigStore> {
    store: S,
    // Guild ID -> config, filled lazily
    cache: DashMap<u64, AutoModConfig>,
}

impl<S: AutoModConfigStore> AutoModSettingsService<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            cache: DashMap::new(),
        }
    }

    /// The guild's config, or the defaults if it never configured auto-mod.
    pub async fn get_config(&self, guild_id: u64) -> Result<AutoModConfig, SettingsError> {
        if let Some(config) = self.cache.get(&guild_id) {
            return Ok(config.clone());
        }

        let config = self.store.get_config(guild_id).await?.unwrap_or_default();
        self.cache.insert(guild_id, config.clone());
        Ok(config)
    }

    pub async fn set_config(
        &self,
        guild_id: u64,
        config: AutoModConfig,
    ) -> Result<(), SettingsError> {
        self.store.save_config(guild_id, &config).await?;
        self.cache.insert(guild_id, config);
        Ok(())
    }

    /// Apply `change` to the guild's config and persist it if it reports a change.
    async fn update<F>(&self, guild_id: u64, change: F) -> Result<bool, SettingsError>
    where
        F: FnOnce(&mut AutoModConfig) -> bool + Send,
    {
        let mut config = self.get_config(guild_id).await?;
        if !change(&mut config) {
            return Ok(false);
        }

        self.set_config(guild_id, config).await?;
        tracing::info!(guild_id, "Auto-mod settings updated");
        Ok(true)
    }

    /// Activate a filter. It runs after the filters already active.
    pub async fn add_filter(&self, guild_id: u64, kind: FilterKind) -> Result<bool, SettingsError> {
        self.update(guild_id, |config| {
            if config.filters.contains(&kind) {
                return false;
            }
            config.filters.push(kind);
            true
        })
        .await
    }

    pub async fn remove_filter(
        &self,
        guild_id: u64,
        kind: FilterKind,
    ) -> Result<bool, SettingsError> {
        self.update(guild_id, |config| {
            let before = config.filters.len();
            config.filters.retain(|k| *k != kind);
            config.filters.len() != before
        })
        .await
    }

    pub async fn set_auto_delete(&self, guild_id: u64, enabled: bool) -> Result<(), SettingsError> {
        self.update(guild_id, |config| {
            config.auto_delete_messages = enabled;
            true
        })
        .await
        .map(|_| ())
    }

    pub async fn set_auto_warn(&self, guild_id: u64, enabled: bool) -> Result<(), SettingsError> {
        self.update(guild_id, |config| {
            config.auto_warn_users = enabled;
            true
        })
        .await
        .map(|_| ())
    }

    pub async fn set_threshold(&self, guild_id: u64, threshold: u32) -> Result<(), SettingsError> {
        if threshold == 0 {
            return Err(SettingsError::InvalidValue(
                "threshold must be at least 1".to_string(),
            ));
        }

        self.update(guild_id, |config| {
            config.filter_threshold = threshold;
            true
        })
        .await
        .map(|_| ())
    }

    pub async fn add_ban_word(&self, guild_id: u64, word: &str) -> Result<bool, SettingsError> {
        let word = normalize_entry(word)?;
        self.update(guild_id, move |config| add_unique(&mut config.ban_words, word))
            .await
    }

    pub async fn remove_ban_word(&self, guild_id: u64, word: &str) -> Result<bool, SettingsError> {
        let word = word.trim().to_lowercase();
        self.update(guild_id, move |config| remove_entry(&mut config.ban_words, &word))
            .await
    }

    pub async fn add_ban_link(&self, guild_id: u64, link: &str) -> Result<bool, SettingsError> {
        let link = normalize_entry(link)?;
        self.update(guild_id, move |config| add_unique(&mut config.ban_links, link))
            .await
    }

    pub async fn remove_ban_link(&self, guild_id: u64, link: &str) -> Result<bool, SettingsError> {
        let link = link.trim().to_lowercase();
        self.update(guild_id, move |config| remove_entry(&mut config.ban_links, &link))
            .await
    }
}

fn normalize_entry(entry: &str) -> Result<String, SettingsError> {
    let entry = entry.trim().to_lowercase();
    if entry.is_empty() {
        return Err(SettingsError::InvalidValue(
            "entry cannot be empty".to_string(),
        ));
    }
    Ok(entry)
}

fn add_unique(list: &mut Vec<String>, entry: String) -> bool {
    if list.iter().any(|e| e.to_lowercase() == entry) {
        return false;
    }
    list.push(entry);
    true
}

fn remove_entry(list: &mut Vec<String>, entry: &str) -> bool {
    let before = list.len();
    list.retain(|e| e.to_lowercase() != entry);
    list.len() != before
}
