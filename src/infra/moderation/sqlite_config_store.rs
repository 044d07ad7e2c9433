// SQLite-backed store for per-guild auto-moderation settings.
//
// Tables:
// - automod_config: one row per guild; list columns hold JSON arrays

use crate::core::moderation::{AutoModConfig, AutoModConfigStore, FilterKind, StoreError};
use async_trait::async_trait;
use sqlx::{Pool, Row, Sqlite};

pub struct SqliteAutoModConfigStore {
    pool: Pool<Sqlite>,
}

impl SqliteAutoModConfigStore {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Run database migrations to create required tables.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS automod_config (
                guild_id INTEGER PRIMARY KEY,
                filters TEXT NOT NULL DEFAULT '["Words"]',
                auto_delete_messages BOOLEAN NOT NULL DEFAULT 1,
                auto_warn_users BOOLEAN NOT NULL DEFAULT 1,
                ban_words TEXT NOT NULL DEFAULT '[]',
                ban_links TEXT NOT NULL DEFAULT '[]',
                filter_threshold INTEGER NOT NULL DEFAULT 5
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }
}

#[async_trait]
impl AutoModConfigStore for SqliteAutoModConfigStore {
    async fn get_config(&self, guild_id: u64) -> Result<Option<AutoModConfig>, StoreError> {
        let row = sqlx::query("SELECT * FROM automod_config WHERE guild_id = ?")
            .bind(guild_id as i64)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let filters_json: String = row.get("filters");
        let ban_words_json: String = row.get("ban_words");
        let ban_links_json: String = row.get("ban_links");

        let filters: Vec<FilterKind> = serde_json::from_str(&filters_json)?;
        let stored_threshold: i64 = row.get("filter_threshold");
        let filter_threshold = u32::try_from(stored_threshold).map_err(|_| {
            StoreError::Database(format!(
                "filter_threshold out of range for guild {}: {}",
                guild_id, stored_threshold
            ))
        })?;

        Ok(Some(AutoModConfig {
            filters,
            auto_delete_messages: row.get("auto_delete_messages"),
            auto_warn_users: row.get("auto_warn_users"),
            ban_words: serde_json::from_str(&ban_words_json)?,
            ban_links: serde_json::from_str(&ban_links_json)?,
            filter_threshold,
        }))
    }

    async fn save_config(&self, guild_id: u64, config: &AutoModConfig) -> Result<(), StoreError> {
        let filters_json = serde_json::to_string(&config.filters)?;
        let ban_words_json = serde_json::to_string(&config.ban_words)?;
        let ban_links_json = serde_json::to_string(&config.ban_links)?;

        sqlx::query(
            r#"
            INSERT INTO automod_config (
                guild_id, filters, auto_delete_messages, auto_warn_users,
                ban_words, ban_links, filter_threshold
            )
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(guild_id) DO UPDATE SET
                filters = excluded.filters,
                auto_delete_messages = excluded.auto_delete_messages,
                auto_warn_users = excluded.auto_warn_users,
                ban_words = excluded.ban_words,
                ban_links = excluded.ban_links,
                filter_threshold = excluded.filter_threshold
            "#,
        )
        .bind(guild_id as i64)
        .bind(filters_json)
        .bind(config.auto_delete_messages)
        .bind(config.auto_warn_users)
        .bind(ban_words_json)
        .bind(ban_links_json)
        .bind(config.filter_threshold as i64)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }
}
