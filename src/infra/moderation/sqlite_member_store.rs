// SQLite-backed member store.
//
// Tables:
// - members: one row per (guild, user); warnings is a JSON array

use crate::core::moderation::{MemberRecord, MemberStore, StoreError, Warning};
use async_trait::async_trait;
use sqlx::{Pool, Row, Sqlite};

pub struct SqliteMemberStore {
    pool: Pool<Sqlite>,
}

impl SqliteMemberStore {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS members (
                guild_id INTEGER NOT NULL,
                user_id INTEGER NOT NULL,
                warnings TEXT NOT NULL DEFAULT '[]',
                PRIMARY KEY (guild_id, user_id)
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
impl MemberStore for SqliteMemberStore {
    async fn get(&self, guild_id: u64, user_id: u64) -> Result<MemberRecord, StoreError> {
        let row = sqlx::query("SELECT warnings FROM members WHERE guild_id = ? AND user_id = ?")
            .bind(guild_id as i64)
            .bind(user_id as i64)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;

        // First contact: the record starts empty and is written on save
        let Some(row) = row else {
            return Ok(MemberRecord::new(guild_id, user_id));
        };

        let warnings_json: String = row.get("warnings");
        let warnings: Vec<Warning> = serde_json::from_str(&warnings_json)?;

        Ok(MemberRecord {
            guild_id,
            user_id,
            warnings,
        })
    }

    async fn save(&self, record: &MemberRecord) -> Result<(), StoreError> {
        let warnings_json = serde_json::to_string(&record.warnings)?;

        sqlx::query(
            r#"
            INSERT INTO members (guild_id, user_id, warnings)
            VALUES (?, ?, ?)
            ON CONFLICT(guild_id, user_id) DO UPDATE SET
                warnings = excluded.warnings
            "#,
        )
        .bind(record.guild_id as i64)
        .bind(record.user_id as i64)
        .bind(warnings_json)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }
}
