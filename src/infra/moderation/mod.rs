// SQLite implementations of the auto-moderation stores.

pub mod sqlite_config_store;
pub mod sqlite_member_store;

pub use sqlite_config_store::SqliteAutoModConfigStore;
pub use sqlite_member_store::SqliteMemberStore;
