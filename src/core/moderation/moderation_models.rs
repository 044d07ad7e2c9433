// Auto-moderation domain models.
//
// These are pure domain types with no Discord dependencies.
// The Discord layer converts serenity messages into `IncomingMessage`
// and turns the service results back into Discord actions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Reason recorded when a warning is issued without one.
pub const DEFAULT_WARN_REASON: &str = "No reason specified.";

/// Which content check a filter applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilterKind {
    /// Banned words
    Words,
    /// Banned links
    Links,
    /// Excessive capital letters
    MassCaps,
    /// Too many user mentions
    MassMention,
}

impl std::fmt::Display for FilterKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FilterKind::Words => write!(f, "Words"),
            FilterKind::Links => write!(f, "Links"),
            FilterKind::MassCaps => write!(f, "MassCaps"),
            FilterKind::MassMention => write!(f, "MassMention"),
        }
    }
}

/// Per-guild auto-moderation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutoModConfig {
    /// Active filters, checked in this order
    pub filters: Vec<FilterKind>,
    /// Delete messages that fail a filter
    pub auto_delete_messages: bool,
    /// Warn the author of messages that fail a filter
    pub auto_warn_users: bool,
    /// Words rejected by the Words filter
    pub ban_words: Vec<String>,
    /// Link fragments rejected by the Links filter
    pub ban_links: Vec<String>,
    /// Mention count at which the MassMention filter fails
    pub filter_threshold: u32,
}

impl Default for AutoModConfig {
    fn default() -> Self {
        Self {
            filters: vec![FilterKind::Words],
            auto_delete_messages: true,
            auto_warn_users: true,
            ban_words: Vec::new(),
            ban_links: Vec::new(),
            filter_threshold: 5,
        }
    }
}

/// The member side of a moderation action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemberRef {
    pub user_id: u64,
    pub is_bot: bool,
}

/// Snapshot of a chat message, extracted from the platform by the Discord layer.
#[derive(Debug, Clone)]
pub struct IncomingMessage {
    pub message_id: u64,
    pub channel_id: u64,
    pub guild_id: u64,
    pub content: String,
    /// Guild member who sent the message, if the platform resolved one
    pub author: Option<MemberRef>,
    /// The bot's own user id, used as the instigator of automatic warnings
    pub client_user_id: Option<u64>,
}

/// One recorded warning against a member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Warning {
    pub reason: String,
    pub instigator_id: u64,
    pub at: DateTime<Utc>,
}

/// Persisted moderation state for a member of a guild.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberRecord {
    pub guild_id: u64,
    pub user_id: u64,
    pub warnings: Vec<Warning>,
}

impl MemberRecord {
    /// A fresh record with no history.
    pub fn new(guild_id: u64, user_id: u64) -> Self {
        Self {
            guild_id,
            user_id,
            warnings: Vec::new(),
        }
    }
}

/// Result of a successful warn.
#[derive(Debug, Clone)]
pub struct WarnOutcome {
    /// The warning that was persisted
    pub warning: Warning,
    /// Whether the direct-message notification reached the member
    pub notified: bool,
}

/// Text of the direct message sent to a warned member.
pub fn warning_notice(instigator_id: u64, reason: &str) -> String {
    format!("<@!{}> warned you for `{}`", instigator_id, reason)
}
