// Auto-moderation service - core business logic for message filtering.
//
// This service handles:
// - Running a guild's active filters against a message, in configured order
// - Applying the configured consequences of a violation (delete, warn)
// - Recording warnings against members
//
// NO Discord dependencies here - platform side effects go through the
// `ModerationActions` port and persistence through `MemberStore`.

use super::moderation_models::{
    warning_notice, AutoModConfig, IncomingMessage, MemberRecord, MemberRef, WarnOutcome, Warning,
    DEFAULT_WARN_REASON,
};
use super::validators::{FilterRegistry, ValidationError};
use async_trait::async_trait;
use chrono::Utc;
use thiserror::Error;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum AutoModError {
    /// The message broke a content filter.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The caller asked for something that is not allowed (e.g. self-warn).
    #[error("{0}")]
    InvalidArgument(String),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Platform error: {0}")]
    Platform(String),
}

// ============================================================================
// PORTS
// ============================================================================

/// Persistence for per-member moderation state.
#[async_trait]
pub trait MemberStore: Send + Sync {
    /// Load a member's record, creating an empty one if none exists.
    async fn get(&self, guild_id: u64, user_id: u64) -> Result<MemberRecord, StoreError>;

    /// Persist a member's record.
    async fn save(&self, record: &MemberRecord) -> Result<(), StoreError>;
}

/// Side effects on the chat platform.
#[async_trait]
pub trait ModerationActions: Send + Sync {
    /// Delete a message, recording `reason` in the audit log.
    async fn delete_message(
        &self,
        message: &IncomingMessage,
        reason: &str,
    ) -> Result<(), AutoModError>;

    /// Send a direct message to a user.
    async fn send_direct_message(&self, user_id: u64, content: &str) -> Result<(), AutoModError>;
}

// ============================================================================
// CORE SERVICE
// ============================================================================

pub struct AutoModService<S: MemberStore> {
    store: S,
    registry: FilterRegistry,
}

impl<S: MemberStore> AutoModService<S> {
    /// Create a service using the built-in validators.
    pub fn new(store: S) -> Self {
        Self::with_registry(store, FilterRegistry::builtin())
    }

    pub fn with_registry(store: S, registry: FilterRegistry) -> Self {
        Self { store, registry }
    }

    /// Run the guild's active filters against a message.
    ///
    /// The first failing filter wins: its consequences are applied and its
    /// `ValidationError` is returned. Later filters are not run. Filters with
    /// no registered validator are skipped.
    pub async fn validate_message<A>(
        &self,
        actions: &A,
        message: &IncomingMessage,
        config: &AutoModConfig,
    ) -> Result<(), AutoModError>
    where
        A: ModerationActions + ?Sized,
    {
        for kind in &config.filters {
            let Some(factory) = self.registry.lookup(*kind) else {
                continue;
            };

            let outcome = factory().validate(&message.content, config);
            if let Err(violation) = outcome {
                tracing::debug!(
                    guild_id = message.guild_id,
                    message_id = message.message_id,
                    filter = %violation.filter,
                    "Message failed filter"
                );
                self.apply_consequences(actions, message, config, &violation)
                    .await?;
                return Err(AutoModError::Validation(violation));
            }
        }

        Ok(())
    }

    /// Delete and/or warn according to the guild's settings.
    async fn apply_consequences<A>(
        &self,
        actions: &A,
        message: &IncomingMessage,
        config: &AutoModConfig,
        violation: &ValidationError,
    ) -> Result<(), AutoModError>
    where
        A: ModerationActions + ?Sized,
    {
        // A failed delete stops here: the member is not warned.
        if config.auto_delete_messages {
            actions
                .delete_message(message, &violation.message)
                .await
                .map_err(|e| {
                    tracing::warn!(
                        message_id = message.message_id,
                        "Failed to delete filtered message: {}",
                        e
                    );
                    e
                })?;
        }

        if !config.auto_warn_users {
            return Ok(());
        }

        let (Some(author), Some(instigator_id)) = (message.author, message.client_user_id) else {
            return Ok(());
        };

        match self
            .warn_member(
                actions,
                message.guild_id,
                author,
                instigator_id,
                Some(&violation.message),
            )
            .await
        {
            Ok(_) => Ok(()),
            Err(AutoModError::InvalidArgument(reason)) => {
                tracing::debug!(
                    user_id = author.user_id,
                    "Skipped automatic warning: {}",
                    reason
                );
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Record a warning against a member and let them know about it.
    ///
    /// The warning is persisted before the member is notified; a failed
    /// notification does not fail the warn.
    pub async fn warn_member<A>(
        &self,
        actions: &A,
        guild_id: u64,
        member: MemberRef,
        instigator_id: u64,
        reason: Option<&str>,
    ) -> Result<WarnOutcome, AutoModError>
    where
        A: ModerationActions + ?Sized,
    {
        if member.user_id == instigator_id {
            return Err(AutoModError::InvalidArgument(
                "You cannot warn yourself.".to_string(),
            ));
        }
        if member.is_bot {
            return Err(AutoModError::InvalidArgument(
                "Bots cannot be warned.".to_string(),
            ));
        }

        let reason = reason.unwrap_or(DEFAULT_WARN_REASON);
        let warning = Warning {
            reason: reason.to_string(),
            instigator_id,
            at: Utc::now(),
        };

        let mut record = self.store.get(guild_id, member.user_id).await?;
        record.warnings.push(warning.clone());
        self.store.save(&record).await?;

        tracing::info!(
            guild_id,
            user_id = member.user_id,
            instigator_id,
            total_warnings = record.warnings.len(),
            "Member warned"
        );

        let notified = notify_best_effort(
            actions,
            member.user_id,
            &warning_notice(instigator_id, reason),
        )
        .await;

        Ok(WarnOutcome { warning, notified })
    }

    /// All warnings recorded for a member, oldest first.
    pub async fn get_warnings(
        &self,
        guild_id: u64,
        user_id: u64,
    ) -> Result<Vec<Warning>, AutoModError> {
        Ok(self.store.get(guild_id, user_id).await?.warnings)
    }
}

/// Try to DM a member. Delivery failures are logged and reported as `false`;
/// they never fail the caller.
async fn notify_best_effort<A>(actions: &A, user_id: u64, content: &str) -> bool
where
    A: ModerationActions + ?Sized,
{
    match actions.send_direct_message(user_id, content).await {
        Ok(()) => true,
        Err(e) => {
            tracing::debug!(user_id, "Could not notify warned member: {}", e);
            false
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::moderation::{
        BadWordValidator, FilterKind, MassCapsValidator, Validator,
    };
    use dashmap::DashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    const GUILD: u64 = 456;
    const AUTHOR: u64 = 123;
    const BOT: u64 = 999;

    type EventLog = Arc<Mutex<Vec<String>>>;

    /// In-memory store for testing
    struct MockMemberStore {
        records: DashMap<(u64, u64), MemberRecord>,
        events: EventLog,
    }

    impl MockMemberStore {
        fn new(events: EventLog) -> Self {
            Self {
                records: DashMap::new(),
                events,
            }
        }
    }

    #[async_trait]
    impl MemberStore for MockMemberStore {
        async fn get(&self, guild_id: u64, user_id: u64) -> Result<MemberRecord, StoreError> {
            Ok(self
                .records
                .get(&(guild_id, user_id))
                .map(|r| r.clone())
                .unwrap_or_else(|| MemberRecord::new(guild_id, user_id)))
        }

        async fn save(&self, record: &MemberRecord) -> Result<(), StoreError> {
            self.events
                .lock()
                .unwrap()
                .push(format!("save:{}", record.user_id));
            self.records
                .insert((record.guild_id, record.user_id), record.clone());
            Ok(())
        }
    }

    /// Store whose reads always fail; records every call it receives.
    struct FailingMemberStore {
        events: EventLog,
    }

    impl FailingMemberStore {
        fn new(events: EventLog) -> Self {
            Self { events }
        }
    }

    #[async_trait]
    impl MemberStore for FailingMemberStore {
        async fn get(&self, _guild_id: u64, user_id: u64) -> Result<MemberRecord, StoreError> {
            self.events.lock().unwrap().push(format!("get:{}", user_id));
            Err(StoreError::Database("database is locked".to_string()))
        }

        async fn save(&self, record: &MemberRecord) -> Result<(), StoreError> {
            self.events
                .lock()
                .unwrap()
                .push(format!("save:{}", record.user_id));
            Err(StoreError::Database("database is locked".to_string()))
        }
    }

    /// Records every platform call; can be told to fail them.
    struct RecordingActions {
        events: EventLog,
        fail_delete: bool,
        fail_dm: bool,
    }

    impl RecordingActions {
        fn new(events: EventLog) -> Self {
            Self {
                events,
                fail_delete: false,
                fail_dm: false,
            }
        }

        fn count(&self, prefix: &str) -> usize {
            self.events
                .lock()
                .unwrap()
                .iter()
                .filter(|e| e.starts_with(prefix))
                .count()
        }
    }

    #[async_trait]
    impl ModerationActions for RecordingActions {
        async fn delete_message(
            &self,
            message: &IncomingMessage,
            reason: &str,
        ) -> Result<(), AutoModError> {
            self.events
                .lock()
                .unwrap()
                .push(format!("delete:{}:{}", message.message_id, reason));
            if self.fail_delete {
                return Err(AutoModError::Platform("missing permissions".to_string()));
            }
            Ok(())
        }

        async fn send_direct_message(
            &self,
            user_id: u64,
            content: &str,
        ) -> Result<(), AutoModError> {
            self.events
                .lock()
                .unwrap()
                .push(format!("dm:{}:{}", user_id, content));
            if self.fail_dm {
                return Err(AutoModError::Platform("DMs closed".to_string()));
            }
            Ok(())
        }
    }

    /// Wraps a validator and counts how often it runs.
    struct Counting<V: Validator> {
        inner: V,
        calls: Arc<AtomicUsize>,
    }

    impl<V: Validator> Validator for Counting<V> {
        fn validate(
            &self,
            content: &str,
            config: &AutoModConfig,
        ) -> Result<(), ValidationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.validate(content, config)
        }
    }

    fn message(content: &str) -> IncomingMessage {
        IncomingMessage {
            message_id: 1,
            channel_id: 2,
            guild_id: GUILD,
            content: content.to_string(),
            author: Some(MemberRef {
                user_id: AUTHOR,
                is_bot: false,
            }),
            client_user_id: Some(BOT),
        }
    }

    fn scenario_config() -> AutoModConfig {
        AutoModConfig {
            filters: vec![FilterKind::Words, FilterKind::MassCaps],
            auto_delete_messages: true,
            auto_warn_users: true,
            ban_words: vec!["heck".to_string()],
            ..Default::default()
        }
    }

    fn setup() -> (AutoModService<MockMemberStore>, RecordingActions) {
        let events: EventLog = Arc::new(Mutex::new(Vec::new()));
        let service = AutoModService::new(MockMemberStore::new(Arc::clone(&events)));
        (service, RecordingActions::new(events))
    }

    #[tokio::test]
    async fn test_empty_filter_list_allows_everything() {
        let (service, actions) = setup();
        let config = AutoModConfig {
            filters: Vec::new(),
            ban_words: vec!["heck".to_string()],
            ..Default::default()
        };

        service
            .validate_message(&actions, &message("HECK HECK <@1> <@2> <@3> <@4> <@5>"), &config)
            .await
            .unwrap();

        assert!(actions.events.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_first_failing_filter_wins() {
        let events: EventLog = Arc::new(Mutex::new(Vec::new()));
        let caps_calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&caps_calls);
        let registry = FilterRegistry::builtin().with(FilterKind::MassCaps, move || {
            Box::new(Counting {
                inner: MassCapsValidator,
                calls: Arc::clone(&counter),
            })
        });
        let service =
            AutoModService::with_registry(MockMemberStore::new(Arc::clone(&events)), registry);
        let actions = RecordingActions::new(events);

        // Triggers Words only; MassCaps would pass anyway but must never run.
        let result = service
            .validate_message(&actions, &message("oh heck no"), &scenario_config())
            .await;

        match result {
            Err(AutoModError::Validation(v)) => {
                assert_eq!(v.filter, FilterKind::Words);
                assert_eq!(v.message, "Message contains banned words.");
            }
            other => panic!("expected validation error, got {:?}", other),
        }
        assert_eq!(caps_calls.load(Ordering::SeqCst), 0);
        assert_eq!(actions.count("delete:"), 1);

        let warnings = service.get_warnings(GUILD, AUTHOR).await.unwrap();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].reason, "Message contains banned words.");
        assert_eq!(warnings[0].instigator_id, BOT);
    }

    #[tokio::test]
    async fn test_filter_order_decides_which_error_is_raised() {
        let (service, actions) = setup();
        let config = AutoModConfig {
            filters: vec![FilterKind::MassCaps, FilterKind::Words],
            auto_delete_messages: false,
            auto_warn_users: false,
            ban_words: vec!["HECK".to_string()],
            ..Default::default()
        };

        let err = service
            .validate_message(&actions, &message("HECK THIS"), &config)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AutoModError::Validation(ValidationError {
                filter: FilterKind::MassCaps,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_clean_message_has_no_side_effects() {
        let (service, actions) = setup();

        service
            .validate_message(&actions, &message("hello there"), &scenario_config())
            .await
            .unwrap();

        assert!(actions.events.lock().unwrap().is_empty());
        assert!(service.get_warnings(GUILD, AUTHOR).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_no_delete_when_auto_delete_disabled() {
        let (service, actions) = setup();
        let config = AutoModConfig {
            auto_delete_messages: false,
            ..scenario_config()
        };

        let result = service
            .validate_message(&actions, &message("heck"), &config)
            .await;

        assert!(matches!(result, Err(AutoModError::Validation(_))));
        assert_eq!(actions.count("delete:"), 0);
        assert_eq!(service.get_warnings(GUILD, AUTHOR).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_no_warning_without_author() {
        let (service, actions) = setup();
        let mut msg = message("heck");
        msg.author = None;

        let result = service
            .validate_message(&actions, &msg, &scenario_config())
            .await;

        assert!(matches!(result, Err(AutoModError::Validation(_))));
        assert_eq!(actions.count("save:"), 0);
        assert_eq!(actions.count("dm:"), 0);
        assert_eq!(actions.count("delete:"), 1);
    }

    #[tokio::test]
    async fn test_no_warning_without_client_identity() {
        let (service, actions) = setup();
        let mut msg = message("heck");
        msg.client_user_id = None;

        let result = service
            .validate_message(&actions, &msg, &scenario_config())
            .await;

        assert!(matches!(result, Err(AutoModError::Validation(_))));
        assert!(service.get_warnings(GUILD, AUTHOR).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_delete_propagates_and_skips_warning() {
        let (service, mut actions) = setup();
        actions.fail_delete = true;

        let result = service
            .validate_message(&actions, &message("heck"), &scenario_config())
            .await;

        assert!(matches!(result, Err(AutoModError::Platform(_))));
        assert_eq!(actions.count("save:"), 0);
        assert_eq!(actions.count("dm:"), 0);
        assert!(service.get_warnings(GUILD, AUTHOR).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_store_read_failure_fails_warn_without_dm() {
        let events: EventLog = Arc::new(Mutex::new(Vec::new()));
        let service = AutoModService::new(FailingMemberStore::new(Arc::clone(&events)));
        let actions = RecordingActions::new(events);
        let member = MemberRef {
            user_id: AUTHOR,
            is_bot: false,
        };

        let err = service
            .warn_member(&actions, GUILD, member, BOT, Some("spam"))
            .await
            .unwrap_err();

        assert!(matches!(err, AutoModError::Store(StoreError::Database(_))));
        assert_eq!(actions.count("get:"), 1);
        assert_eq!(actions.count("save:"), 0);
        assert_eq!(actions.count("dm:"), 0);
    }

    #[tokio::test]
    async fn test_store_failure_during_auto_warn_propagates() {
        let events: EventLog = Arc::new(Mutex::new(Vec::new()));
        let service = AutoModService::new(FailingMemberStore::new(Arc::clone(&events)));
        let actions = RecordingActions::new(events);

        let err = service
            .validate_message(&actions, &message("heck"), &scenario_config())
            .await
            .unwrap_err();

        assert!(matches!(err, AutoModError::Store(_)));
        assert_eq!(actions.count("delete:"), 1);
        assert_eq!(actions.count("save:"), 0);
        assert_eq!(actions.count("dm:"), 0);
    }

    #[tokio::test]
    async fn test_bot_author_keeps_validation_error() {
        let (service, actions) = setup();
        let mut msg = message("heck");
        msg.author = Some(MemberRef {
            user_id: AUTHOR,
            is_bot: true,
        });

        let result = service
            .validate_message(&actions, &msg, &scenario_config())
            .await;

        assert!(matches!(result, Err(AutoModError::Validation(_))));
        assert!(service.get_warnings(GUILD, AUTHOR).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unregistered_filters_are_skipped() {
        let events: EventLog = Arc::new(Mutex::new(Vec::new()));
        let registry =
            FilterRegistry::default().with(FilterKind::Words, || Box::new(BadWordValidator));
        let service =
            AutoModService::with_registry(MockMemberStore::new(Arc::clone(&events)), registry);
        let actions = RecordingActions::new(events);
        let config = AutoModConfig {
            filters: vec![FilterKind::MassCaps, FilterKind::Words],
            ..scenario_config()
        };

        service
            .validate_message(&actions, &message("ALL CAPS BUT CLEAN"), &config)
            .await
            .unwrap();

        let err = service
            .validate_message(&actions, &message("ALL CAPS HECK"), &config)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AutoModError::Validation(ValidationError {
                filter: FilterKind::Words,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_self_warn_is_rejected() {
        let (service, actions) = setup();
        let member = MemberRef {
            user_id: AUTHOR,
            is_bot: false,
        };

        let err = service
            .warn_member(&actions, GUILD, member, AUTHOR, Some("spam"))
            .await
            .unwrap_err();

        assert!(matches!(err, AutoModError::InvalidArgument(_)));
        assert_eq!(err.to_string(), "You cannot warn yourself.");
        assert!(actions.events.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_bot_warn_is_rejected() {
        let (service, actions) = setup();
        let member = MemberRef {
            user_id: 77,
            is_bot: true,
        };

        let err = service
            .warn_member(&actions, GUILD, member, AUTHOR, None)
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Bots cannot be warned.");
        assert!(service.get_warnings(GUILD, 77).await.unwrap().is_empty());
        assert!(actions.events.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_warn_uses_default_reason_and_saves_before_notifying() {
        let (service, actions) = setup();
        let member = MemberRef {
            user_id: AUTHOR,
            is_bot: false,
        };

        let outcome = service
            .warn_member(&actions, GUILD, member, BOT, None)
            .await
            .unwrap();

        assert_eq!(outcome.warning.reason, DEFAULT_WARN_REASON);
        assert_eq!(outcome.warning.instigator_id, BOT);
        assert!(outcome.notified);

        let events = actions.events.lock().unwrap().clone();
        assert_eq!(
            events,
            vec![
                format!("save:{}", AUTHOR),
                format!("dm:{}:<@!{}> warned you for `No reason specified.`", AUTHOR, BOT),
            ]
        );
    }

    #[tokio::test]
    async fn test_failed_notification_keeps_warning() {
        let (service, mut actions) = setup();
        actions.fail_dm = true;
        let member = MemberRef {
            user_id: AUTHOR,
            is_bot: false,
        };

        let outcome = service
            .warn_member(&actions, GUILD, member, BOT, Some("Be nice"))
            .await
            .unwrap();

        assert!(!outcome.notified);
        let warnings = service.get_warnings(GUILD, AUTHOR).await.unwrap();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].reason, "Be nice");
    }

    #[tokio::test]
    async fn test_warnings_only_grow() {
        let (service, actions) = setup();
        let member = MemberRef {
            user_id: AUTHOR,
            is_bot: false,
        };

        for reason in ["first", "second", "third"] {
            service
                .warn_member(&actions, GUILD, member, BOT, Some(reason))
                .await
                .unwrap();
        }

        let reasons: Vec<String> = service
            .get_warnings(GUILD, AUTHOR)
            .await
            .unwrap()
            .into_iter()
            .map(|w| w.reason)
            .collect();
        assert_eq!(reasons, vec!["first", "second", "third"]);
    }
}
