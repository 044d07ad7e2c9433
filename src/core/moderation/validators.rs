// Content validators and the filter registry.
//
// Each filter kind maps to one stateless validator. The registry is a fixed
// table built at startup; the dispatcher constructs a fresh validator from it
// for every check.

use super::moderation_models::{AutoModConfig, FilterKind};
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;
use thiserror::Error;

/// A message failed a content filter.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct ValidationError {
    pub message: String,
    pub filter: FilterKind,
}

impl ValidationError {
    pub fn new(message: impl Into<String>, filter: FilterKind) -> Self {
        Self {
            message: message.into(),
            filter,
        }
    }
}

/// A single content rule.
pub trait Validator: Send {
    fn validate(&self, content: &str, config: &AutoModConfig) -> Result<(), ValidationError>;
}

/// Builds a fresh validator for one check.
pub type ValidatorFactory = Arc<dyn Fn() -> Box<dyn Validator> + Send + Sync>;

/// Fixed mapping from filter kind to validator constructor.
#[derive(Clone, Default)]
pub struct FilterRegistry {
    entries: Vec<(FilterKind, ValidatorFactory)>,
}

impl FilterRegistry {
    /// The registry the bot runs with: one validator per filter kind.
    pub fn builtin() -> Self {
        Self::default()
            .with(FilterKind::Words, || Box::new(BadWordValidator))
            .with(FilterKind::Links, || Box::new(BadLinkValidator))
            .with(FilterKind::MassCaps, || Box::new(MassCapsValidator))
            .with(FilterKind::MassMention, || Box::new(MassMentionValidator))
    }

    /// Register (or replace) the constructor for a kind.
    pub fn with<F>(mut self, kind: FilterKind, factory: F) -> Self
    where
        F: Fn() -> Box<dyn Validator> + Send + Sync + 'static,
    {
        self.entries.retain(|(k, _)| *k != kind);
        self.entries.push((kind, Arc::new(factory)));
        self
    }

    /// `None` means no validator is installed for the kind.
    pub fn lookup(&self, kind: FilterKind) -> Option<ValidatorFactory> {
        self.entries
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, factory)| Arc::clone(factory))
    }
}

// ============================================================================
// BUILT-IN VALIDATORS
// ============================================================================

/// Rejects messages containing a word from the guild's ban list.
pub struct BadWordValidator;

impl Validator for BadWordValidator {
    fn validate(&self, content: &str, config: &AutoModConfig) -> Result<(), ValidationError> {
        let banned = content.split_whitespace().any(|word| {
            let word = word
                .trim_matches(|c: char| c.is_ascii_punctuation())
                .to_lowercase();
            config
                .ban_words
                .iter()
                .any(|banned| banned.to_lowercase() == word)
        });

        if banned {
            return Err(ValidationError::new(
                "Message contains banned words.",
                FilterKind::Words,
            ));
        }
        Ok(())
    }
}

/// Rejects messages containing a banned link fragment.
pub struct BadLinkValidator;

impl Validator for BadLinkValidator {
    fn validate(&self, content: &str, config: &AutoModConfig) -> Result<(), ValidationError> {
        let lowered = content.to_lowercase();
        let banned = config
            .ban_links
            .iter()
            .filter(|link| !link.is_empty())
            .any(|link| lowered.contains(&link.to_lowercase()));

        if banned {
            return Err(ValidationError::new(
                "Message contains banned links.",
                FilterKind::Links,
            ));
        }
        Ok(())
    }
}

const MASS_CAPS_MIN_LENGTH: usize = 5;
const MASS_CAPS_RATIO: f64 = 0.7;

/// Rejects messages that are mostly capital letters.
pub struct MassCapsValidator;

impl Validator for MassCapsValidator {
    fn validate(&self, content: &str, _config: &AutoModConfig) -> Result<(), ValidationError> {
        let length = content.chars().count();
        if length <= MASS_CAPS_MIN_LENGTH {
            return Ok(());
        }

        let uppercase = content.chars().filter(|c| c.is_uppercase()).count();
        if uppercase as f64 / length as f64 >= MASS_CAPS_RATIO {
            return Err(ValidationError::new(
                "Message contains too many capital letters.",
                FilterKind::MassCaps,
            ));
        }
        Ok(())
    }
}

static MENTION_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<@!?\d+>").expect("mention pattern is valid"));

/// Rejects messages mentioning too many users.
pub struct MassMentionValidator;

impl Validator for MassMentionValidator {
    fn validate(&self, content: &str, config: &AutoModConfig) -> Result<(), ValidationError> {
        let mentions = MENTION_PATTERN.find_iter(content).count();
        if mentions >= config.filter_threshold as usize {
            return Err(ValidationError::new(
                "Message contains too many mentions.",
                FilterKind::MassMention,
            ));
        }
        Ok(())
    }
}
