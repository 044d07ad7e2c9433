// Core moderation module - contains auto-moderation business logic.
// Following the same pattern as the other core modules.

pub mod moderation_models;
pub mod moderation_service;
pub mod settings_service;
pub mod validators;

pub use moderation_models::*;
pub use moderation_service::*;
pub use settings_service::*;
pub use validators::*;
