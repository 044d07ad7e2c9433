// Discord side of auto-moderation: message handling, platform actions
// and the slash commands that configure it.

pub mod actions;
pub mod automod_handler;
pub mod commands;
pub mod warn_commands;
