// Serenity implementation of the core `ModerationActions` port.

use crate::core::moderation::{AutoModError, IncomingMessage, ModerationActions};
use async_trait::async_trait;
use poise::serenity_prelude as serenity;
use std::sync::Arc;

pub struct SerenityModerationActions {
    http: Arc<serenity::Http>,
}

impl SerenityModerationActions {
    pub fn new(http: Arc<serenity::Http>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl ModerationActions for SerenityModerationActions {
    async fn delete_message(
        &self,
        message: &IncomingMessage,
        reason: &str,
    ) -> Result<(), AutoModError> {
        self.http
            .delete_message(
                serenity::ChannelId::new(message.channel_id),
                serenity::MessageId::new(message.message_id),
                Some(reason),
            )
            .await
            .map_err(|e| AutoModError::Platform(e.to_string()))
    }

    async fn send_direct_message(&self, user_id: u64, content: &str) -> Result<(), AutoModError> {
        serenity::UserId::new(user_id)
            .direct_message(&*self.http, serenity::CreateMessage::new().content(content))
            .await
            .map(|_| ())
            .map_err(|e| AutoModError::Platform(e.to_string()))
    }
}
