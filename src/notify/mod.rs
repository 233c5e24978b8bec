use async_trait::async_trait;
use log::warn;
use teloxide::prelude::*;
use teloxide::types::{LinkPreviewOptions, MessageId, ParseMode};

use crate::entity::BotError;

/// The chat-transport sink the pipeline notifies through. Rendering happens
/// upstream; implementations only deliver.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Sends a plain text message and returns its message id.
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<i32, BotError>;

    /// Sends an HTML message with link previews disabled; returns its id.
    async fn send_html(&self, chat_id: i64, text: &str) -> Result<i32, BotError>;

    async fn delete_messages(&self, chat_id: i64, message_ids: &[i32]) -> Result<(), BotError>;

    async fn pin_message(&self, chat_id: i64, message_id: i32) -> Result<(), BotError>;
}

/// [`Notifier`] over the Telegram Bot API.
pub struct TelegramNotifier {
    bot: Bot,
}

impl TelegramNotifier {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    fn no_preview() -> LinkPreviewOptions {
        LinkPreviewOptions {
            is_disabled: true,
            url: None,
            prefer_small_media: false,
            prefer_large_media: false,
            show_above_text: false,
        }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<i32, BotError> {
        let message = self.bot.send_message(ChatId(chat_id), text).await?;
        Ok(message.id.0)
    }

    async fn send_html(&self, chat_id: i64, text: &str) -> Result<i32, BotError> {
        let message = self
            .bot
            .send_message(ChatId(chat_id), text)
            .parse_mode(ParseMode::Html)
            .link_preview_options(Self::no_preview())
            .await?;
        Ok(message.id.0)
    }

    async fn delete_messages(&self, chat_id: i64, message_ids: &[i32]) -> Result<(), BotError> {
        // Stale messages may already be gone; keep deleting the rest.
        for &id in message_ids {
            if let Err(e) = self
                .bot
                .delete_message(ChatId(chat_id), MessageId(id))
                .await
            {
                warn!("failed to delete message {} in chat {}: {}", id, chat_id, e);
            }
        }
        Ok(())
    }

    async fn pin_message(&self, chat_id: i64, message_id: i32) -> Result<(), BotError> {
        self.bot
            .pin_chat_message(ChatId(chat_id), MessageId(message_id))
            .await?;
        Ok(())
    }
}
