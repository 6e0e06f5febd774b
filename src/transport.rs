use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{ChatAction, MessageId, ParseMode};

use crate::error::ChatBridgeError;

/// One inbound platform message, reduced to the fields dispatch needs.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub chat_id: i64,
    pub user_id: i64,
    pub user_name: String,
    pub text: String,
}

/// Outbound side of the messaging platform.
#[async_trait]
pub trait MessageTransport: Send + Sync {
    /// Sends `text` to a chat and returns the platform message id. With
    /// `formatted` set the text is sent with Markdown parsing; plain
    /// otherwise.
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        formatted: bool,
    ) -> Result<i32, ChatBridgeError>;

    async fn delete_message(&self, chat_id: i64, message_id: i32) -> Result<(), ChatBridgeError>;

    /// Transient typing indicator; the platform clears it on its own.
    async fn send_typing(&self, chat_id: i64) -> Result<(), ChatBridgeError>;
}

pub struct TelegramTransport {
    bot: Bot,
}

impl TelegramTransport {
    pub fn new(bot: Bot) -> Self {
        TelegramTransport { bot }
    }
}

#[async_trait]
impl MessageTransport for TelegramTransport {
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        formatted: bool,
    ) -> Result<i32, ChatBridgeError> {
        let mut request = self.bot.send_message(ChatId(chat_id), text);
        if formatted {
            request = request.parse_mode(ParseMode::Markdown);
        }
        let sent = request
            .await
            .map_err(|e| ChatBridgeError::Delivery(format!("failed to send message: {e}")))?;
        Ok(sent.id.0)
    }

    async fn delete_message(&self, chat_id: i64, message_id: i32) -> Result<(), ChatBridgeError> {
        self.bot
            .delete_message(ChatId(chat_id), MessageId(message_id))
            .await
            .map_err(|e| ChatBridgeError::Delivery(format!("failed to delete message: {e}")))?;
        Ok(())
    }

    async fn send_typing(&self, chat_id: i64) -> Result<(), ChatBridgeError> {
        self.bot
            .send_chat_action(ChatId(chat_id), ChatAction::Typing)
            .await
            .map_err(|e| ChatBridgeError::Delivery(format!("failed to send chat action: {e}")))?;
        Ok(())
    }
}
