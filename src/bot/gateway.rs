//! Boundary between the lottery core and the Telegram Bot API.

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{MessageId, ParseMode};
use teloxide::{ApiError, RequestError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    /// The edit would not change the message
    #[error("message is not modified")]
    NotModified,
    /// The target message no longer exists
    #[error("message not found")]
    NotFound,
    #[error("telegram request failed: {0}")]
    Api(String),
}

impl From<RequestError> for GatewayError {
    fn from(err: RequestError) -> Self {
        match err {
            RequestError::Api(ApiError::MessageNotModified) => GatewayError::NotModified,
            RequestError::Api(
                ApiError::MessageToEditNotFound
                | ApiError::MessageToDeleteNotFound
                | ApiError::MessageIdInvalid
                | ApiError::MessageToReplyNotFound,
            ) => GatewayError::NotFound,
            other => GatewayError::Api(other.to_string()),
        }
    }
}

/// Who the bot is, needed for self links.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotIdentity {
    pub user_id: UserId,
    pub username: String,
}

/// Operations the lottery core needs from the chat platform. All texts are
/// MarkdownV2.
#[async_trait]
pub trait MessagingGateway: Send + Sync + 'static {
    async fn send_message(
        &self,
        chat_id: ChatId,
        text: String,
        reply_to: Option<MessageId>,
    ) -> Result<MessageId, GatewayError>;

    async fn edit_message(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
        text: String,
    ) -> Result<(), GatewayError>;

    async fn delete_message(&self, chat_id: ChatId, message_id: MessageId) -> Result<(), GatewayError>;

    /// Pins silently; the resulting service message is removed by the
    /// dispatcher when it arrives.
    async fn pin_message(&self, chat_id: ChatId, message_id: MessageId) -> Result<(), GatewayError>;

    async fn unpin_message(&self, chat_id: ChatId, message_id: MessageId) -> Result<(), GatewayError>;

    /// Owner or administrator of the chat
    async fn is_chat_admin(&self, chat_id: ChatId, user_id: UserId) -> Result<bool, GatewayError>;

    async fn bot_identity(&self) -> Result<BotIdentity, GatewayError>;

    /// `None` when the bot may not export links for the chat.
    async fn invite_link(&self, chat_id: ChatId) -> Result<Option<String>, GatewayError>;
}

/// `MessagingGateway` backed by the Telegram Bot API.
#[derive(Clone)]
pub struct TelegramGateway {
    bot: Bot,
}

impl TelegramGateway {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl MessagingGateway for TelegramGateway {
    async fn send_message(
        &self,
        chat_id: ChatId,
        text: String,
        reply_to: Option<MessageId>,
    ) -> Result<MessageId, GatewayError> {
        let mut request = self
            .bot
            .send_message(chat_id, text)
            .parse_mode(ParseMode::MarkdownV2)
            .disable_web_page_preview(true);
        if let Some(reply_to) = reply_to {
            request = request.reply_to_message_id(reply_to);
        }
        Ok(request.await?.id)
    }

    async fn edit_message(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
        text: String,
    ) -> Result<(), GatewayError> {
        self.bot
            .edit_message_text(chat_id, message_id, text)
            .parse_mode(ParseMode::MarkdownV2)
            .disable_web_page_preview(true)
            .await?;
        Ok(())
    }

    async fn delete_message(&self, chat_id: ChatId, message_id: MessageId) -> Result<(), GatewayError> {
        self.bot.delete_message(chat_id, message_id).await?;
        Ok(())
    }

    async fn pin_message(&self, chat_id: ChatId, message_id: MessageId) -> Result<(), GatewayError> {
        self.bot
            .pin_chat_message(chat_id, message_id)
            .disable_notification(true)
            .await?;
        Ok(())
    }

    async fn unpin_message(&self, chat_id: ChatId, message_id: MessageId) -> Result<(), GatewayError> {
        self.bot.unpin_chat_message(chat_id).message_id(message_id).await?;
        Ok(())
    }

    async fn is_chat_admin(&self, chat_id: ChatId, user_id: UserId) -> Result<bool, GatewayError> {
        let member = self.bot.get_chat_member(chat_id, user_id).await?;
        Ok(member.is_privileged())
    }

    async fn bot_identity(&self) -> Result<BotIdentity, GatewayError> {
        let me = self.bot.get_me().await?;
        Ok(BotIdentity {
            user_id: me.user.id,
            username: me.username().to_string(),
        })
    }

    async fn invite_link(&self, chat_id: ChatId) -> Result<Option<String>, GatewayError> {
        match self.bot.export_chat_invite_link(chat_id).await {
            Ok(link) => Ok(Some(link)),
            // Missing the invite-link admin right
            Err(RequestError::Api(_)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
