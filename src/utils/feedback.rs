use teloxide::prelude::*;
use teloxide::types::{MessageId, ParseMode};
use crate::utils::markdown::escape_markdown;

/// Feedback types for different command outcomes
#[derive(Debug, Clone)]
pub enum FeedbackType {
    Success,
    Warning,
    Error,
    Info,
}

impl FeedbackType {
    fn emoji(&self) -> &'static str {
        match self {
            FeedbackType::Success => "✅",
            FeedbackType::Warning => "⚠️",
            FeedbackType::Error => "❌",
            FeedbackType::Info => "ℹ️",
        }
    }
}

/// Replies to the command that triggered a handler
pub struct CommandFeedback {
    bot: Bot,
    chat_id: ChatId,
    reply_to: Option<MessageId>,
}

impl CommandFeedback {
    pub fn new(bot: Bot, chat_id: ChatId) -> Self {
        Self { bot, chat_id, reply_to: None }
    }

    /// Feedback that quotes the given command message
    pub fn replying_to(bot: Bot, msg: &Message) -> Self {
        Self {
            bot,
            chat_id: msg.chat.id,
            reply_to: Some(msg.id),
        }
    }

    /// Send plain text, escaped and prefixed with the feedback emoji
    pub async fn send(&self, feedback_type: FeedbackType, message: &str) -> ResponseResult<Message> {
        let formatted_message = format!("{} {}", feedback_type.emoji(), escape_markdown(message));
        self.send_formatted(formatted_message).await
    }

    /// Send text that is already valid MarkdownV2
    pub async fn send_formatted(&self, text: String) -> ResponseResult<Message> {
        let mut request = self
            .bot
            .send_message(self.chat_id, text)
            .parse_mode(ParseMode::MarkdownV2)
            .disable_web_page_preview(true);
        if let Some(reply_to) = self.reply_to {
            request = request.reply_to_message_id(reply_to);
        }
        request.await
    }

    pub async fn success(&self, message: &str) -> ResponseResult<Message> {
        self.send(FeedbackType::Success, message).await
    }

    pub async fn error(&self, message: &str) -> ResponseResult<Message> {
        self.send(FeedbackType::Error, message).await
    }

    pub async fn warning(&self, message: &str) -> ResponseResult<Message> {
        self.send(FeedbackType::Warning, message).await
    }

    pub async fn info(&self, message: &str) -> ResponseResult<Message> {
        self.send(FeedbackType::Info, message).await
    }

    /// Send an error followed by the command reference
    pub async fn validation_error(&self, error: &str, reference: &str) -> ResponseResult<Message> {
        let text = format!(
            "{} {}\n{}",
            FeedbackType::Error.emoji(),
            escape_markdown(error),
            escape_markdown(reference)
        );
        self.send_formatted(text).await
    }
}
