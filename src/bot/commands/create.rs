use teloxide::prelude::*;

use crate::bot::commands::sender;
use crate::bot::{HandlerResult, SharedService};
use crate::lottery::{CreateRequest, LotteryError};
use crate::utils::feedback::CommandFeedback;
use crate::utils::logging::{
    log_command_error, log_command_start, log_command_success, log_validation_error,
};
use crate::utils::validation::validate_telegram_chat_id;

pub async fn handle_create(
    bot: Bot,
    msg: Message,
    title: String,
    service: SharedService,
) -> HandlerResult {
    let chat_id = msg.chat.id.0;
    let (user, user_id) = sender(&msg);
    let feedback = CommandFeedback::replying_to(bot, &msg);

    if !(msg.chat.is_group() || msg.chat.is_supergroup()) {
        feedback.warning("Please send this command in the group").await?;
        return Ok(());
    }

    if let Err(e) = validate_telegram_chat_id(chat_id) {
        log_validation_error("/create", &e.to_string(), &user, user_id, chat_id);
        feedback.error(&format!("Invalid chat: {e}")).await?;
        return Ok(());
    }

    log_command_start("/create", &user, user_id, chat_id, Some(title.trim()));

    let request = CreateRequest {
        chat_id,
        chat_title: msg.chat.title().unwrap_or_default().to_string(),
        command_message_id: msg.id,
        creator_id: user_id,
        creator_username: msg.from().and_then(|u| u.username.clone()),
        title: Some(title),
    };

    match service.create(request).await {
        Ok(lottery) => {
            log_command_success(
                "/create",
                &user,
                user_id,
                chat_id,
                Some(&format!("lottery {}", lottery.id)),
            );
        }
        // The group has already been pointed at the unfinished lottery
        Err(e @ LotteryError::AlreadyActive { .. }) => {
            log_validation_error("/create", &e.to_string(), &user, user_id, chat_id);
        }
        // Non-admins are ignored
        Err(LotteryError::NotGroupAdmin) => {
            log_validation_error("/create", "sender is not an admin", &user, user_id, chat_id);
        }
        Err(e) if e.is_user_error() => {
            log_validation_error("/create", &e.to_string(), &user, user_id, chat_id);
            feedback.warning(&e.user_message()).await?;
        }
        Err(e) => {
            log_command_error("/create", &user, user_id, chat_id, &e.to_string());
            feedback.error(&e.user_message()).await?;
        }
    }

    Ok(())
}
