use teloxide::prelude::*;

use crate::bot::commands::{is_private, sender};
use crate::bot::{HandlerResult, SharedService};
use crate::lottery::format::{self, CONFIG_DOC};
use crate::lottery::settings::LotterySetting;
use crate::lottery::LotteryError;
use crate::utils::feedback::CommandFeedback;
use crate::utils::logging::{
    log_command_error, log_command_start, log_command_success, log_validation_error,
};

/// `/set <property> <value...>` from the operator's private chat
pub async fn handle_set(bot: Bot, msg: Message, args: String, service: SharedService) -> HandlerResult {
    if !is_private(&msg) {
        return Ok(());
    }
    let chat_id = msg.chat.id.0;
    let (user, user_id) = sender(&msg);
    let feedback = CommandFeedback::replying_to(bot, &msg);

    log_command_start("/set", &user, user_id, chat_id, Some(args.trim()));

    let setting = match LotterySetting::parse(&args) {
        Ok(setting) => setting,
        Err(e) => {
            log_validation_error("/set", &e.to_string(), &user, user_id, chat_id);
            // A missing lottery takes precedence over a malformed setting
            if let Err(e) = service.current_lottery(user_id).await {
                report(&feedback, "/set", &user, user_id, chat_id, e).await?;
                return Ok(());
            }
            feedback
                .validation_error(&format!("Parameter error: {e}"), CONFIG_DOC)
                .await?;
            return Ok(());
        }
    };

    match service.apply_setting(user_id, &setting).await {
        Ok(lottery) => {
            log_command_success("/set", &user, user_id, chat_id, Some(setting.property()));
            feedback.send_formatted(format::settings_updated(&lottery)).await?;
        }
        Err(e) => report(&feedback, "/set", &user, user_id, chat_id, e).await?,
    }
    Ok(())
}

/// `/info`: summary of the operator's current lottery
pub async fn handle_info(bot: Bot, msg: Message, service: SharedService) -> HandlerResult {
    if !is_private(&msg) {
        return Ok(());
    }
    let chat_id = msg.chat.id.0;
    let (user, user_id) = sender(&msg);
    let feedback = CommandFeedback::replying_to(bot, &msg);

    match service.current_lottery(user_id).await {
        Ok(lottery) => {
            feedback.send_formatted(format::lottery_info(&lottery)).await?;
        }
        Err(e) => report(&feedback, "/info", &user, user_id, chat_id, e).await?,
    }
    Ok(())
}

/// Replies with the user-facing text of a failed operation.
pub(crate) async fn report(
    feedback: &CommandFeedback,
    command: &str,
    user: &str,
    user_id: i64,
    chat_id: i64,
    error: LotteryError,
) -> HandlerResult {
    if error.is_user_error() {
        log_validation_error(command, &error.to_string(), user, user_id, chat_id);
        if matches!(error, LotteryError::InvalidSetting(_)) {
            feedback.validation_error(&error.user_message(), CONFIG_DOC).await?;
        } else {
            feedback.warning(&error.user_message()).await?;
        }
    } else {
        log_command_error(command, user, user_id, chat_id, &error.to_string());
        feedback.error(&error.user_message()).await?;
    }
    Ok(())
}
