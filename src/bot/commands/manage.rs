use teloxide::prelude::*;

use crate::bot::commands::settings::report;
use crate::bot::commands::{is_private, sender};
use crate::bot::{HandlerResult, SharedService};
use crate::lottery::format::{self, CONFIG_DOC};
use crate::lottery::settings::ManageAction;
use crate::utils::feedback::CommandFeedback;
use crate::utils::logging::{log_command_start, log_command_success, log_validation_error};

/// `/manage <start|pause|cancel|draw>`
pub async fn handle_manage(bot: Bot, msg: Message, args: String, service: SharedService) -> HandlerResult {
    if !is_private(&msg) {
        return Ok(());
    }
    let chat_id = msg.chat.id.0;
    let (user, user_id) = sender(&msg);
    let feedback = CommandFeedback::replying_to(bot, &msg);

    log_command_start("/manage", &user, user_id, chat_id, Some(args.trim()));

    let action = match args.split_whitespace().next().unwrap_or_default().parse::<ManageAction>() {
        Ok(action) => action,
        Err(e) => {
            log_validation_error("/manage", &e.to_string(), &user, user_id, chat_id);
            if let Err(e) = service.current_lottery(user_id).await {
                report(&feedback, "/manage", &user, user_id, chat_id, e).await?;
                return Ok(());
            }
            feedback.validation_error("Invalid command", CONFIG_DOC).await?;
            return Ok(());
        }
    };

    match service.manage(user_id, action).await {
        Ok(Some(lottery)) => {
            log_command_success("/manage", &user, user_id, chat_id, Some(&action.to_string()));
            feedback.send_formatted(format::manage_reply(&lottery)).await?;
        }
        Ok(None) => {
            log_command_success("/manage", &user, user_id, chat_id, Some(&action.to_string()));
            feedback.success("Lottery cancelled").await?;
        }
        Err(e) => report(&feedback, "/manage", &user, user_id, chat_id, e).await?,
    }
    Ok(())
}
