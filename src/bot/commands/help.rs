use teloxide::prelude::*;

use crate::bot::commands::is_private;
use crate::bot::HandlerResult;
use crate::lottery::format;
use crate::utils::feedback::CommandFeedback;

/// `/start` and `/help`; answered in private chats only.
pub async fn handle_help(bot: Bot, msg: Message) -> HandlerResult {
    if !is_private(&msg) {
        return Ok(());
    }

    CommandFeedback::new(bot, msg.chat.id)
        .send_formatted(format::help_message())
        .await?;
    Ok(())
}
