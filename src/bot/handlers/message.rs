use teloxide::prelude::*;
use tracing::debug;

use crate::bot::commands::{self, Command};
use crate::bot::{HandlerResult, SharedService};

pub async fn command_handler(
    bot: Bot,
    msg: Message,
    cmd: Command,
    service: SharedService,
) -> HandlerResult {
    debug!("Dispatching {} in chat {}", cmd.name(), msg.chat.id.0);

    match cmd {
        Command::Help | Command::Start => {
            commands::help::handle_help(bot, msg).await?;
        }
        Command::Create(title) => {
            commands::create::handle_create(bot, msg, title, service).await?;
        }
        Command::Set(args) => {
            commands::settings::handle_set(bot, msg, args, service).await?;
        }
        Command::Info => {
            commands::settings::handle_info(bot, msg, service).await?;
        }
        Command::Manage(args) => {
            commands::manage::handle_manage(bot, msg, args, service).await?;
        }
        Command::Prize => {
            commands::prize::handle_prize(bot, msg, service).await?;
        }
    }
    Ok(())
}

/// Removes the "pinned a message" notice produced by a silent pin.
pub async fn delete_pin_notice(bot: Bot, msg: Message) -> HandlerResult {
    if let Err(e) = bot.delete_message(msg.chat.id, msg.id).await {
        debug!("Could not delete pin notice in chat {}: {}", msg.chat.id.0, e);
    }
    Ok(())
}
