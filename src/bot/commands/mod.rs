pub mod create;
pub mod help;
pub mod manage;
pub mod prize;
pub mod settings;

use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;

#[derive(BotCommands, Clone, Debug, PartialEq)]
#[command(rename_rule = "lowercase", description = "Lottery Assistant commands:")]
pub enum Command {
    #[command(description = "Display this help message")]
    Help,
    #[command(description = "Start the bot")]
    Start,
    #[command(description = "Create a lottery in this group")]
    Create(String),
    #[command(description = "Change a setting of the paused lottery")]
    Set(String),
    #[command(description = "Show the current lottery")]
    Info,
    #[command(description = "Start, pause, cancel or draw the lottery")]
    Manage(String),
    #[command(description = "Show your latest prize")]
    Prize,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Help => "/help",
            Command::Start => "/start",
            Command::Create(_) => "/create",
            Command::Set(_) => "/set",
            Command::Info => "/info",
            Command::Manage(_) => "/manage",
            Command::Prize => "/prize",
        }
    }
}

/// Sender of a command as (display name, id)
pub(crate) fn sender(msg: &Message) -> (String, i64) {
    msg.from()
        .map(|u| {
            let name = u.username.clone().unwrap_or_else(|| u.first_name.clone());
            (name, u.id.0 as i64)
        })
        .unwrap_or_else(|| ("unknown".to_string(), 0))
}

pub(crate) fn is_private(msg: &Message) -> bool {
    msg.chat.is_private()
}
