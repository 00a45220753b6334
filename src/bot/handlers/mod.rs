pub mod message;
pub mod participation;

use teloxide::{dispatching::UpdateHandler, prelude::*, types::Me};

use crate::bot::commands::Command;
use crate::bot::SharedService;

pub struct BotHandler {
    pub service: SharedService,
}

impl BotHandler {
    pub fn new(service: SharedService) -> Self {
        Self { service }
    }

    pub fn schema(&self) -> UpdateHandler<Box<dyn std::error::Error + Send + Sync + 'static>> {
        let commands = self.service.clone();
        let joins = self.service.clone();

        Update::filter_message()
            .branch(
                dptree::entry()
                    .filter_command::<Command>()
                    .endpoint(move |bot, msg, cmd| {
                        let service = commands.clone();
                        async move { message::command_handler(bot, msg, cmd, service).await }
                    }),
            )
            .branch(
                dptree::filter(|msg: Message, me: Me| is_own_pin_notice(&msg, &me))
                    .endpoint(message::delete_pin_notice),
            )
            .branch(
                dptree::filter(|msg: Message| {
                    (msg.chat.is_group() || msg.chat.is_supergroup()) && msg.text().is_some()
                })
                .endpoint(move |msg| {
                    let service = joins.clone();
                    async move { participation::handle_join(msg, service).await }
                }),
            )
    }
}

/// Service message announcing a pin made by the bot itself
fn is_own_pin_notice(msg: &Message, me: &Me) -> bool {
    msg.pinned_message().is_some() && msg.from().map(|u| u.id) == Some(me.id)
}
