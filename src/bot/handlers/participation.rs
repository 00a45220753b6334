use teloxide::prelude::*;
use tracing::{debug, info, warn};

use crate::bot::{HandlerResult, SharedService};
use crate::lottery::gate::display_name;
use crate::lottery::{JoinOutcome, JoinRequest};
use crate::utils::logging::log_command_error;

/// Group text messages; only those matching a live gate do anything.
pub async fn handle_join(msg: Message, service: SharedService) -> HandlerResult {
    let (Some(text), Some(from)) = (msg.text(), msg.from()) else {
        return Ok(());
    };

    let user_id = from.id.0 as i64;
    let user_name = display_name(
        from.username.as_deref(),
        &from.first_name,
        from.last_name.as_deref(),
        user_id,
    );
    let request = JoinRequest {
        chat_id: msg.chat.id.0,
        message_id: msg.id,
        user_id,
        user_name: user_name.clone(),
        text: text.to_string(),
    };

    match service.join(request).await {
        Ok(JoinOutcome::NoGate) => {}
        Ok(JoinOutcome::NoRunningLottery) => {
            warn!("Join attempt by {} in chat {} without a running lottery", user_id, msg.chat.id.0);
        }
        Ok(JoinOutcome::AlreadyJoined) => {
            debug!("{}({}) tried to join twice in chat {}", user_name, user_id, msg.chat.id.0);
        }
        Ok(JoinOutcome::Joined { lottery, participants, auto_drawn }) => {
            info!(
                "{}({}) joined lottery {} ({} participants){}",
                user_name,
                user_id,
                lottery.id,
                participants,
                if auto_drawn { ", drawn" } else { "" }
            );
        }
        Err(e) => {
            log_command_error("join", &user_name, user_id, msg.chat.id.0, &e.to_string());
        }
    }
    Ok(())
}
