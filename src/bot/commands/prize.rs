use teloxide::prelude::*;

use crate::bot::commands::settings::report;
use crate::bot::commands::{is_private, sender};
use crate::bot::{HandlerResult, SharedService};
use crate::lottery::{format, LotteryError};
use crate::utils::feedback::CommandFeedback;

/// `/prize`: the sender's most recent win
pub async fn handle_prize(bot: Bot, msg: Message, service: SharedService) -> HandlerResult {
    if !is_private(&msg) {
        return Ok(());
    }
    let chat_id = msg.chat.id.0;
    let (user, user_id) = sender(&msg);
    let feedback = CommandFeedback::replying_to(bot, &msg);

    match service.claim_prize(user_id).await {
        Ok(Some(claim)) => {
            feedback
                .send_formatted(format::prize_message(&claim.title, &claim.prize))
                .await?;
        }
        Ok(None) => {
            feedback.info("No prize information").await?;
        }
        Err(LotteryError::NotFound) => {
            feedback.info("No lottery information").await?;
        }
        Err(e) => report(&feedback, "/prize", &user, user_id, chat_id, e).await?,
    }
    Ok(())
}
