//! Rendering of lottery state into MarkdownV2 chat messages.
//!
//! Everything here is pure: the same inputs always produce the same text.

use crate::database::models::{Lottery, Participant};
use crate::lottery::gate::JOIN_MARKER;
use crate::utils::markdown::{bold, code, escape_code, escape_markdown};

const DECORATION: &str = "❤️‍🔥❤️‍🔥❤️‍🔥❤️‍🔥";
const FOOTER: &str = "❤️‍🔥❤️‍🔥❤️‍🔥❤️‍🔥❤️‍🔥❤️‍🔥❤️‍🔥❤️‍🔥❤️‍🔥❤️‍🔥";

/// Keycap glyph for each decimal digit
pub const NUMBER_GLYPHS: [&str; 10] = ["0️⃣", "1️⃣", "2️⃣", "3️⃣", "4️⃣", "5️⃣", "6️⃣", "7️⃣", "8️⃣", "9️⃣"];

pub const MANAGE_DOC: &str = "/manage start - start the lottery
/manage pause - pause the lottery
/manage cancel - cancel the lottery
/manage draw - draw the winners now";

pub const CONFIG_DOC: &str = "/create - create a lottery (send it in the group)
/info - show the current lottery
/manage start - start the lottery
/manage pause - pause the lottery
/manage cancel - cancel the lottery
/manage draw - draw the winners now
/set title <name> - set the lottery title
/set drawn_people 20 - draw automatically at 20 entrants, 0 for a manual draw
/set winner_people 10 - number of winners, a count or a percentage like 10%
/set password <words> - set the join password
/set same_prize true - give every winner the same prize
/set prize <prizes> - set the prize, one prize per word or line when prizes differ
/prize - claim your prize
/help - show this help";

/// Renders a number with one keycap glyph per digit.
pub fn glyph_number(n: usize) -> String {
    n.to_string()
        .bytes()
        .map(|digit| NUMBER_GLYPHS[usize::from(digit - b'0')])
        .collect()
}

fn header(title: &str) -> String {
    format!("{DECORATION}{}{DECORATION}", bold(title))
}

/// Title, password, draw threshold, winner spec and status; optionally the
/// prize configuration as well.
pub fn lottery_summary(lottery: &Lottery, show_prize: bool) -> String {
    let threshold = if lottery.drawn_people <= 0 {
        "Manual draw".to_string()
    } else {
        glyph_number(lottery.drawn_people as usize)
    };

    let mut text = format!(
        "Title: {}\nPassword: {}\nDraw at: `{}`\nWinners: {}\nStatus: `{}`",
        code(&lottery.title),
        code(&format!("{JOIN_MARKER}{}", lottery.password)),
        threshold,
        code(&lottery.winner_people),
        lottery.status.label(),
    );

    if show_prize {
        let prize_type = if lottery.same_prize {
            "Same for everyone"
        } else {
            "Different for each winner"
        };
        let prizes = lottery.prize_list().join("\n");
        let prizes = if prizes.trim().is_empty() {
            "(not set)".to_string()
        } else {
            prizes
        };
        text.push_str(&format!(
            "\nPrize type: `{prize_type}`\nPrizes:\n```\n{}\n```",
            escape_code(&prizes)
        ));
    }

    text
}

/// Group status message listing everyone who joined so far.
pub fn status_announcement(lottery: &Lottery, participants: &[Participant]) -> String {
    let names = if participants.is_empty() {
        "Nobody yet".to_string()
    } else {
        participants
            .iter()
            .map(|p| p.user_name.as_str())
            .collect::<Vec<_>>()
            .join("  ")
    };

    format!(
        "{}\n{}\nParticipants: `{}`\nEntrants: {}\n{FOOTER}",
        header("Lottery time"),
        lottery_summary(lottery, false),
        glyph_number(participants.len()),
        code(&names),
    )
}

fn mention(participant: &Participant) -> String {
    format!(
        "*[{}](tg://user?id={})*",
        escape_markdown(&participant.user_name),
        participant.user_id
    )
}

/// Group announcement of the draw result, with mentions of every winner and
/// how to claim the prize.
pub fn winner_announcement(
    lottery: &Lottery,
    participants: &[Participant],
    winners: &[Participant],
    bot_username: &str,
) -> String {
    let winner_list = if winners.is_empty() {
        escape_markdown("No winners this time")
    } else {
        winners.iter().map(mention).collect::<Vec<_>>().join("    ")
    };

    format!(
        "{}\n{}\nParticipants: `{}`\nWinners drawn: `{}`\nWinner list:\n{}\n{}[private chat](https://t.me/{}){}\n{FOOTER}",
        header("Winners drawn"),
        lottery_summary(lottery, false),
        glyph_number(participants.len()),
        glyph_number(winners.len()),
        winner_list,
        escape_markdown("Winners, send /prize to me in a "),
        bot_username,
        escape_markdown(" to claim your prize."),
    )
}

pub fn cancelled_announcement(lottery: &Lottery) -> String {
    format!(
        "{}\n{}\n{FOOTER}",
        header("Lottery cancelled"),
        lottery_summary(lottery, false),
    )
}

pub fn prize_message(title: &str, prize: &str) -> String {
    format!(
        "{}\nLottery: {}\nYour prize:\n```\n{}\n```\n{FOOTER}",
        header("You won"),
        code(title),
        escape_code(prize),
    )
}

pub fn help_message() -> String {
    format!(
        "Welcome to the *Lottery Assistant*\n{} {}\n{} {}\n{}",
        glyph_number(1),
        escape_markdown("Add this bot to your group and make it an admin."),
        glyph_number(2),
        escape_markdown("You can use the following commands:"),
        escape_markdown(CONFIG_DOC),
    )
}

/// Private message sent to the creator right after `/create`.
pub fn setup_message(lottery: &Lottery, chat_title: &str, invite_link: Option<&str>) -> String {
    let chat = match invite_link {
        Some(link) => format!(
            "[{}]({}?chat_id={})",
            escape_markdown(chat_title),
            link.replace('\\', "\\\\").replace(')', "\\)"),
            lottery.chat_id
        ),
        None => escape_markdown(chat_title),
    };

    format!(
        "*Setting up the lottery for {chat}*\n{}\n{}",
        command_reference(),
        current_lottery(lottery),
    )
}

pub fn settings_updated(lottery: &Lottery) -> String {
    format!(
        "{}\n{}\n{}",
        bold("Settings saved"),
        command_reference(),
        current_lottery(lottery),
    )
}

pub fn lottery_info(lottery: &Lottery) -> String {
    format!("{}\n{}", bold("Current lottery"), lottery_summary(lottery, true))
}

pub fn manage_reply(lottery: &Lottery) -> String {
    format!(
        "{}\n{}\n{}\n{}",
        bold("Available commands"),
        escape_markdown(MANAGE_DOC),
        bold("Current lottery"),
        lottery_summary(lottery, true),
    )
}

/// Group notice pointing the creator to the private chat.
pub fn created_notice(bot_username: &str) -> String {
    format!(
        "{}[private chat](https://t.me/{}){}",
        escape_markdown("Lottery created, check the "),
        bot_username,
        escape_markdown(" to configure it."),
    )
}

fn command_reference() -> String {
    format!(
        "{} {}\n{}",
        glyph_number(1),
        escape_markdown("You can use the following commands:"),
        escape_markdown(CONFIG_DOC),
    )
}

fn current_lottery(lottery: &Lottery) -> String {
    format!(
        "{} {}\n{}",
        glyph_number(2),
        escape_markdown("Current lottery:"),
        lottery_summary(lottery, true),
    )
}
