use anyhow::{anyhow, Result};

pub fn validate_lottery_title(title: &str) -> Result<()> {
    let title = title.trim();

    if title.is_empty() {
        return Err(anyhow!("Lottery title cannot be empty"));
    }

    if title.chars().count() > 100 {
        return Err(anyhow!("Lottery title cannot be longer than 100 characters"));
    }

    if title.contains('\n') || title.contains('\r') {
        return Err(anyhow!("Lottery title cannot contain line breaks"));
    }

    Ok(())
}

pub fn validate_password(password: &str) -> Result<()> {
    if password.trim().is_empty() {
        return Err(anyhow!("Password cannot be empty"));
    }

    if password.chars().count() > 128 {
        return Err(anyhow!("Password cannot be longer than 128 characters"));
    }

    // Join messages are matched on a single line
    if password.contains('\n') || password.contains('\r') {
        return Err(anyhow!("Password cannot contain line breaks"));
    }

    Ok(())
}

pub fn validate_telegram_chat_id(chat_id: i64) -> Result<()> {
    // Telegram chat IDs should be non-zero
    if chat_id == 0 {
        return Err(anyhow!("Chat ID cannot be zero"));
    }

    // Positive IDs should be within reasonable range for user chats (up to 2^31-1)
    if chat_id > 2147483647 {
        return Err(anyhow!("Invalid user chat ID range"));
    }

    // Negative IDs can be:
    // - Group chats: small negative numbers like -12345 (up to around -2^31)
    // - Supergroups: very large negative numbers starting around -1000000000000
    // Reject extremely large negative numbers beyond Telegram's known ranges
    if chat_id < -2000000000000 {
        return Err(anyhow!("Chat ID out of valid range"));
    }

    Ok(())
}
