use anyhow::{anyhow, Result};
use std::env;

pub const DEFAULT_DATABASE_URL: &str = "sqlite:./data/lotteries.db";
pub const DEFAULT_RETENTION_DAYS: i64 = 7;

#[derive(Debug, Clone)]
pub struct Config {
    pub telegram_bot_token: String,
    pub database_url: String,
    pub http_port: u16,
    /// Proxy for Bot API traffic
    pub bot_proxy: Option<String>,
    /// Days a finished lottery is kept before the cleanup job removes it
    pub finished_retention_days: i64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let token = env::var("TELEGRAM_BOT_TOKEN")
            .map_err(|_| anyhow!("TELEGRAM_BOT_TOKEN must be set"))?;

        if token.trim().is_empty() {
            return Err(anyhow!("TELEGRAM_BOT_TOKEN must be set"));
        }

        let port_str = env::var("HTTP_PORT").unwrap_or_else(|_| "3000".to_string());
        let http_port = port_str
            .trim()
            .parse()
            .map_err(|_| anyhow!("Invalid HTTP_PORT"))?;

        let bot_proxy = env::var("BOT_PROXY")
            .ok()
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty());

        let finished_retention_days = match env::var("FINISHED_RETENTION_DAYS") {
            Ok(days) if !days.trim().is_empty() => {
                let days: i64 = days
                    .trim()
                    .parse()
                    .map_err(|_| anyhow!("Invalid FINISHED_RETENTION_DAYS"))?;
                if days < 1 {
                    return Err(anyhow!("FINISHED_RETENTION_DAYS must be at least 1"));
                }
                days
            }
            _ => DEFAULT_RETENTION_DAYS,
        };

        Ok(Config {
            telegram_bot_token: token,
            database_url: database_url_from_env(),
            http_port,
            bot_proxy,
            finished_retention_days,
        })
    }
}

/// `DATABASE_URL`, or the default SQLite file when unset or blank.
pub fn database_url_from_env() -> String {
    match env::var("DATABASE_URL") {
        Ok(url) if !url.trim().is_empty() => url,
        _ => DEFAULT_DATABASE_URL.to_string(),
    }
}
