//! # Lottery Bot Main Entry Point
//!
//! Initializes logging, loads configuration, sets up the database, starts the
//! cleanup job and the health server, and runs the Telegram dispatcher.

use anyhow::Result;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lottery_bot::bot::commands::Command;
use lottery_bot::bot::gateway::TelegramGateway;
use lottery_bot::bot::handlers::BotHandler;
use lottery_bot::config::Config;
use lottery_bot::database::connection::DatabaseManager;
use lottery_bot::lottery::LotteryService;
use lottery_bot::services::cleanup::CleanupService;
use lottery_bot::services::health::HealthService;
use lottery_bot::utils::logging::log_system_event;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lottery_bot=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    info!("Starting Lottery Bot v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration loaded - Database: {}, HTTP Port: {}, Proxy: {}",
        config.database_url,
        config.http_port,
        if config.bot_proxy.is_some() { "enabled" } else { "disabled" }
    );

    // Initialize database
    info!("Initializing database connection...");
    let db_manager = DatabaseManager::new(&config.database_url).await?;
    info!("Running database migrations...");
    db_manager.run_migrations().await?;
    let db_arc = Arc::new(db_manager);
    info!("Database initialized successfully");

    // Initialize bot
    info!("Initializing Telegram bot...");
    let bot = build_bot(&config)?;
    if let Err(e) = bot.set_my_commands(Command::bot_commands()).await {
        tracing::warn!("Failed to register bot commands: {}", e);
    }

    let gateway = Arc::new(TelegramGateway::new(bot.clone()));
    let service = Arc::new(LotteryService::new(db_arc.clone(), gateway));
    let handler = BotHandler::new(service.clone());
    info!("Telegram bot initialized successfully");

    // Initialize and start cleanup service
    let mut cleanup_service = CleanupService::new(service.clone(), config.finished_retention_days)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create cleanup service: {}", e))?;
    if let Err(e) = cleanup_service.start().await {
        tracing::error!("Failed to start cleanup service: {}", e);
    }

    // Initialize health service
    let health_service = HealthService::new(db_arc.clone());
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.http_port))
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to port {}: {}", config.http_port, e))?;

    info!("Health check server starting on port {}", config.http_port);
    log_system_event("Lottery Bot started", None);

    let bot_task = tokio::spawn(async move {
        Dispatcher::builder(bot, handler.schema())
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;
    });

    let health_task = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, health_service.router).await {
            tracing::error!("Health server error: {}", e);
        }
    });

    // Wait for either task to complete (which would indicate shutdown)
    tokio::select! {
        result1 = bot_task => {
            if let Err(e) = result1 {
                tracing::error!("Bot task error: {}", e);
            }
        }
        result2 = health_task => {
            if let Err(e) = result2 {
                tracing::error!("Health task error: {}", e);
            }
        }
    }

    let cancelled = service.deletions().cancel_all();
    if cancelled > 0 {
        log_system_event(
            "Pending message deletions dropped",
            Some(&format!("{cancelled} cancelled")),
        );
    }

    if let Err(e) = cleanup_service.stop().await {
        tracing::warn!("Error stopping cleanup service: {}", e);
    }

    log_system_event("Lottery Bot stopped", None);
    Ok(())
}

fn build_bot(config: &Config) -> Result<Bot> {
    let Some(proxy) = &config.bot_proxy else {
        return Ok(Bot::new(&config.telegram_bot_token));
    };

    let client = teloxide::net::default_reqwest_settings()
        .proxy(reqwest::Proxy::all(proxy)?)
        .build()?;
    Ok(Bot::with_client(&config.telegram_bot_token, client))
}
