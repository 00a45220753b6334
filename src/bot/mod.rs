pub mod commands;
pub mod gateway;
pub mod handlers;

use std::sync::Arc;

use crate::database::connection::DatabaseManager;
use crate::lottery::LotteryService;
use gateway::TelegramGateway;

pub type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// Service instance shared by every handler
pub type SharedService = Arc<LotteryService<DatabaseManager, TelegramGateway>>;
