//! # Lottery Bot
//!
//! A Telegram bot that runs group lotteries.
//!
//! ## Features
//! - Group admins create a lottery and configure it in a private chat
//! - Members join by posting the `$$password` marker in the group
//! - Manual draws, or automatic ones once enough members joined
//! - Winners collect their prize privately with `/prize`
//! - Persistent storage with SQLite

/// Bot commands, dispatcher schema and the Telegram gateway
pub mod bot;
/// Configuration management and environment variables
pub mod config;
/// Database models, connections, and migrations
pub mod database;
/// Lottery state machine, participation gates and message rendering
pub mod lottery;
/// Background services: cleanup job and health endpoints
pub mod services;
/// Utility functions for validation, formatting and logging
pub mod utils;
