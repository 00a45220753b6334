//! Lottery domain: settings, draw logic, participation gates, message
//! rendering and the service tying them to storage and the chat gateway.

pub mod draw;
pub mod error;
pub mod format;
pub mod gate;
pub mod scheduler;
pub mod service;
pub mod settings;

pub use error::{LotteryError, LotteryResult};
pub use service::{CreateRequest, JoinOutcome, JoinRequest, LotteryService, PrizeClaim};
