use teloxide::types::MessageId;
use thiserror::Error;

use crate::bot::gateway::GatewayError;
use crate::database::repository::StoreError;
use crate::lottery::settings::SettingError;

#[derive(Debug, Error)]
pub enum LotteryError {
    #[error("no lottery found")]
    NotFound,
    #[error("lottery is not paused")]
    NotPaused,
    #[error("chat already has an unfinished lottery (status message {})", .message_id.0)]
    AlreadyActive { message_id: MessageId },
    #[error("user is not a group admin")]
    NotGroupAdmin,
    #[error("bot is not a group admin")]
    BotNotAdmin,
    #[error("user has no username")]
    MissingUsername,
    #[error(transparent)]
    InvalidSetting(#[from] SettingError),
    #[error("inconsistent lottery data: {0}")]
    Integrity(String),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

pub type LotteryResult<T> = Result<T, LotteryError>;

impl LotteryError {
    /// Text shown to the user who triggered the failing operation.
    pub fn user_message(&self) -> String {
        match self {
            LotteryError::NotFound => "Please create a lottery first".to_string(),
            LotteryError::NotPaused => "Please pause the lottery first".to_string(),
            LotteryError::AlreadyActive { .. } => "There is an unfinished lottery".to_string(),
            LotteryError::NotGroupAdmin => "Only group admins can create a lottery".to_string(),
            LotteryError::BotNotAdmin => "Please make me an admin first".to_string(),
            LotteryError::MissingUsername => "Please set a username first".to_string(),
            LotteryError::InvalidSetting(e) => format!("Parameter error: {e}"),
            LotteryError::Integrity(_) | LotteryError::Store(_) | LotteryError::Gateway(_) => {
                "Service error, please contact the admin".to_string()
            }
        }
    }

    /// Failures caused by the user's input rather than the service.
    pub fn is_user_error(&self) -> bool {
        !matches!(
            self,
            LotteryError::Integrity(_) | LotteryError::Store(_) | LotteryError::Gateway(_)
        )
    }
}
