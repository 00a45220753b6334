//! Typed persistence interface used by the lottery core.
//!
//! The service only talks to storage through these traits; `DatabaseManager`
//! implements both on top of the SQLite models.

use async_trait::async_trait;
use thiserror::Error;

use crate::database::connection::DatabaseManager;
use crate::database::models::{Lottery, LotteryStatus, NewLottery, Participant};
use crate::lottery::settings::LotterySetting;
use crate::utils::logging::log_database_error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write
    #[error("record already exists")]
    Conflict,
    #[error("database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if is_unique_violation(&err) {
            StoreError::Conflict
        } else {
            StoreError::Database(err)
        }
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => {
            // 2067 = SQLITE_CONSTRAINT_UNIQUE, 1555 = SQLITE_CONSTRAINT_PRIMARYKEY
            matches!(db_err.code().as_deref(), Some("2067") | Some("1555"))
                || db_err.message().contains("UNIQUE constraint failed")
        }
        _ => false,
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait LotteryRepository: Send + Sync {
    /// Fails with `StoreError::Conflict` if the chat already has an
    /// unfinished lottery.
    async fn create_lottery(&self, new: NewLottery) -> StoreResult<Lottery>;
    async fn find_lottery(&self, id: i64) -> StoreResult<Option<Lottery>>;
    async fn find_active_by_chat(&self, chat_id: i64) -> StoreResult<Option<Lottery>>;
    async fn find_running_by_chat(&self, chat_id: i64) -> StoreResult<Option<Lottery>>;
    async fn find_active_by_creator(&self, creator_id: i64) -> StoreResult<Option<Lottery>>;
    async fn update_status(&self, id: i64, status: LotteryStatus) -> StoreResult<()>;
    async fn update_message_id(&self, id: i64, message_id: i64) -> StoreResult<()>;
    /// Atomically finishes the lottery and stores `(participant_id, prize)`
    /// for each winner.
    async fn finish_with_prizes(&self, id: i64, prizes: &[(i64, String)]) -> StoreResult<()>;
    async fn apply_setting(&self, id: i64, setting: &LotterySetting) -> StoreResult<()>;
    async fn delete_lottery(&self, id: i64) -> StoreResult<()>;
    async fn purge_finished_before(&self, cutoff: &str) -> StoreResult<u64>;
    async fn count_active_lotteries(&self) -> StoreResult<i64>;
}

#[async_trait]
pub trait ParticipantRepository: Send + Sync {
    /// Fails with `StoreError::Conflict` on a duplicate join.
    async fn add_participant(
        &self,
        lottery_id: i64,
        user_id: i64,
        user_name: &str,
    ) -> StoreResult<Participant>;
    async fn list_participants(&self, lottery_id: i64) -> StoreResult<Vec<Participant>>;
    async fn find_latest_win(&self, user_id: i64) -> StoreResult<Option<Participant>>;
}

fn logged<T>(operation: &str, table: &str, result: Result<T, sqlx::Error>) -> StoreResult<T> {
    result.map_err(|e| {
        let err = StoreError::from(e);
        if let StoreError::Database(inner) = &err {
            log_database_error(operation, table, &inner.to_string(), None);
        }
        err
    })
}

#[async_trait]
impl LotteryRepository for DatabaseManager {
    async fn create_lottery(&self, new: NewLottery) -> StoreResult<Lottery> {
        logged("INSERT", "lotteries", Lottery::create(&self.pool, new).await)
    }

    async fn find_lottery(&self, id: i64) -> StoreResult<Option<Lottery>> {
        logged("SELECT", "lotteries", Lottery::find_by_id(&self.pool, id).await)
    }

    async fn find_active_by_chat(&self, chat_id: i64) -> StoreResult<Option<Lottery>> {
        logged("SELECT", "lotteries", Lottery::find_active_by_chat(&self.pool, chat_id).await)
    }

    async fn find_running_by_chat(&self, chat_id: i64) -> StoreResult<Option<Lottery>> {
        logged("SELECT", "lotteries", Lottery::find_running_by_chat(&self.pool, chat_id).await)
    }

    async fn find_active_by_creator(&self, creator_id: i64) -> StoreResult<Option<Lottery>> {
        logged("SELECT", "lotteries", Lottery::find_active_by_creator(&self.pool, creator_id).await)
    }

    async fn update_status(&self, id: i64, status: LotteryStatus) -> StoreResult<()> {
        logged("UPDATE", "lotteries", Lottery::update_status(&self.pool, id, status).await)
    }

    async fn update_message_id(&self, id: i64, message_id: i64) -> StoreResult<()> {
        logged("UPDATE", "lotteries", Lottery::update_message_id(&self.pool, id, message_id).await)
    }

    async fn finish_with_prizes(&self, id: i64, prizes: &[(i64, String)]) -> StoreResult<()> {
        logged("UPDATE", "lotteries", Lottery::finish_with_prizes(&self.pool, id, prizes).await)
    }

    async fn apply_setting(&self, id: i64, setting: &LotterySetting) -> StoreResult<()> {
        logged("UPDATE", "lotteries", Lottery::apply_setting(&self.pool, id, setting).await)
    }

    async fn delete_lottery(&self, id: i64) -> StoreResult<()> {
        logged("DELETE", "lotteries", Lottery::delete(&self.pool, id).await)
    }

    async fn purge_finished_before(&self, cutoff: &str) -> StoreResult<u64> {
        logged("DELETE", "lotteries", Lottery::purge_finished_before(&self.pool, cutoff).await)
    }

    async fn count_active_lotteries(&self) -> StoreResult<i64> {
        logged("SELECT", "lotteries", Lottery::count_active(&self.pool).await)
    }
}

#[async_trait]
impl ParticipantRepository for DatabaseManager {
    async fn add_participant(
        &self,
        lottery_id: i64,
        user_id: i64,
        user_name: &str,
    ) -> StoreResult<Participant> {
        logged(
            "INSERT",
            "participants",
            Participant::create(&self.pool, lottery_id, user_id, user_name).await,
        )
    }

    async fn list_participants(&self, lottery_id: i64) -> StoreResult<Vec<Participant>> {
        logged("SELECT", "participants", Participant::find_by_lottery(&self.pool, lottery_id).await)
    }

    async fn find_latest_win(&self, user_id: i64) -> StoreResult<Option<Participant>> {
        logged("SELECT", "participants", Participant::find_latest_win(&self.pool, user_id).await)
    }
}
