use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use teloxide::types::{ChatId, MessageId};

use crate::lottery::settings::LotterySetting;

/// Title given to lotteries created without one
pub const DEFAULT_TITLE: &str = "Please set a lottery title";
/// Password given to freshly created lotteries
pub const DEFAULT_PASSWORD: &str = "default password";
/// Winner spec used until the operator sets one
pub const DEFAULT_WINNER_PEOPLE: &str = "50%";

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[repr(i32)]
pub enum LotteryStatus {
    Paused = 0,
    Running = 1,
    Finished = 2,
}

impl LotteryStatus {
    pub fn label(&self) -> &'static str {
        match self {
            LotteryStatus::Paused => "Paused",
            LotteryStatus::Running => "Running",
            LotteryStatus::Finished => "Finished",
        }
    }

    /// Paused and running lotteries still occupy their chat
    pub fn is_active(&self) -> bool {
        !matches!(self, LotteryStatus::Finished)
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Lottery {
    pub id: i64,
    pub chat_id: i64,
    pub message_id: i64,
    pub creator_id: i64,
    pub title: String,
    pub status: LotteryStatus,
    pub drawn_people: i64, // 0 = manual draw
    pub winner_people: String,
    pub password: String,
    pub same_prize: bool,
    pub prize: String,
    pub created_at: String,
    pub finished_at: Option<String>,
}

/// Fields supplied by `/create`; everything else starts from its default.
#[derive(Debug, Clone)]
pub struct NewLottery {
    pub chat_id: i64,
    pub message_id: i64,
    pub creator_id: i64,
    pub title: String,
}

const LOTTERY_COLUMNS: &str = "id, chat_id, message_id, creator_id, title, status, drawn_people, \
    winner_people, password, same_prize, prize, created_at, finished_at";

impl Lottery {
    pub fn chat(&self) -> ChatId {
        ChatId(self.chat_id)
    }

    pub fn status_message(&self) -> MessageId {
        MessageId(self.message_id as i32)
    }

    /// Prizes handed out in draw order. A shared prize is repeated for every
    /// winner by the draw itself, so it is returned once.
    ///
    /// Entries are trimmed and blank lines dropped, so an empty prize field
    /// leaves every winner with the fallback text instead of an empty prize.
    pub fn prize_list(&self) -> Vec<String> {
        if self.same_prize {
            return vec![self.prize.clone()];
        }
        self.prize
            .split('\n')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(String::from)
            .collect()
    }

    pub async fn create(pool: &sqlx::SqlitePool, new: NewLottery) -> Result<Self, sqlx::Error> {
        let now = Utc::now().to_rfc3339();

        let id = sqlx::query(
            r#"
            INSERT INTO lotteries (chat_id, message_id, creator_id, title, status, drawn_people,
                                   winner_people, password, same_prize, prize, created_at)
            VALUES (?, ?, ?, ?, 0, 0, ?, ?, 1, '', ?)
            "#,
        )
        .bind(new.chat_id)
        .bind(new.message_id)
        .bind(new.creator_id)
        .bind(&new.title)
        .bind(DEFAULT_WINNER_PEOPLE)
        .bind(DEFAULT_PASSWORD)
        .bind(&now)
        .execute(pool)
        .await?
        .last_insert_rowid();

        Self::find_by_id(pool, id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    pub async fn find_by_id(pool: &sqlx::SqlitePool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Lottery>(&format!("SELECT {LOTTERY_COLUMNS} FROM lotteries WHERE id = ?"))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Latest paused or running lottery of a chat
    pub async fn find_active_by_chat(
        pool: &sqlx::SqlitePool,
        chat_id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Lottery>(&format!(
            "SELECT {LOTTERY_COLUMNS} FROM lotteries WHERE chat_id = ? AND status IN (0, 1) ORDER BY id DESC"
        ))
        .bind(chat_id)
        .fetch_optional(pool)
        .await
    }

    pub async fn find_running_by_chat(
        pool: &sqlx::SqlitePool,
        chat_id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Lottery>(&format!(
            "SELECT {LOTTERY_COLUMNS} FROM lotteries WHERE chat_id = ? AND status = 1 ORDER BY id DESC"
        ))
        .bind(chat_id)
        .fetch_optional(pool)
        .await
    }

    /// Latest paused or running lottery created by a user, used to resolve
    /// which lottery a private-chat command refers to.
    pub async fn find_active_by_creator(
        pool: &sqlx::SqlitePool,
        creator_id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Lottery>(&format!(
            "SELECT {LOTTERY_COLUMNS} FROM lotteries WHERE creator_id = ? AND status IN (0, 1) ORDER BY id DESC"
        ))
        .bind(creator_id)
        .fetch_optional(pool)
        .await
    }

    pub async fn update_status(
        pool: &sqlx::SqlitePool,
        id: i64,
        status: LotteryStatus,
    ) -> Result<(), sqlx::Error> {
        let finished_at = (status == LotteryStatus::Finished).then(|| Utc::now().to_rfc3339());

        sqlx::query("UPDATE lotteries SET status = ?, finished_at = ? WHERE id = ?")
            .bind(status)
            .bind(finished_at)
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    pub async fn update_message_id(
        pool: &sqlx::SqlitePool,
        id: i64,
        message_id: i64,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE lotteries SET message_id = ? WHERE id = ?")
            .bind(message_id)
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Marks the lottery finished and records every winner's prize in one
    /// transaction. Participants that already hold a prize keep it.
    pub async fn finish_with_prizes(
        pool: &sqlx::SqlitePool,
        id: i64,
        prizes: &[(i64, String)],
    ) -> Result<(), sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("UPDATE lotteries SET status = ?, finished_at = ? WHERE id = ?")
            .bind(LotteryStatus::Finished)
            .bind(Utc::now().to_rfc3339())
            .bind(id)
            .execute(&mut tx)
            .await?;

        for (participant_id, prize) in prizes {
            sqlx::query(
                "UPDATE participants SET prize = ? WHERE id = ? AND lottery_id = ? AND prize IS NULL",
            )
            .bind(prize)
            .bind(participant_id)
            .bind(id)
            .execute(&mut tx)
            .await?;
        }

        tx.commit().await
    }

    pub async fn apply_setting(
        pool: &sqlx::SqlitePool,
        id: i64,
        setting: &LotterySetting,
    ) -> Result<(), sqlx::Error> {
        let query = match setting {
            LotterySetting::Title(title) => {
                sqlx::query("UPDATE lotteries SET title = ? WHERE id = ?").bind(title.clone())
            }
            LotterySetting::DrawnPeople(count) => {
                sqlx::query("UPDATE lotteries SET drawn_people = ? WHERE id = ?").bind(*count)
            }
            LotterySetting::WinnerPeople(spec) => {
                sqlx::query("UPDATE lotteries SET winner_people = ? WHERE id = ?").bind(spec.to_string())
            }
            LotterySetting::Password(password) => {
                sqlx::query("UPDATE lotteries SET password = ? WHERE id = ?").bind(password.clone())
            }
            LotterySetting::SamePrize(same) => {
                sqlx::query("UPDATE lotteries SET same_prize = ? WHERE id = ?").bind(*same)
            }
            LotterySetting::Prize(prize) => {
                sqlx::query("UPDATE lotteries SET prize = ? WHERE id = ?").bind(prize.clone())
            }
        };

        query.bind(id).execute(pool).await?;
        Ok(())
    }

    /// Hard delete; participants go with it.
    pub async fn delete(pool: &sqlx::SqlitePool, id: i64) -> Result<(), sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM participants WHERE lottery_id = ?")
            .bind(id)
            .execute(&mut tx)
            .await?;
        sqlx::query("DELETE FROM lotteries WHERE id = ?")
            .bind(id)
            .execute(&mut tx)
            .await?;

        tx.commit().await
    }

    /// Removes finished lotteries drawn before `cutoff` (RFC 3339) and
    /// returns how many were removed.
    pub async fn purge_finished_before(
        pool: &sqlx::SqlitePool,
        cutoff: &str,
    ) -> Result<u64, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query(
            r#"
            DELETE FROM participants WHERE lottery_id IN (
                SELECT id FROM lotteries WHERE status = 2 AND finished_at < ?
            )
            "#,
        )
        .bind(cutoff)
        .execute(&mut tx)
        .await?;

        let removed = sqlx::query("DELETE FROM lotteries WHERE status = 2 AND finished_at < ?")
            .bind(cutoff)
            .execute(&mut tx)
            .await?
            .rows_affected();

        tx.commit().await?;
        Ok(removed)
    }

    pub async fn count_active(pool: &sqlx::SqlitePool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM lotteries WHERE status IN (0, 1)")
            .fetch_one(pool)
            .await
    }
}
