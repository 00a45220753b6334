use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Participant {
    pub id: i64,
    pub user_id: i64,
    pub user_name: String,
    pub lottery_id: i64,
    pub prize: Option<String>, // set once by the draw
    pub joined_at: String,
}

impl Participant {
    /// Fails with a unique-constraint violation when the same user joins the
    /// same lottery twice under the same name.
    pub async fn create(
        pool: &sqlx::SqlitePool,
        lottery_id: i64,
        user_id: i64,
        user_name: &str,
    ) -> Result<Self, sqlx::Error> {
        let now = Utc::now().to_rfc3339();

        let id = sqlx::query(
            "INSERT INTO participants (user_id, user_name, lottery_id, joined_at) VALUES (?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(user_name)
        .bind(lottery_id)
        .bind(&now)
        .execute(pool)
        .await?
        .last_insert_rowid();

        Ok(Participant {
            id,
            user_id,
            user_name: user_name.to_string(),
            lottery_id,
            prize: None,
            joined_at: now,
        })
    }

    pub async fn find_by_lottery(
        pool: &sqlx::SqlitePool,
        lottery_id: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Participant>(
            "SELECT id, user_id, user_name, lottery_id, prize, joined_at FROM participants WHERE lottery_id = ? ORDER BY id"
        )
        .bind(lottery_id)
        .fetch_all(pool)
        .await
    }

    /// Most recent prize won by a user across all lotteries
    pub async fn find_latest_win(
        pool: &sqlx::SqlitePool,
        user_id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Participant>(
            "SELECT id, user_id, user_name, lottery_id, prize, joined_at FROM participants \
             WHERE user_id = ? AND prize IS NOT NULL ORDER BY id DESC LIMIT 1"
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }
}
