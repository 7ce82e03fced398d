//! Database functions for jade cutting statistics.

use super::DbPool;
use super::models::{JadeLeaderRow, JadeStats};
use super::users::uid;
use chrono::{DateTime, Utc};
use serenity::model::id::UserId;
use sqlx::{Executor, Sqlite};
use tracing::instrument;

pub async fn get_stats(pool: &DbPool, user_id: UserId) -> Result<JadeStats, sqlx::Error> {
    let stats = sqlx::query_as::<_, JadeStats>(
        "SELECT total_spent, total_won, total_cuts, total_wins, total_losses, total_jackpots, last_cut_time FROM jade_stats WHERE user_id = ?",
    )
    .bind(uid(user_id))
    .fetch_optional(pool)
    .await?;
    Ok(stats.unwrap_or_default())
}

/// Folds one finished cut into the user's totals and returns the updated row.
#[instrument(level = "debug", skip(exec))]
pub async fn record_cut<'e, E>(
    exec: E,
    user_id: UserId,
    price: i64,
    reward: i64,
    jackpot: bool,
    at: DateTime<Utc>,
) -> Result<JadeStats, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let win = reward > price;
    sqlx::query_as::<_, JadeStats>(
        r#"INSERT INTO jade_stats (user_id, total_spent, total_won, total_cuts, total_wins, total_losses, total_jackpots, last_cut_time)
        VALUES (?1, ?2, ?3, 1, ?4, ?5, ?6, ?7)
        ON CONFLICT(user_id) DO UPDATE SET
            total_spent = total_spent + excluded.total_spent,
            total_won = total_won + excluded.total_won,
            total_cuts = total_cuts + 1,
            total_wins = total_wins + excluded.total_wins,
            total_losses = total_losses + excluded.total_losses,
            total_jackpots = total_jackpots + excluded.total_jackpots,
            last_cut_time = excluded.last_cut_time
        RETURNING total_spent, total_won, total_cuts, total_wins, total_losses, total_jackpots, last_cut_time"#,
    )
    .bind(uid(user_id))
    .bind(price)
    .bind(reward)
    .bind(i64::from(win))
    .bind(i64::from(!win))
    .bind(i64::from(jackpot))
    .bind(at)
    .fetch_one(exec)
    .await
}

/// Every user with at least one cut.
pub async fn leader_rows(pool: &DbPool) -> Result<Vec<JadeLeaderRow>, sqlx::Error> {
    sqlx::query_as::<_, JadeLeaderRow>(
        "SELECT user_id, total_spent, total_won, total_cuts, total_wins, total_jackpots FROM jade_stats WHERE total_cuts > 0",
    )
    .fetch_all(pool)
    .await
}
