//! Database functions for unlocked achievements.

use super::DbPool;
use super::models::UnlockedAchievement;
use super::users::uid;
use chrono::{DateTime, Utc};
use serenity::model::id::UserId;
use sqlx::{Executor, Sqlite};

pub async fn unlocked<'e, E>(
    exec: E,
    user_id: UserId,
) -> Result<Vec<UnlockedAchievement>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, UnlockedAchievement>(
        "SELECT achievement_id, unlocked_at FROM user_achievements WHERE user_id = ? AND unlocked = 1 ORDER BY unlocked_at",
    )
    .bind(uid(user_id))
    .fetch_all(exec)
    .await
}

/// Inserts the unlock row. Returns `false` when the achievement was already unlocked.
pub async fn unlock<'e, E>(
    exec: E,
    user_id: UserId,
    achievement_id: &str,
    at: DateTime<Utc>,
) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let res = sqlx::query(
        r#"INSERT INTO user_achievements (user_id, achievement_id, unlocked_at, unlocked) VALUES (?1, ?2, ?3, 1)
        ON CONFLICT(user_id, achievement_id) DO UPDATE SET unlocked = 1, unlocked_at = excluded.unlocked_at
        WHERE user_achievements.unlocked = 0"#,
    )
    .bind(uid(user_id))
    .bind(achievement_id)
    .bind(at)
    .execute(exec)
    .await?;
    Ok(res.rows_affected() == 1)
}

pub async fn unlocked_count(pool: &DbPool, user_id: UserId) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM user_achievements WHERE user_id = ? AND unlocked = 1")
        .bind(uid(user_id))
        .fetch_one(pool)
        .await
}
