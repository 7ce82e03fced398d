//! Database functions for the global daily quest, per-user progress and quest stats.

use super::DbPool;
use super::models::{GlobalQuest, PendingCompletion, QuestProgress, QuestStats};
use super::users::uid;
use chrono::{DateTime, Utc};
use serenity::model::id::UserId;
use sqlx::{Executor, Sqlite, SqliteConnection};
use tracing::instrument;

const QUEST_COLUMNS: &str = "quest_id, quest_type, title, description, emoji, target_amount, reward_currency, reward_luck, created_at, expires_at, active";

pub async fn get_quest(pool: &DbPool, quest_id: &str) -> Result<Option<GlobalQuest>, sqlx::Error> {
    sqlx::query_as::<_, GlobalQuest>(&format!(
        "SELECT {QUEST_COLUMNS} FROM global_quests WHERE quest_id = ?"
    ))
    .bind(quest_id)
    .fetch_optional(pool)
    .await
}

/// The currently running quest, if one is active and not yet expired.
pub async fn active_quest(
    pool: &DbPool,
    now: DateTime<Utc>,
) -> Result<Option<GlobalQuest>, sqlx::Error> {
    sqlx::query_as::<_, GlobalQuest>(&format!(
        "SELECT {QUEST_COLUMNS} FROM global_quests WHERE active = 1 AND expires_at > ? ORDER BY created_at DESC LIMIT 1"
    ))
    .bind(now)
    .fetch_optional(pool)
    .await
}

pub async fn recent_quests(pool: &DbPool, limit: i64) -> Result<Vec<GlobalQuest>, sqlx::Error> {
    sqlx::query_as::<_, GlobalQuest>(&format!(
        "SELECT {QUEST_COLUMNS} FROM global_quests ORDER BY created_at DESC LIMIT ?"
    ))
    .bind(limit)
    .fetch_all(pool)
    .await
}

/// Deactivates every quest and inserts `quest` as the only active one.
#[instrument(level = "debug", skip(pool, quest), fields(quest_id = %quest.quest_id))]
pub async fn replace_active_quest(pool: &DbPool, quest: &GlobalQuest) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;
    sqlx::query("UPDATE global_quests SET active = 0")
        .execute(&mut *tx)
        .await?;
    sqlx::query(
        "INSERT INTO global_quests (quest_id, quest_type, title, description, emoji, target_amount, reward_currency, reward_luck, created_at, expires_at, active) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 1)",
    )
    .bind(&quest.quest_id)
    .bind(&quest.quest_type)
    .bind(&quest.title)
    .bind(&quest.description)
    .bind(&quest.emoji)
    .bind(quest.target_amount)
    .bind(quest.reward_currency)
    .bind(quest.reward_luck)
    .bind(quest.created_at)
    .bind(quest.expires_at)
    .execute(&mut *tx)
    .await?;
    tx.commit().await
}

/// Removes a quest and every progress row attached to it.
#[instrument(level = "debug", skip(pool))]
pub async fn delete_quest(pool: &DbPool, quest_id: &str) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;
    sqlx::query("DELETE FROM quest_progress WHERE quest_id = ?")
        .bind(quest_id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM global_quests WHERE quest_id = ?")
        .bind(quest_id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await
}

/// Adds progress towards the active quest of `quest_type`, clamped at its target.
/// Returns `(quest_id, new_progress, target)` when such a quest is running.
#[instrument(level = "debug", skip(pool))]
pub async fn add_progress(
    pool: &DbPool,
    user_id: UserId,
    quest_type: &str,
    amount: i64,
    now: DateTime<Utc>,
) -> Result<Option<(String, i64, i64)>, sqlx::Error> {
    let quest: Option<(String, i64)> = sqlx::query_as(
        "SELECT quest_id, target_amount FROM global_quests WHERE active = 1 AND quest_type = ? AND expires_at > ? LIMIT 1",
    )
    .bind(quest_type)
    .bind(now)
    .fetch_optional(pool)
    .await?;
    let Some((quest_id, target)) = quest else {
        return Ok(None);
    };

    let progress: i64 = sqlx::query_scalar(
        r#"INSERT INTO quest_progress (quest_id, user_id, current_progress, last_updated)
        VALUES (?1, ?2, MIN(?3, ?4), ?5)
        ON CONFLICT(quest_id, user_id) DO UPDATE SET
            current_progress = MIN(current_progress + ?3, ?4),
            last_updated = excluded.last_updated
        RETURNING current_progress"#,
    )
    .bind(&quest_id)
    .bind(uid(user_id))
    .bind(amount)
    .bind(target)
    .bind(now)
    .fetch_one(pool)
    .await?;
    Ok(Some((quest_id, progress, target)))
}

/// Rows that reached their quest's target but were not rewarded yet.
pub async fn pending_completions(pool: &DbPool) -> Result<Vec<PendingCompletion>, sqlx::Error> {
    sqlx::query_as::<_, PendingCompletion>(
        r#"SELECT p.quest_id, p.user_id, q.title, q.emoji, q.reward_currency, q.reward_luck
        FROM quest_progress p JOIN global_quests q ON q.quest_id = p.quest_id
        WHERE p.completed = 0 AND p.current_progress >= q.target_amount"#,
    )
    .fetch_all(pool)
    .await
}

/// Flags a progress row as completed. Returns `false` if another sweep got there first.
pub async fn mark_completed(
    conn: &mut SqliteConnection,
    quest_id: &str,
    user_id: UserId,
    at: DateTime<Utc>,
) -> Result<bool, sqlx::Error> {
    let res = sqlx::query(
        "UPDATE quest_progress SET completed = 1, completed_at = ? WHERE quest_id = ? AND user_id = ? AND completed = 0",
    )
    .bind(at)
    .bind(quest_id)
    .bind(uid(user_id))
    .execute(conn)
    .await?;
    Ok(res.rows_affected() == 1)
}

/// Increments the user's completed-quest counter and returns the new total.
pub async fn bump_quest_stats<'e, E>(
    exec: E,
    user_id: UserId,
    at: DateTime<Utc>,
) -> Result<i64, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_scalar(
        r#"INSERT INTO quest_stats (user_id, total_completed, last_completed_at) VALUES (?, 1, ?)
        ON CONFLICT(user_id) DO UPDATE SET
            total_completed = total_completed + 1,
            last_completed_at = excluded.last_completed_at
        RETURNING total_completed"#,
    )
    .bind(uid(user_id))
    .bind(at)
    .fetch_one(exec)
    .await
}

pub async fn quest_stats(pool: &DbPool, user_id: UserId) -> Result<QuestStats, sqlx::Error> {
    let stats = sqlx::query_as::<_, QuestStats>(
        "SELECT total_completed, last_completed_at FROM quest_stats WHERE user_id = ?",
    )
    .bind(uid(user_id))
    .fetch_optional(pool)
    .await?;
    Ok(stats.unwrap_or_default())
}

pub async fn user_progress(
    pool: &DbPool,
    quest_id: &str,
    user_id: UserId,
) -> Result<Option<QuestProgress>, sqlx::Error> {
    sqlx::query_as::<_, QuestProgress>(
        "SELECT user_id, current_progress, completed, completed_at FROM quest_progress WHERE quest_id = ? AND user_id = ?",
    )
    .bind(quest_id)
    .bind(uid(user_id))
    .fetch_optional(pool)
    .await
}

/// Best progress on a quest, completed rows first.
pub async fn top_progress(
    pool: &DbPool,
    quest_id: &str,
    limit: i64,
) -> Result<Vec<QuestProgress>, sqlx::Error> {
    sqlx::query_as::<_, QuestProgress>(
        r#"SELECT user_id, current_progress, completed, completed_at FROM quest_progress
        WHERE quest_id = ? AND current_progress > 0
        ORDER BY completed DESC, current_progress DESC, last_updated ASC LIMIT ?"#,
    )
    .bind(quest_id)
    .bind(limit)
    .fetch_all(pool)
    .await
}

/// `(participants, completed)` for one quest.
pub async fn participation(pool: &DbPool, quest_id: &str) -> Result<(i64, i64), sqlx::Error> {
    sqlx::query_as(
        "SELECT COUNT(*), COALESCE(SUM(completed), 0) FROM quest_progress WHERE quest_id = ? AND current_progress > 0",
    )
    .bind(quest_id)
    .fetch_one(pool)
    .await
}
