//! Database functions for kumpul sessions and the per-user portfolio counter.

use super::DbPool;
use super::models::KumpulSession;
use super::users::uid;
use chrono::{DateTime, Utc};
use serenity::model::id::{ChannelId, MessageId, UserId};
use sqlx::{Executor, Sqlite};
use tracing::instrument;

const SESSION_COLUMNS: &str =
    "message_id, user_id, channel_id, start_time, end_time, max_reactions, status, last_xp_check_time";

/// Lifecycle of a kumpul post. Stored as lowercase text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Active,
    Calculating,
    Ended,
    Canceled,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Active => "active",
            SessionStatus::Calculating => "calculating",
            SessionStatus::Ended => "ended",
            SessionStatus::Canceled => "canceled",
        }
    }
}

impl KumpulSession {
    pub fn status(&self) -> Option<SessionStatus> {
        match self.status.as_str() {
            "active" => Some(SessionStatus::Active),
            "calculating" => Some(SessionStatus::Calculating),
            "ended" => Some(SessionStatus::Ended),
            "canceled" => Some(SessionStatus::Canceled),
            _ => None,
        }
    }

    pub fn owner(&self) -> UserId {
        UserId::new(self.user_id as u64)
    }

    pub fn channel(&self) -> ChannelId {
        ChannelId::new(self.channel_id as u64)
    }

    pub fn message(&self) -> MessageId {
        MessageId::new(self.message_id as u64)
    }
}

#[instrument(level = "debug", skip(pool))]
pub async fn create_session(
    pool: &DbPool,
    message_id: MessageId,
    user_id: UserId,
    channel_id: ChannelId,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO kumpul_tracking (message_id, user_id, channel_id, start_time, end_time, max_reactions, status, last_xp_check_time) VALUES (?, ?, ?, ?, ?, 0, 'active', ?)",
    )
    .bind(message_id.get() as i64)
    .bind(uid(user_id))
    .bind(channel_id.get() as i64)
    .bind(start)
    .bind(end)
    .bind(start)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn get_session(
    pool: &DbPool,
    message_id: MessageId,
) -> Result<Option<KumpulSession>, sqlx::Error> {
    sqlx::query_as::<_, KumpulSession>(&format!(
        "SELECT {SESSION_COLUMNS} FROM kumpul_tracking WHERE message_id = ?"
    ))
    .bind(message_id.get() as i64)
    .fetch_optional(pool)
    .await
}

/// A user's session that is still running (`active` or awaiting cancel confirmation).
#[instrument(level = "debug", skip(pool))]
pub async fn open_session_for(
    pool: &DbPool,
    user_id: UserId,
) -> Result<Option<KumpulSession>, sqlx::Error> {
    sqlx::query_as::<_, KumpulSession>(&format!(
        "SELECT {SESSION_COLUMNS} FROM kumpul_tracking WHERE user_id = ? AND status IN ('active', 'calculating') LIMIT 1"
    ))
    .bind(uid(user_id))
    .fetch_optional(pool)
    .await
}

pub async fn active_sessions(pool: &DbPool) -> Result<Vec<KumpulSession>, sqlx::Error> {
    sqlx::query_as::<_, KumpulSession>(&format!(
        "SELECT {SESSION_COLUMNS} FROM kumpul_tracking WHERE status = 'active'"
    ))
    .fetch_all(pool)
    .await
}

pub async fn set_status(
    pool: &DbPool,
    message_id: MessageId,
    status: SessionStatus,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE kumpul_tracking SET status = ? WHERE message_id = ?")
        .bind(status.as_str())
        .bind(message_id.get() as i64)
        .execute(pool)
        .await?;
    Ok(())
}

/// Moves `from` to `to` only if the session is still in `from`. Returns whether it moved.
pub async fn transition_status(
    pool: &DbPool,
    message_id: MessageId,
    from: SessionStatus,
    to: SessionStatus,
) -> Result<bool, sqlx::Error> {
    let res = sqlx::query("UPDATE kumpul_tracking SET status = ? WHERE message_id = ? AND status = ?")
        .bind(to.as_str())
        .bind(message_id.get() as i64)
        .bind(from.as_str())
        .execute(pool)
        .await?;
    Ok(res.rows_affected() == 1)
}

/// Raises the paid reaction count from `from` to `to`. Returns `false` when another
/// reaction event already moved it, so each 🔥 is paid once.
pub async fn raise_max_reactions<'e, E>(
    exec: E,
    message_id: MessageId,
    from: i64,
    to: i64,
) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let res = sqlx::query(
        "UPDATE kumpul_tracking SET max_reactions = ? WHERE message_id = ? AND max_reactions = ? AND status = 'active'",
    )
    .bind(to)
    .bind(message_id.get() as i64)
    .bind(from)
    .execute(exec)
    .await?;
    Ok(res.rows_affected() == 1)
}

/// Advances the hourly check stamp, optionally clearing the paid reaction count.
pub async fn mark_xp_check(
    pool: &DbPool,
    message_id: MessageId,
    at: DateTime<Utc>,
    reset_reactions: bool,
) -> Result<(), sqlx::Error> {
    let sql = if reset_reactions {
        "UPDATE kumpul_tracking SET last_xp_check_time = ?, max_reactions = 0 WHERE message_id = ?"
    } else {
        "UPDATE kumpul_tracking SET last_xp_check_time = ? WHERE message_id = ?"
    };
    sqlx::query(sql)
        .bind(at)
        .bind(message_id.get() as i64)
        .execute(pool)
        .await?;
    Ok(())
}

/// Bumps the user's kumpul counter and returns the new count.
#[instrument(level = "debug", skip(exec))]
pub async fn increment_portfolio<'e, E>(exec: E, user_id: UserId) -> Result<i64, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_scalar(
        r#"INSERT INTO portfolio_tracking (user_id, portfolio_count) VALUES (?, 1)
        ON CONFLICT(user_id) DO UPDATE SET portfolio_count = portfolio_count + 1
        RETURNING portfolio_count"#,
    )
    .bind(uid(user_id))
    .fetch_one(exec)
    .await
}

pub async fn portfolio_count(pool: &DbPool, user_id: UserId) -> Result<i64, sqlx::Error> {
    let count: Option<i64> =
        sqlx::query_scalar("SELECT portfolio_count FROM portfolio_tracking WHERE user_id = ?")
            .bind(uid(user_id))
            .fetch_optional(pool)
            .await?;
    Ok(count.unwrap_or(0))
}
