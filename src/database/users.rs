//! Contains all database functions related to the core user record:
//! xp, level, currency, gacha rolls, booster items, luck and cooldown stamps.

use super::DbPool;
use super::models::{LeaderboardEntry, Profile};
use crate::commands::economy::item::BoosterItem;
use chrono::{DateTime, Utc};
use serenity::model::id::UserId;
use sqlx::{Executor, Sqlite};
use tracing::instrument;

const PROFILE_COLUMNS: &str = "user_id, xp, level, currency, gacha_rolls, xp_2x, xp_4x, xp_8x, xp_10x, xp_20x, next_xp_mult, luck, last_weekly_claim, last_kumpul_time";

pub(crate) fn uid(user_id: UserId) -> i64 {
    user_id.get() as i64
}

/// Fetches a user's record, if they have ever interacted with the bot.
#[instrument(level = "debug", skip(exec))]
pub async fn get_user<'e, E>(exec: E, user_id: UserId) -> Result<Option<Profile>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, Profile>(&format!(
        "SELECT {PROFILE_COLUMNS} FROM users WHERE user_id = ?"
    ))
    .bind(uid(user_id))
    .fetch_optional(exec)
    .await
}

/// Inserts a default row when absent, then returns the (possibly fresh) record.
#[instrument(level = "debug", skip(pool))]
pub async fn get_or_create_user(pool: &DbPool, user_id: UserId) -> Result<Profile, sqlx::Error> {
    ensure_user(pool, user_id).await?;
    sqlx::query_as::<_, Profile>(&format!(
        "SELECT {PROFILE_COLUMNS} FROM users WHERE user_id = ?"
    ))
    .bind(uid(user_id))
    .fetch_one(pool)
    .await
}

pub async fn ensure_user<'e, E>(exec: E, user_id: UserId) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query("INSERT OR IGNORE INTO users (user_id) VALUES (?)")
        .bind(uid(user_id))
        .execute(exec)
        .await?;
    Ok(())
}

/// Credits (or debits) currency. Credits create the user when needed.
/// Debits that would take the balance below zero, including debits of unknown users,
/// are refused and return `Ok(false)`.
#[instrument(level = "debug", skip(exec))]
pub async fn add_currency<'e, E>(exec: E, user_id: UserId, delta: i64) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let res = sqlx::query(
        r#"INSERT INTO users (user_id, currency)
        SELECT ?1, ?2 WHERE ?2 >= 0 OR EXISTS (SELECT 1 FROM users WHERE user_id = ?1)
        ON CONFLICT(user_id) DO UPDATE SET currency = currency + excluded.currency
        WHERE users.currency + excluded.currency >= 0"#,
    )
    .bind(uid(user_id))
    .bind(delta)
    .execute(exec)
    .await?;
    Ok(res.rows_affected() == 1)
}

#[instrument(level = "debug", skip(exec))]
pub async fn add_xp<'e, E>(exec: E, user_id: UserId, delta: i64) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"INSERT INTO users (user_id, xp) VALUES (?1, MAX(?2, 0))
        ON CONFLICT(user_id) DO UPDATE SET xp = MAX(0, xp + excluded.xp)"#,
    )
    .bind(uid(user_id))
    .bind(delta)
    .execute(exec)
    .await?;
    Ok(())
}

#[instrument(level = "debug", skip(exec))]
pub async fn add_luck<'e, E>(exec: E, user_id: UserId, delta: i64) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"INSERT INTO users (user_id, luck) VALUES (?1, ?2)
        ON CONFLICT(user_id) DO UPDATE SET luck = luck + excluded.luck"#,
    )
    .bind(uid(user_id))
    .bind(delta)
    .execute(exec)
    .await?;
    Ok(())
}

/// Adjusts gacha rolls; a decrement below zero is refused and returns `Ok(false)`.
#[instrument(level = "debug", skip(exec))]
pub async fn add_gacha_rolls<'e, E>(exec: E, user_id: UserId, delta: i64) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let res = sqlx::query(
        r#"INSERT INTO users (user_id, gacha_rolls)
        SELECT ?1, ?2 WHERE ?2 >= 0 OR EXISTS (SELECT 1 FROM users WHERE user_id = ?1)
        ON CONFLICT(user_id) DO UPDATE SET gacha_rolls = gacha_rolls + excluded.gacha_rolls
        WHERE users.gacha_rolls + excluded.gacha_rolls >= 0"#,
    )
    .bind(uid(user_id))
    .bind(delta)
    .execute(exec)
    .await?;
    Ok(res.rows_affected() == 1)
}

/// Adjusts the count of one XP booster item; refuses to go below zero.
#[instrument(level = "debug", skip(exec))]
pub async fn add_booster<'e, E>(
    exec: E,
    user_id: UserId,
    item: BoosterItem,
    delta: i64,
) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    // Column names come from a closed enum, never from user input.
    let column = item.column();
    let res = sqlx::query(&format!(
        r#"INSERT INTO users (user_id, {column})
        SELECT ?1, ?2 WHERE ?2 >= 0 OR EXISTS (SELECT 1 FROM users WHERE user_id = ?1)
        ON CONFLICT(user_id) DO UPDATE SET {column} = {column} + excluded.{column}
        WHERE users.{column} + excluded.{column} >= 0"#
    ))
    .bind(uid(user_id))
    .bind(delta)
    .execute(exec)
    .await?;
    Ok(res.rows_affected() == 1)
}

pub async fn set_next_xp_mult<'e, E>(exec: E, user_id: UserId, mult: f64) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query("UPDATE users SET next_xp_mult = ? WHERE user_id = ?")
        .bind(mult)
        .bind(uid(user_id))
        .execute(exec)
        .await?;
    Ok(())
}

/// Arms a booster only while none is pending.
pub async fn arm_xp_booster<'e, E>(exec: E, user_id: UserId, mult: f64) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let res = sqlx::query("UPDATE users SET next_xp_mult = ? WHERE user_id = ? AND next_xp_mult <= 1.0")
        .bind(mult)
        .bind(uid(user_id))
        .execute(exec)
        .await?;
    Ok(res.rows_affected() == 1)
}

/// Writes the outcome of a level-up: the new level plus the granted currency, rolls and luck.
#[instrument(level = "debug", skip(exec))]
pub async fn apply_level_up<'e, E>(
    exec: E,
    user_id: UserId,
    new_level: i64,
    currency: i64,
    rolls: i64,
    luck: i64,
) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        "UPDATE users SET level = ?, currency = currency + ?, gacha_rolls = gacha_rolls + ?, luck = luck + ? WHERE user_id = ?",
    )
    .bind(new_level)
    .bind(currency)
    .bind(rolls)
    .bind(luck)
    .bind(uid(user_id))
    .execute(exec)
    .await?;
    Ok(())
}

/// Moves the weekly stamp from `prev` to `at`. Returns `Ok(false)` when another claim got there first.
pub async fn stamp_weekly_claim<'e, E>(
    exec: E,
    user_id: UserId,
    prev: Option<DateTime<Utc>>,
    at: DateTime<Utc>,
) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let res = sqlx::query("UPDATE users SET last_weekly_claim = ? WHERE user_id = ? AND last_weekly_claim IS ?")
        .bind(at)
        .bind(uid(user_id))
        .bind(prev)
        .execute(exec)
        .await?;
    Ok(res.rows_affected() == 1)
}

pub async fn set_last_kumpul_time<'e, E>(
    exec: E,
    user_id: UserId,
    at: DateTime<Utc>,
) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query("UPDATE users SET last_kumpul_time = ? WHERE user_id = ?")
        .bind(at)
        .bind(uid(user_id))
        .execute(exec)
        .await?;
    Ok(())
}

/// Moves currency between two users atomically. Returns `Ok(false)` if the sender is short.
#[instrument(level = "debug", skip(pool))]
pub async fn transfer_currency(
    pool: &DbPool,
    from: UserId,
    to: UserId,
    amount: i64,
) -> Result<bool, sqlx::Error> {
    let mut tx = pool.begin().await?;
    if !add_currency(&mut *tx, from, -amount).await? {
        tx.rollback().await?;
        return Ok(false);
    }
    add_currency(&mut *tx, to, amount).await?;
    tx.commit().await?;
    Ok(true)
}

/// Top users ordered by level, then currency.
pub async fn top_users(pool: &DbPool, limit: i64) -> Result<Vec<LeaderboardEntry>, sqlx::Error> {
    sqlx::query_as::<_, LeaderboardEntry>(
        "SELECT user_id, level, currency FROM users ORDER BY level DESC, currency DESC LIMIT ?",
    )
    .bind(limit)
    .fetch_all(pool)
    .await
}

/// Every user holding a positive balance, with their level (weekly tax input).
pub async fn users_with_currency(pool: &DbPool) -> Result<Vec<LeaderboardEntry>, sqlx::Error> {
    sqlx::query_as::<_, LeaderboardEntry>(
        "SELECT user_id, level, currency FROM users WHERE currency > 0",
    )
    .fetch_all(pool)
    .await
}

pub async fn count_users(pool: &DbPool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await
}
