//! Contains all database functions for fishing: stats, inventory and upgrades.

use super::DbPool;
use super::models::{FishStack, FishingLeaderRow, FishingStats};
use super::users::uid;
use chrono::{DateTime, Utc};
use serenity::model::id::UserId;
use sqlx::{Executor, Sqlite, SqliteConnection};
use tracing::instrument;

pub async fn get_stats(pool: &DbPool, user_id: UserId) -> Result<FishingStats, sqlx::Error> {
    let stats = sqlx::query_as::<_, FishingStats>(
        "SELECT total_fish_caught, legendary_caught, last_fish_time, last_daily_claim FROM fishing_stats WHERE user_id = ?",
    )
    .bind(uid(user_id))
    .fetch_optional(pool)
    .await?;
    Ok(stats.unwrap_or_default())
}

/// Lifetime counters after a catch was recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatchTotals {
    pub caught: i64,
    pub legendary: i64,
}

/// Adds caught fish to the inventory and the lifetime counters in one transaction.
/// `legendary` is how many of `catches` are legendary.
/// `stamp_cooldown` also moves `last_fish_time`, which only the manual `fish` command does.
#[instrument(level = "debug", skip(pool, catches))]
pub async fn record_catches(
    pool: &DbPool,
    user_id: UserId,
    catches: &[(&str, i64)],
    legendary: i64,
    at: DateTime<Utc>,
    stamp_cooldown: bool,
) -> Result<CatchTotals, sqlx::Error> {
    let mut tx = pool.begin().await?;
    let mut total = 0;
    for (name, amount) in catches {
        add_fish(&mut tx, user_id, name, *amount).await?;
        total += amount;
    }
    let (caught, legendary): (i64, i64) = sqlx::query_as(
        r#"INSERT INTO fishing_stats (user_id, total_fish_caught, legendary_caught, last_fish_time)
        VALUES (?1, ?2, ?5, ?3)
        ON CONFLICT(user_id) DO UPDATE SET
            total_fish_caught = total_fish_caught + excluded.total_fish_caught,
            legendary_caught = legendary_caught + excluded.legendary_caught,
            last_fish_time = CASE WHEN ?4 THEN excluded.last_fish_time ELSE last_fish_time END
        RETURNING total_fish_caught, legendary_caught"#,
    )
    .bind(uid(user_id))
    .bind(total)
    .bind(if stamp_cooldown { Some(at) } else { None })
    .bind(stamp_cooldown)
    .bind(legendary)
    .fetch_one(&mut *tx)
    .await?;
    tx.commit().await?;
    Ok(CatchTotals { caught, legendary })
}

async fn add_fish(
    conn: &mut SqliteConnection,
    user_id: UserId,
    fish_name: &str,
    amount: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"INSERT INTO fishing_inventory (user_id, fish_name, amount) VALUES (?, ?, ?)
        ON CONFLICT(user_id, fish_name) DO UPDATE SET amount = amount + excluded.amount"#,
    )
    .bind(uid(user_id))
    .bind(fish_name)
    .bind(amount)
    .execute(conn)
    .await?;
    Ok(())
}

/// Non-empty inventory stacks, in insertion order.
pub async fn inventory(pool: &DbPool, user_id: UserId) -> Result<Vec<FishStack>, sqlx::Error> {
    sqlx::query_as::<_, FishStack>(
        "SELECT fish_name, amount FROM fishing_inventory WHERE user_id = ? AND amount > 0 ORDER BY id",
    )
    .bind(uid(user_id))
    .fetch_all(pool)
    .await
}

/// Takes `amount` of one fish out of the inventory, deleting the row when it hits zero.
/// Returns `Ok(false)` without changes if the user holds fewer than `amount`.
#[instrument(level = "debug", skip(conn))]
pub async fn remove_fish(
    conn: &mut SqliteConnection,
    user_id: UserId,
    fish_name: &str,
    amount: i64,
) -> Result<bool, sqlx::Error> {
    let res = sqlx::query(
        "UPDATE fishing_inventory SET amount = amount - ? WHERE user_id = ? AND fish_name = ? AND amount >= ?",
    )
    .bind(amount)
    .bind(uid(user_id))
    .bind(fish_name)
    .bind(amount)
    .execute(&mut *conn)
    .await?;
    if res.rows_affected() == 0 {
        return Ok(false);
    }
    sqlx::query("DELETE FROM fishing_inventory WHERE user_id = ? AND fish_name = ? AND amount <= 0")
        .bind(uid(user_id))
        .bind(fish_name)
        .execute(&mut *conn)
        .await?;
    Ok(true)
}

pub async fn clear_inventory<'e, E>(exec: E, user_id: UserId) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query("DELETE FROM fishing_inventory WHERE user_id = ?")
        .bind(uid(user_id))
        .execute(exec)
        .await?;
    Ok(())
}

/// Current level of one upgrade track (`rod`, `robot` or `net`); 0 when never bought.
pub async fn upgrade_level(
    pool: &DbPool,
    user_id: UserId,
    upgrade_type: &str,
) -> Result<i64, sqlx::Error> {
    let level: Option<i64> = sqlx::query_scalar(
        "SELECT level FROM fishing_upgrades WHERE user_id = ? AND upgrade_type = ?",
    )
    .bind(uid(user_id))
    .bind(upgrade_type)
    .fetch_optional(pool)
    .await?;
    Ok(level.unwrap_or(0))
}

/// Raises an upgrade track by one level, guarded by the expected current level
/// so two concurrent purchases cannot both succeed.
pub async fn bump_upgrade<'e, E>(
    exec: E,
    user_id: UserId,
    upgrade_type: &str,
    expected_level: i64,
) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let res = if expected_level == 0 {
        sqlx::query(
            "INSERT OR IGNORE INTO fishing_upgrades (user_id, upgrade_type, level) VALUES (?, ?, 1)",
        )
        .bind(uid(user_id))
        .bind(upgrade_type)
        .execute(exec)
        .await?
    } else {
        sqlx::query(
            "UPDATE fishing_upgrades SET level = level + 1 WHERE user_id = ? AND upgrade_type = ? AND level = ?",
        )
        .bind(uid(user_id))
        .bind(upgrade_type)
        .bind(expected_level)
        .execute(exec)
        .await?
    };
    Ok(res.rows_affected() == 1)
}

pub async fn set_daily_claim<'e, E>(
    exec: E,
    user_id: UserId,
    at: DateTime<Utc>,
) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"INSERT INTO fishing_stats (user_id, last_daily_claim) VALUES (?1, ?2)
        ON CONFLICT(user_id) DO UPDATE SET last_daily_claim = excluded.last_daily_claim"#,
    )
    .bind(uid(user_id))
    .bind(at)
    .execute(exec)
    .await?;
    Ok(())
}

/// Every angler with their lifetime total and number of distinct species held.
pub async fn leader_rows(pool: &DbPool) -> Result<Vec<FishingLeaderRow>, sqlx::Error> {
    sqlx::query_as::<_, FishingLeaderRow>(
        r#"SELECT s.user_id, s.total_fish_caught,
            (SELECT COUNT(*) FROM fishing_inventory i WHERE i.user_id = s.user_id AND i.amount > 0) AS unique_fish
        FROM fishing_stats s"#,
    )
    .fetch_all(pool)
    .await
}

/// All non-empty stacks across users as `(user_id, fish_name, amount)`.
pub async fn all_stacks(pool: &DbPool) -> Result<Vec<(i64, String, i64)>, sqlx::Error> {
    sqlx::query_as::<_, (i64, String, i64)>(
        "SELECT user_id, fish_name, amount FROM fishing_inventory WHERE amount > 0",
    )
    .fetch_all(pool)
    .await
}
