//! Database functions for collected taxes and the weekly forced-collection stamp.

use super::DbPool;
use super::models::{TaxPayer, TaxRecord};
use super::users::uid;
use chrono::{DateTime, Utc};
use serenity::model::id::UserId;
use sqlx::{Executor, Sqlite, SqliteConnection};
use tracing::instrument;

pub async fn record_tax<'e, E>(
    exec: E,
    user_id: UserId,
    tax_type: &str,
    amount: i64,
    at: DateTime<Utc>,
) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        "INSERT INTO tax_history (user_id, tax_type, amount, collected_at) VALUES (?, ?, ?, ?)",
    )
    .bind(uid(user_id))
    .bind(tax_type)
    .bind(amount)
    .bind(at)
    .execute(exec)
    .await?;
    Ok(())
}

/// Debits `amount` from the user and records it as `tax_type`.
/// Returns `false` without changes when the balance is too small.
#[instrument(level = "debug", skip(conn))]
pub async fn collect(
    conn: &mut SqliteConnection,
    user_id: UserId,
    tax_type: &str,
    amount: i64,
    at: DateTime<Utc>,
) -> Result<bool, sqlx::Error> {
    let res = sqlx::query("UPDATE users SET currency = currency - ? WHERE user_id = ? AND currency >= ?")
        .bind(amount)
        .bind(uid(user_id))
        .bind(amount)
        .execute(&mut *conn)
        .await?;
    if res.rows_affected() == 0 {
        return Ok(false);
    }
    record_tax(&mut *conn, user_id, tax_type, amount, at).await?;
    Ok(true)
}

pub async fn history(
    pool: &DbPool,
    user_id: UserId,
    limit: i64,
) -> Result<Vec<TaxRecord>, sqlx::Error> {
    sqlx::query_as::<_, TaxRecord>(
        "SELECT tax_type, amount, collected_at FROM tax_history WHERE user_id = ? ORDER BY collected_at DESC, id DESC LIMIT ?",
    )
    .bind(uid(user_id))
    .bind(limit)
    .fetch_all(pool)
    .await
}

/// `(total collected, number of records)` across every user.
pub async fn totals(pool: &DbPool) -> Result<(i64, i64), sqlx::Error> {
    sqlx::query_as("SELECT COALESCE(SUM(amount), 0), COUNT(*) FROM tax_history")
        .fetch_one(pool)
        .await
}

pub async fn user_total(pool: &DbPool, user_id: UserId) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COALESCE(SUM(amount), 0) FROM tax_history WHERE user_id = ?")
        .bind(uid(user_id))
        .fetch_one(pool)
        .await
}

pub async fn top_payers(pool: &DbPool, limit: i64) -> Result<Vec<TaxPayer>, sqlx::Error> {
    sqlx::query_as::<_, TaxPayer>(
        r#"SELECT user_id, SUM(amount) AS total_paid, COUNT(*) AS payments FROM tax_history
        GROUP BY user_id ORDER BY total_paid DESC LIMIT ?"#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await
}

pub async fn last_forced_tax(pool: &DbPool) -> Result<Option<DateTime<Utc>>, sqlx::Error> {
    let stamp: Option<Option<DateTime<Utc>>> =
        sqlx::query_scalar("SELECT last_forced_tax FROM tax_system_stats WHERE id = 1")
            .fetch_optional(pool)
            .await?;
    Ok(stamp.flatten())
}

pub async fn set_last_forced_tax(pool: &DbPool, at: DateTime<Utc>) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"INSERT INTO tax_system_stats (id, last_forced_tax) VALUES (1, ?1)
        ON CONFLICT(id) DO UPDATE SET last_forced_tax = excluded.last_forced_tax"#,
    )
    .bind(at)
    .execute(pool)
    .await?;
    Ok(())
}
