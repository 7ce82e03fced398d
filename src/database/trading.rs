//! Contains all database functions for the crypto portfolio and trade history.

use super::DbPool;
use super::models::{Holding, TradeRecord};
use super::users::uid;
use crate::constants::DUST_THRESHOLD;
use chrono::{DateTime, Utc};
use serenity::model::id::UserId;
use sqlx::{Executor, Sqlite, SqliteConnection};
use tracing::instrument;

pub async fn holding<'e, E>(
    exec: E,
    user_id: UserId,
    symbol: &str,
) -> Result<Option<Holding>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, Holding>(
        "SELECT crypto_symbol, amount, avg_buy_price FROM crypto_portfolio WHERE user_id = ? AND crypto_symbol = ?",
    )
    .bind(uid(user_id))
    .bind(symbol)
    .fetch_optional(exec)
    .await
}

pub async fn holdings(pool: &DbPool, user_id: UserId) -> Result<Vec<Holding>, sqlx::Error> {
    sqlx::query_as::<_, Holding>(
        "SELECT crypto_symbol, amount, avg_buy_price FROM crypto_portfolio WHERE user_id = ? AND amount > 0 ORDER BY crypto_symbol",
    )
    .bind(uid(user_id))
    .fetch_all(pool)
    .await
}

/// Adds to a position, folding the fill into the weighted average buy price.
#[instrument(level = "debug", skip(exec))]
pub async fn add_to_position<'e, E>(
    exec: E,
    user_id: UserId,
    symbol: &str,
    amount: f64,
    price: f64,
) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"INSERT INTO crypto_portfolio (user_id, crypto_symbol, amount, avg_buy_price) VALUES (?, ?, ?, ?)
        ON CONFLICT(user_id, crypto_symbol) DO UPDATE SET
            avg_buy_price = (amount * avg_buy_price + excluded.amount * excluded.avg_buy_price) / (amount + excluded.amount),
            amount = amount + excluded.amount"#,
    )
    .bind(uid(user_id))
    .bind(symbol)
    .bind(amount)
    .bind(price)
    .execute(exec)
    .await?;
    Ok(())
}

/// Removes `amount` from a position and drops the row once only dust is left.
#[instrument(level = "debug", skip(conn))]
pub async fn reduce_position(
    conn: &mut SqliteConnection,
    user_id: UserId,
    symbol: &str,
    amount: f64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE crypto_portfolio SET amount = amount - ? WHERE user_id = ? AND crypto_symbol = ?",
    )
    .bind(amount)
    .bind(uid(user_id))
    .bind(symbol)
    .execute(&mut *conn)
    .await?;
    sqlx::query("DELETE FROM crypto_portfolio WHERE user_id = ? AND crypto_symbol = ? AND amount <= ?")
        .bind(uid(user_id))
        .bind(symbol)
        .bind(DUST_THRESHOLD)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub async fn record_trade<'e, E>(
    exec: E,
    user_id: UserId,
    trade_type: &str,
    symbol: &str,
    amount: f64,
    price: f64,
    total: f64,
    profit_loss: Option<f64>,
    at: DateTime<Utc>,
) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        "INSERT INTO trade_history (user_id, trade_type, crypto_symbol, amount, price, total, profit_loss, timestamp) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(uid(user_id))
    .bind(trade_type)
    .bind(symbol)
    .bind(amount)
    .bind(price)
    .bind(total)
    .bind(profit_loss)
    .bind(at)
    .execute(exec)
    .await?;
    Ok(())
}

/// Most recent trades first.
pub async fn recent_trades(
    pool: &DbPool,
    user_id: UserId,
    limit: i64,
) -> Result<Vec<TradeRecord>, sqlx::Error> {
    sqlx::query_as::<_, TradeRecord>(
        "SELECT trade_type, crypto_symbol, amount, price, total, profit_loss, timestamp FROM trade_history WHERE user_id = ? ORDER BY timestamp DESC, id DESC LIMIT ?",
    )
    .bind(uid(user_id))
    .bind(limit)
    .fetch_all(pool)
    .await
}

/// Sum of realised profit and loss over every sell.
pub async fn realized_profit<'e, E>(exec: E, user_id: UserId) -> Result<f64, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_scalar(
        "SELECT COALESCE(SUM(profit_loss), 0.0) FROM trade_history WHERE user_id = ? AND trade_type = 'sell'",
    )
    .bind(uid(user_id))
    .fetch_one(exec)
    .await
}

/// Every user with at least one open position, with their cash balance.
pub async fn traders(pool: &DbPool) -> Result<Vec<(i64, i64)>, sqlx::Error> {
    sqlx::query_as(
        r#"SELECT u.user_id, u.currency FROM users u
        WHERE EXISTS (SELECT 1 FROM crypto_portfolio p WHERE p.user_id = u.user_id AND p.amount > 0)"#,
    )
    .fetch_all(pool)
    .await
}

/// All open positions of every user, for valuing them in one pass.
pub async fn all_positions(pool: &DbPool) -> Result<Vec<(i64, String, f64)>, sqlx::Error> {
    sqlx::query_as("SELECT user_id, crypto_symbol, amount FROM crypto_portfolio WHERE amount > 0")
        .fetch_all(pool)
        .await
}
