//! Database functions for the rotating daily shop, purchases and timed buffs.

use super::DbPool;
use super::models::{ShopPurchase, ShopSlot};
use super::users::uid;
use chrono::{DateTime, Utc};
use serenity::model::id::UserId;
use sqlx::{Executor, Sqlite, SqliteConnection};
use tracing::instrument;

pub async fn shop_exists(pool: &DbPool, shop_id: &str) -> Result<bool, sqlx::Error> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM daily_shop WHERE shop_id = ?")
        .bind(shop_id)
        .fetch_one(pool)
        .await?;
    Ok(count > 0)
}

/// Replaces the slots of `shop_id` and deletes every shop older than `oldest_kept`.
/// Shop ids are `YYYYMMDD`, so they order lexically by date.
#[instrument(level = "debug", skip(pool, slots))]
pub async fn store_shop(
    pool: &DbPool,
    shop_id: &str,
    slots: &[ShopSlot],
    oldest_kept: &str,
) -> Result<u64, sqlx::Error> {
    let mut tx = pool.begin().await?;
    sqlx::query("DELETE FROM daily_shop WHERE shop_id = ?")
        .bind(shop_id)
        .execute(&mut *tx)
        .await?;
    for slot in slots {
        sqlx::query(
            "INSERT INTO daily_shop (shop_id, item_key, price, stock, original_price, is_special) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(shop_id)
        .bind(&slot.item_key)
        .bind(slot.price)
        .bind(slot.stock)
        .bind(slot.original_price)
        .bind(slot.is_special)
        .execute(&mut *tx)
        .await?;
    }
    let purged = sqlx::query("DELETE FROM daily_shop WHERE shop_id < ?")
        .bind(oldest_kept)
        .execute(&mut *tx)
        .await?
        .rows_affected();
    tx.commit().await?;
    Ok(purged)
}

pub async fn slots(pool: &DbPool, shop_id: &str) -> Result<Vec<ShopSlot>, sqlx::Error> {
    sqlx::query_as::<_, ShopSlot>(
        "SELECT shop_id, item_key, price, stock, original_price, is_special FROM daily_shop WHERE shop_id = ? ORDER BY is_special DESC, price ASC",
    )
    .bind(shop_id)
    .fetch_all(pool)
    .await
}

/// Decrements stock by one. Returns `false` when the slot is sold out.
pub async fn take_stock(
    conn: &mut SqliteConnection,
    shop_id: &str,
    item_key: &str,
) -> Result<bool, sqlx::Error> {
    let res = sqlx::query(
        "UPDATE daily_shop SET stock = stock - 1 WHERE shop_id = ? AND item_key = ? AND stock > 0",
    )
    .bind(shop_id)
    .bind(item_key)
    .execute(conn)
    .await?;
    Ok(res.rows_affected() == 1)
}

pub async fn record_purchase<'e, E>(
    exec: E,
    user_id: UserId,
    shop_id: &str,
    item_key: &str,
    price: i64,
    at: DateTime<Utc>,
) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        "INSERT INTO shop_purchases (user_id, shop_id, item_key, price, purchased_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(uid(user_id))
    .bind(shop_id)
    .bind(item_key)
    .bind(price)
    .bind(at)
    .execute(exec)
    .await?;
    Ok(())
}

pub async fn purchases(
    pool: &DbPool,
    user_id: UserId,
    limit: i64,
) -> Result<Vec<ShopPurchase>, sqlx::Error> {
    sqlx::query_as::<_, ShopPurchase>(
        "SELECT shop_id, item_key, price, purchased_at FROM shop_purchases WHERE user_id = ? ORDER BY purchased_at DESC, id DESC LIMIT ?",
    )
    .bind(uid(user_id))
    .bind(limit)
    .fetch_all(pool)
    .await
}

/// Starts (or extends) a timed buff.
pub async fn grant_buff<'e, E>(
    exec: E,
    user_id: UserId,
    buff_type: &str,
    expires_at: DateTime<Utc>,
) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"INSERT INTO active_buffs (user_id, buff_type, expires_at) VALUES (?, ?, ?)
        ON CONFLICT(user_id, buff_type) DO UPDATE SET expires_at = excluded.expires_at"#,
    )
    .bind(uid(user_id))
    .bind(buff_type)
    .bind(expires_at)
    .execute(exec)
    .await?;
    Ok(())
}

pub async fn buff_active(
    pool: &DbPool,
    user_id: UserId,
    buff_type: &str,
    now: DateTime<Utc>,
) -> Result<bool, sqlx::Error> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM active_buffs WHERE user_id = ? AND buff_type = ? AND expires_at > ?",
    )
    .bind(uid(user_id))
    .bind(buff_type)
    .bind(now)
    .fetch_one(pool)
    .await?;
    Ok(count > 0)
}
