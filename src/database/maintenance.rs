//! Offline maintenance used by the `db` subcommands: table verification and JSON backups.

use super::DbPool;
use super::init::table_columns;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::instrument;

/// Every table the bot owns, in creation order.
pub const TABLES: &[&str] = &[
    "users",
    "jade_stats",
    "fishing_stats",
    "fishing_inventory",
    "fishing_upgrades",
    "crypto_portfolio",
    "trade_history",
    "kumpul_tracking",
    "tax_history",
    "tax_system_stats",
    "global_quests",
    "quest_progress",
    "quest_stats",
    "user_achievements",
    "portfolio_tracking",
    "daily_shop",
    "shop_purchases",
    "active_buffs",
];

/// Tables holding player state; these go into backups.
pub const BACKUP_TABLES: &[&str] = &[
    "users",
    "jade_stats",
    "fishing_stats",
    "fishing_inventory",
    "fishing_upgrades",
    "crypto_portfolio",
    "quest_stats",
    "user_achievements",
    "portfolio_tracking",
];

#[derive(Debug, Clone, Serialize)]
pub struct TableReport {
    pub table: &'static str,
    pub columns: Vec<String>,
    pub rows: i64,
}

/// Column list and row count of every table. A missing table shows up with no columns.
#[instrument(level = "info", skip(pool))]
pub async fn verify(pool: &DbPool) -> Result<Vec<TableReport>, sqlx::Error> {
    let mut reports = Vec::with_capacity(TABLES.len());
    for table in TABLES {
        let columns = table_columns(pool, table).await?;
        let rows = if columns.is_empty() {
            0
        } else {
            sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
                .fetch_one(pool)
                .await?
        };
        reports.push(TableReport {
            table,
            columns,
            rows,
        });
    }
    Ok(reports)
}

/// Dumps `BACKUP_TABLES` into one JSON object: `{ table: [ {column: value, ..}, .. ] }`.
#[instrument(level = "info", skip(pool))]
pub async fn backup(pool: &DbPool) -> Result<Value, sqlx::Error> {
    let mut out = Map::new();
    for table in BACKUP_TABLES {
        let columns = table_columns(pool, table).await?;
        if columns.is_empty() {
            continue;
        }
        let pairs = columns
            .iter()
            .map(|c| format!("'{c}', {c}"))
            .collect::<Vec<_>>()
            .join(", ");
        let rows: Vec<String> = sqlx::query_scalar(&format!(
            "SELECT json_object({pairs}) FROM {table}"
        ))
        .fetch_all(pool)
        .await?;
        let values = rows
            .iter()
            .map(|raw| serde_json::from_str::<Value>(raw).map_err(|e| sqlx::Error::Decode(Box::new(e))))
            .collect::<Result<Vec<_>, _>>()?;
        out.insert((*table).to_string(), Value::Array(values));
    }
    Ok(Value::Object(out))
}
