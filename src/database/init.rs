//! Pool creation and idempotent schema setup for the SQLite store.

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Row, Sqlite};
use std::str::FromStr;
use tracing::{info, instrument};

/// A type alias for the database connection pool (`Pool<Sqlite>`).
pub type DbPool = Pool<Sqlite>;

/// Opens a pool, creating the database file when it does not exist yet.
/// In-memory URLs must use `max_connections = 1`, every connection gets its own database.
pub async fn connect(url: &str, max_connections: u32) -> Result<DbPool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(url)?
        .create_if_missing(true)
        .foreign_keys(true);
    SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await
}

const SCHEMA: &[&str] = &[
    r#"CREATE TABLE IF NOT EXISTS users (
        user_id INTEGER PRIMARY KEY,
        xp INTEGER NOT NULL DEFAULT 0,
        level INTEGER NOT NULL DEFAULT 1,
        currency INTEGER NOT NULL DEFAULT 0,
        gacha_rolls INTEGER NOT NULL DEFAULT 0,
        xp_2x INTEGER NOT NULL DEFAULT 0,
        xp_4x INTEGER NOT NULL DEFAULT 0,
        xp_8x INTEGER NOT NULL DEFAULT 0,
        xp_10x INTEGER NOT NULL DEFAULT 0,
        xp_20x INTEGER NOT NULL DEFAULT 0,
        next_xp_mult REAL NOT NULL DEFAULT 1.0,
        luck INTEGER NOT NULL DEFAULT 0,
        last_weekly_claim TEXT DEFAULT NULL,
        last_kumpul_time TEXT DEFAULT NULL
    )"#,
    r#"CREATE TABLE IF NOT EXISTS jade_stats (
        user_id INTEGER PRIMARY KEY,
        total_spent INTEGER NOT NULL DEFAULT 0,
        total_won INTEGER NOT NULL DEFAULT 0,
        total_cuts INTEGER NOT NULL DEFAULT 0,
        last_cut_time TEXT
    )"#,
    r#"CREATE TABLE IF NOT EXISTS fishing_stats (
        user_id INTEGER PRIMARY KEY,
        total_fish_caught INTEGER NOT NULL DEFAULT 0,
        legendary_caught INTEGER NOT NULL DEFAULT 0,
        last_fish_time TEXT,
        last_daily_claim TEXT
    )"#,
    r#"CREATE TABLE IF NOT EXISTS fishing_inventory (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL,
        fish_name TEXT NOT NULL,
        amount INTEGER NOT NULL DEFAULT 0,
        UNIQUE(user_id, fish_name)
    )"#,
    r#"CREATE TABLE IF NOT EXISTS fishing_upgrades (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL,
        upgrade_type TEXT NOT NULL,
        level INTEGER NOT NULL DEFAULT 0,
        UNIQUE(user_id, upgrade_type)
    )"#,
    r#"CREATE TABLE IF NOT EXISTS crypto_portfolio (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL,
        crypto_symbol TEXT NOT NULL,
        amount REAL NOT NULL,
        avg_buy_price REAL NOT NULL,
        UNIQUE(user_id, crypto_symbol)
    )"#,
    r#"CREATE TABLE IF NOT EXISTS trade_history (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL,
        trade_type TEXT NOT NULL,
        crypto_symbol TEXT NOT NULL,
        amount REAL NOT NULL,
        price REAL NOT NULL,
        total REAL NOT NULL,
        profit_loss REAL,
        timestamp TEXT NOT NULL
    )"#,
    r#"CREATE TABLE IF NOT EXISTS kumpul_tracking (
        message_id INTEGER PRIMARY KEY,
        user_id INTEGER NOT NULL,
        channel_id INTEGER NOT NULL,
        start_time TEXT NOT NULL,
        end_time TEXT NOT NULL,
        max_reactions INTEGER NOT NULL DEFAULT 0,
        status TEXT NOT NULL DEFAULT 'active',
        last_xp_check_time TEXT NOT NULL
    )"#,
    r#"CREATE TABLE IF NOT EXISTS tax_history (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL,
        tax_type TEXT NOT NULL,
        amount INTEGER NOT NULL,
        collected_at TEXT NOT NULL
    )"#,
    r#"CREATE TABLE IF NOT EXISTS tax_system_stats (
        id INTEGER PRIMARY KEY DEFAULT 1,
        last_forced_tax TEXT DEFAULT NULL
    )"#,
    "INSERT OR IGNORE INTO tax_system_stats (id) VALUES (1)",
    r#"CREATE TABLE IF NOT EXISTS global_quests (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        quest_id TEXT UNIQUE NOT NULL,
        quest_type TEXT NOT NULL,
        title TEXT NOT NULL,
        description TEXT NOT NULL,
        emoji TEXT NOT NULL DEFAULT '📋',
        target_amount INTEGER NOT NULL,
        reward_currency INTEGER NOT NULL,
        reward_luck INTEGER NOT NULL,
        created_at TEXT NOT NULL,
        expires_at TEXT NOT NULL,
        active BOOLEAN NOT NULL DEFAULT 1
    )"#,
    r#"CREATE TABLE IF NOT EXISTS quest_progress (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        quest_id TEXT NOT NULL,
        user_id INTEGER NOT NULL,
        current_progress INTEGER NOT NULL DEFAULT 0,
        completed BOOLEAN NOT NULL DEFAULT 0,
        completed_at TEXT,
        last_updated TEXT NOT NULL,
        UNIQUE(quest_id, user_id)
    )"#,
    r#"CREATE TABLE IF NOT EXISTS quest_stats (
        user_id INTEGER PRIMARY KEY,
        total_completed INTEGER NOT NULL DEFAULT 0,
        last_completed_at TEXT
    )"#,
    r#"CREATE TABLE IF NOT EXISTS user_achievements (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL,
        achievement_id TEXT NOT NULL,
        unlocked_at TEXT NOT NULL,
        unlocked BOOLEAN NOT NULL DEFAULT 0,
        UNIQUE(user_id, achievement_id)
    )"#,
    r#"CREATE TABLE IF NOT EXISTS portfolio_tracking (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL,
        portfolio_count INTEGER NOT NULL DEFAULT 0,
        UNIQUE(user_id)
    )"#,
    r#"CREATE TABLE IF NOT EXISTS daily_shop (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        shop_id TEXT NOT NULL,
        item_key TEXT NOT NULL,
        price INTEGER NOT NULL,
        stock INTEGER NOT NULL,
        original_price INTEGER NOT NULL,
        is_special BOOLEAN NOT NULL DEFAULT 0,
        UNIQUE(shop_id, item_key)
    )"#,
    r#"CREATE TABLE IF NOT EXISTS shop_purchases (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL,
        shop_id TEXT NOT NULL,
        item_key TEXT NOT NULL,
        price INTEGER NOT NULL,
        purchased_at TEXT NOT NULL
    )"#,
    r#"CREATE TABLE IF NOT EXISTS active_buffs (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL,
        buff_type TEXT NOT NULL,
        expires_at TEXT NOT NULL,
        UNIQUE(user_id, buff_type)
    )"#,
    "CREATE INDEX IF NOT EXISTS idx_fishing_inventory_user ON fishing_inventory(user_id)",
    "CREATE INDEX IF NOT EXISTS idx_fishing_upgrades_user ON fishing_upgrades(user_id)",
    "CREATE INDEX IF NOT EXISTS idx_user_crypto ON crypto_portfolio(user_id, crypto_symbol)",
    "CREATE INDEX IF NOT EXISTS idx_trade_history_user ON trade_history(user_id, timestamp)",
    "CREATE INDEX IF NOT EXISTS idx_quest_progress_user ON quest_progress(user_id, quest_id)",
    "CREATE INDEX IF NOT EXISTS idx_global_quest_active ON global_quests(active, expires_at)",
    "CREATE INDEX IF NOT EXISTS idx_daily_shop_id ON daily_shop(shop_id, stock)",
    "CREATE INDEX IF NOT EXISTS idx_tax_history_user ON tax_history(user_id, collected_at)",
];

/// Columns added to `jade_stats` after the first release; older databases lack them.
const JADE_STATS_LATE_COLUMNS: &[&str] = &["total_wins", "total_losses", "total_jackpots"];
const FISHING_STATS_LATE_COLUMNS: &[&str] = &["legendary_caught"];

/// Creates every table and index if missing, then runs column migrations.
#[instrument(level = "info", skip(pool))]
pub async fn create_schema(pool: &DbPool) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;
    for statement in SCHEMA {
        sqlx::query(statement).execute(&mut *tx).await?;
    }
    tx.commit().await?;
    let mut added = migrate_jade_stats(pool).await?;
    added.extend(add_missing_columns(pool, "fishing_stats", FISHING_STATS_LATE_COLUMNS).await?);
    info!(target: "database.init", added_columns = ?added, "schema ready");
    Ok(())
}

/// Adds any missing late `jade_stats` columns. Returns the names of the columns it added.
#[instrument(level = "debug", skip(pool))]
pub async fn migrate_jade_stats(pool: &DbPool) -> Result<Vec<&'static str>, sqlx::Error> {
    add_missing_columns(pool, "jade_stats", JADE_STATS_LATE_COLUMNS).await
}

async fn add_missing_columns(
    pool: &DbPool,
    table: &str,
    columns: &[&'static str],
) -> Result<Vec<&'static str>, sqlx::Error> {
    let existing = table_columns(pool, table).await?;
    let mut added = Vec::new();
    for column in columns {
        if !existing.iter().any(|c| c == column) {
            sqlx::query(&format!(
                "ALTER TABLE {table} ADD COLUMN {column} INTEGER NOT NULL DEFAULT 0"
            ))
            .execute(pool)
            .await?;
            added.push(*column);
        }
    }
    Ok(added)
}

/// Column names of a table via `PRAGMA table_info`. `table` must be a trusted identifier.
pub async fn table_columns(pool: &DbPool, table: &str) -> Result<Vec<String>, sqlx::Error> {
    let rows = sqlx::query(&format!("PRAGMA table_info({table})"))
        .fetch_all(pool)
        .await?;
    rows.iter().map(|row| row.try_get::<String, _>("name")).collect()
}
