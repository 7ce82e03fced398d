//! Contains all the data structures that map to database tables or query results.

use sqlx::types::chrono::{DateTime, Utc};

#[derive(sqlx::FromRow, Debug, Clone)]
pub struct Profile {
    pub user_id: i64,
    pub xp: i64,
    pub level: i64,
    pub currency: i64,
    pub gacha_rolls: i64,
    pub xp_2x: i64,
    pub xp_4x: i64,
    pub xp_8x: i64,
    pub xp_10x: i64,
    pub xp_20x: i64,
    pub next_xp_mult: f64,
    pub luck: i64,
    pub last_weekly_claim: Option<DateTime<Utc>>,
    pub last_kumpul_time: Option<DateTime<Utc>>,
}

#[derive(sqlx::FromRow, Debug, Clone)]
pub struct KumpulSession {
    pub message_id: i64,
    pub user_id: i64,
    pub channel_id: i64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub max_reactions: i64,
    pub status: String,
    pub last_xp_check_time: DateTime<Utc>,
}

#[derive(sqlx::FromRow, Debug, Clone, Default)]
pub struct FishingStats {
    pub total_fish_caught: i64,
    pub legendary_caught: i64,
    pub last_fish_time: Option<DateTime<Utc>>,
    pub last_daily_claim: Option<DateTime<Utc>>,
}

#[derive(sqlx::FromRow, Debug, Clone)]
pub struct FishStack {
    pub fish_name: String,
    pub amount: i64,
}

#[derive(sqlx::FromRow, Debug, Clone)]
pub struct FishingLeaderRow {
    pub user_id: i64,
    pub total_fish_caught: i64,
    pub unique_fish: i64,
}

#[derive(sqlx::FromRow, Debug, Clone, Default)]
pub struct JadeStats {
    pub total_spent: i64,
    pub total_won: i64,
    pub total_cuts: i64,
    pub total_wins: i64,
    pub total_losses: i64,
    pub total_jackpots: i64,
    pub last_cut_time: Option<DateTime<Utc>>,
}

#[derive(sqlx::FromRow, Debug, Clone)]
pub struct JadeLeaderRow {
    pub user_id: i64,
    pub total_spent: i64,
    pub total_won: i64,
    pub total_cuts: i64,
    pub total_wins: i64,
    pub total_jackpots: i64,
}

#[derive(sqlx::FromRow, Debug, Clone)]
pub struct Holding {
    pub crypto_symbol: String,
    pub amount: f64,
    pub avg_buy_price: f64,
}

#[derive(sqlx::FromRow, Debug, Clone)]
pub struct TradeRecord {
    pub trade_type: String,
    pub crypto_symbol: String,
    pub amount: f64,
    pub price: f64,
    pub total: f64,
    pub profit_loss: Option<f64>,
    pub timestamp: DateTime<Utc>,
}

#[derive(sqlx::FromRow, Debug, Clone)]
pub struct GlobalQuest {
    pub quest_id: String,
    pub quest_type: String,
    pub title: String,
    pub description: String,
    pub emoji: String,
    pub target_amount: i64,
    pub reward_currency: i64,
    pub reward_luck: i64,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub active: bool,
}

#[derive(sqlx::FromRow, Debug, Clone)]
pub struct QuestProgress {
    pub user_id: i64,
    pub current_progress: i64,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
}

/// A finished-but-unrewarded progress row joined with its quest rewards.
#[derive(sqlx::FromRow, Debug, Clone)]
pub struct PendingCompletion {
    pub quest_id: String,
    pub user_id: i64,
    pub title: String,
    pub emoji: String,
    pub reward_currency: i64,
    pub reward_luck: i64,
}

#[derive(sqlx::FromRow, Debug, Clone, Default)]
pub struct QuestStats {
    pub total_completed: i64,
    pub last_completed_at: Option<DateTime<Utc>>,
}

#[derive(sqlx::FromRow, Debug, Clone)]
pub struct UnlockedAchievement {
    pub achievement_id: String,
    pub unlocked_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow, Debug, Clone)]
pub struct TaxRecord {
    pub tax_type: String,
    pub amount: i64,
    pub collected_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow, Debug, Clone)]
pub struct TaxPayer {
    pub user_id: i64,
    pub total_paid: i64,
    pub payments: i64,
}

#[derive(sqlx::FromRow, Debug, Clone)]
pub struct ShopSlot {
    pub shop_id: String,
    pub item_key: String,
    pub price: i64,
    pub stock: i64,
    pub original_price: i64,
    pub is_special: bool,
}

#[derive(sqlx::FromRow, Debug, Clone)]
pub struct ShopPurchase {
    pub shop_id: String,
    pub item_key: String,
    pub price: i64,
    pub purchased_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow, Debug, Clone)]
pub struct LeaderboardEntry {
    pub user_id: i64,
    pub level: i64,
    pub currency: i64,
}
