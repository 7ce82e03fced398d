//! Jade stone tiers, the reward roll and settling a cut.

use crate::commands::achievements::logic::{Achievement, Metric, check_achievement_progress};
use crate::commands::quests::logic::{QuestKind, update_quest_progress};
use crate::commands::tax::logic::{TaxKind, calculate_transaction_tax};
use crate::database::models::JadeStats;
use crate::database::{self, DbPool};
use chrono::Utc;
use rand::Rng;
use serenity::model::id::UserId;
use tracing::info;

pub const JACKPOT_CHANCE: f64 = 0.0005;
pub const MIN_LOSS_CHANCE: f64 = 0.1;
pub const MAX_JADE_LUCK: f64 = 0.2;
/// Jackpot stones at or above this price are announced publicly.
pub const ANNOUNCE_MIN_PRICE: i64 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JadeRarity {
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
}

#[derive(Debug)]
pub struct JadeTier {
    pub key: &'static str,
    pub rarity: JadeRarity,
    pub name: &'static str,
    pub emoji: &'static str,
    pub color: u32,
    pub price: i64,
    pub max_multi: f64,
    pub jackpot_multi: f64,
    pub loss_chance: f64,
}

impl JadeTier {
    pub fn is_rare_plus(&self) -> bool {
        matches!(
            self.rarity,
            JadeRarity::Rare | JadeRarity::Epic | JadeRarity::Legendary
        )
    }

    /// Loss chance after luck, never below 10%.
    pub fn adjusted_loss(&self, luck: f64) -> f64 {
        (self.loss_chance - luck).max(MIN_LOSS_CHANCE)
    }

    pub fn adjusted_jackpot(&self, luck: f64) -> f64 {
        JACKPOT_CHANCE + luck * 0.5
    }

    pub fn win_chance(&self, luck: f64) -> f64 {
        (1.0 - self.adjusted_loss(luck) - self.adjusted_jackpot(luck)).max(0.0)
    }
}

pub const JADE_TIERS: &[JadeTier] = &[
    JadeTier {
        key: "common",
        rarity: JadeRarity::Common,
        name: "Batu Lumpur",
        emoji: "🪨",
        color: 0x8B4513,
        price: 100,
        max_multi: 2.0,
        jackpot_multi: 10.0,
        loss_chance: 0.60,
    },
    JadeTier {
        key: "uncommon",
        rarity: JadeRarity::Uncommon,
        name: "Batu Pasir",
        emoji: "🗿",
        color: 0xD2691E,
        price: 1_000,
        max_multi: 2.5,
        jackpot_multi: 15.0,
        loss_chance: 0.65,
    },
    JadeTier {
        key: "rare",
        rarity: JadeRarity::Rare,
        name: "Batu Giok",
        emoji: "💎",
        color: 0x50C878,
        price: 10_000,
        max_multi: 3.0,
        jackpot_multi: 25.0,
        loss_chance: 0.70,
    },
    JadeTier {
        key: "epic",
        rarity: JadeRarity::Epic,
        name: "Batu Jade",
        emoji: "💠",
        color: 0x00CED1,
        price: 100_000,
        max_multi: 4.0,
        jackpot_multi: 50.0,
        loss_chance: 0.80,
    },
    JadeTier {
        key: "legendary",
        rarity: JadeRarity::Legendary,
        name: "Batu Imperial",
        emoji: "🔮",
        color: 0xFF1493,
        price: 1_000_000,
        max_multi: 5.0,
        jackpot_multi: 100.0,
        loss_chance: 0.90,
    },
];

/// First tier whose name or key contains `query` (`giok`, `imperial`, `rare`...).
pub fn find_tier(query: &str) -> Option<&'static JadeTier> {
    let query = query.to_lowercase();
    JADE_TIERS
        .iter()
        .find(|t| t.name.to_lowercase().contains(&query) || t.key.contains(&query))
}

/// Luck as a probability shift: 0.1% per point, capped at 20%.
pub fn jade_luck(total_luck: i64) -> f64 {
    (total_luck.max(0) as f64 * 0.001).min(MAX_JADE_LUCK)
}

pub fn risk_label(loss_chance: f64) -> &'static str {
    if loss_chance >= 0.85 {
        "🔴 EXTREME"
    } else if loss_chance >= 0.75 {
        "🟠 VERY HIGH"
    } else if loss_chance >= 0.65 {
        "🟡 HIGH"
    } else {
        "🟢 MODERATE"
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CutResult {
    pub reward: i64,
    pub multiplier: f64,
    pub jackpot: bool,
}

impl CutResult {
    pub fn profit(&self, price: i64) -> i64 {
        self.reward - price
    }

    pub fn is_win(&self, price: i64) -> bool {
        self.reward > price
    }
}

/// Resolves a cut from `roll` in `[0, 1)` and `u` in `[0, 1]`, which picks the multiplier
/// inside the loss or win band.
pub fn calculate_reward(tier: &JadeTier, luck: f64, roll: f64, u: f64) -> CutResult {
    let jackpot = tier.adjusted_jackpot(luck);
    let loss = tier.adjusted_loss(luck);
    let (multiplier, is_jackpot) = if roll < jackpot {
        (tier.jackpot_multi, true)
    } else if roll < jackpot + loss {
        (u * 0.95, false)
    } else {
        (1.05 + u * (tier.max_multi - 1.05), false)
    };
    CutResult {
        reward: (tier.price as f64 * multiplier).floor() as i64,
        multiplier,
        jackpot: is_jackpot,
    }
}

pub fn roll_cut<R: Rng + ?Sized>(rng: &mut R, tier: &JadeTier, luck: f64) -> CutResult {
    let roll = rng.random::<f64>();
    let u = rng.random::<f64>();
    calculate_reward(tier, luck, roll, u)
}

#[derive(Debug)]
pub struct SettledCut {
    pub result: CutResult,
    pub tax: i64,
    pub payout: i64,
    pub stats: JadeStats,
    pub unlocked: Vec<&'static Achievement>,
}

/// Pays out a cut (minus the jade tax), stores the stats and feeds quests and achievements.
/// The stone's price has already been debited.
pub async fn settle_cut(
    pool: &DbPool,
    user_id: UserId,
    tier: &'static JadeTier,
    result: CutResult,
    level: i64,
) -> Result<SettledCut, sqlx::Error> {
    let now = Utc::now();
    let (tax, payout) = calculate_transaction_tax(result.reward, TaxKind::JadeCut, level);

    let mut tx = pool.begin().await?;
    if payout > 0 {
        database::users::add_currency(&mut *tx, user_id, payout).await?;
    }
    if tax > 0 {
        database::tax::record_tax(&mut *tx, user_id, TaxKind::JadeCut.as_str(), tax, now).await?;
    }
    let stats = database::jade::record_cut(
        &mut *tx,
        user_id,
        tier.price,
        result.reward,
        result.jackpot,
        now,
    )
    .await?;
    tx.commit().await?;
    info!(
        target: "jade.cut",
        user = user_id.get(),
        stone = tier.key,
        reward = result.reward,
        jackpot = result.jackpot,
        "jade cut"
    );

    if tier.is_rare_plus() {
        update_quest_progress(pool, user_id, QuestKind::JadeCut, 1).await;
    }
    let mut unlocked =
        check_achievement_progress(pool, user_id, Metric::JadeCuts, stats.total_cuts).await?;
    if result.jackpot {
        unlocked.extend(
            check_achievement_progress(pool, user_id, Metric::JadeJackpots, stats.total_jackpots)
                .await?,
        );
    }
    Ok(SettledCut {
        result,
        tax,
        payout,
        stats,
        unlocked,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JadeBoard {
    Profit,
    Spent,
    Won,
    Cuts,
    Jackpots,
    WinRate,
}

impl JadeBoard {
    /// Unknown sort keys fall back to profit.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::to_lowercase).as_deref() {
            Some("spent") => JadeBoard::Spent,
            Some("won") => JadeBoard::Won,
            Some("cuts") => JadeBoard::Cuts,
            Some("jackpots") | Some("jackpot") => JadeBoard::Jackpots,
            Some("winrate") => JadeBoard::WinRate,
            _ => JadeBoard::Profit,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            JadeBoard::Profit => "📈 Profit",
            JadeBoard::Spent => "💸 Total Spent",
            JadeBoard::Won => "💎 Total Won",
            JadeBoard::Cuts => "🪨 Total Cuts",
            JadeBoard::Jackpots => "🎰 Jackpots",
            JadeBoard::WinRate => "📈 Win Rate",
        }
    }
}

pub fn win_rate(wins: i64, cuts: i64) -> f64 {
    if cuts > 0 {
        wins as f64 / cuts as f64 * 100.0
    } else {
        0.0
    }
}

pub async fn leaderboard(
    pool: &DbPool,
    board: JadeBoard,
    limit: usize,
) -> Result<Vec<database::models::JadeLeaderRow>, sqlx::Error> {
    let mut rows = database::jade::leader_rows(pool).await?;
    if board == JadeBoard::WinRate {
        rows.retain(|r| r.total_cuts > 0);
    }
    rows.sort_by(|a, b| match board {
        JadeBoard::Profit => (b.total_won - b.total_spent).cmp(&(a.total_won - a.total_spent)),
        JadeBoard::Spent => b.total_spent.cmp(&a.total_spent),
        JadeBoard::Won => b.total_won.cmp(&a.total_won),
        JadeBoard::Cuts => b.total_cuts.cmp(&a.total_cuts),
        JadeBoard::Jackpots => b.total_jackpots.cmp(&a.total_jackpots),
        JadeBoard::WinRate => win_rate(b.total_wins, b.total_cuts)
            .total_cmp(&win_rate(a.total_wins, a.total_cuts)),
    });
    rows.truncate(limit);
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_lookup_matches_name_or_key() {
        assert_eq!(find_tier("giok").map(|t| t.price), Some(10_000));
        assert_eq!(find_tier("IMPERIAL").map(|t| t.key), Some("legendary"));
        assert_eq!(find_tier("uncommon").map(|t| t.name), Some("Batu Pasir"));
        assert!(find_tier("diamond").is_none());
    }

    #[test]
    fn luck_lowers_loss_down_to_the_floor() {
        let imperial = &JADE_TIERS[4];
        assert!((imperial.adjusted_loss(0.2) - 0.7).abs() < 1e-9);
        let lumpur = &JADE_TIERS[0];
        assert_eq!(lumpur.adjusted_loss(0.6), MIN_LOSS_CHANCE);
    }
}
