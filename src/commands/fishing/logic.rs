//! Fishing rules: weighted species draw, catch tiers, market pricing, selling and upgrades.

use super::data::{FISH, Fish, Rarity, UpgradeKind};
use crate::commands::achievements::logic::{Achievement, Metric, check_achievement_progress};
use crate::commands::quests::logic::{QuestKind, update_quest_progress};
use crate::commands::tax::logic::{TaxKind, calculate_transaction_tax};
use crate::database::{self, DbPool};
use chrono::{DateTime, Utc};
use rand::Rng;
use serenity::model::id::UserId;
use std::collections::HashMap;
use std::ops::RangeInclusive;
use tracing::info;

/// Voice channel multipliers: more casts and bigger stacks.
pub const VOICE_CATCH_MULT: f64 = 2.5;
pub const VOICE_AMOUNT_MULT: f64 = 1.5;

/// Weight of a species after the rod bonus.
pub fn adjusted_weight(fish: &Fish, rod_level: i64) -> f64 {
    if fish.rarity.is_rare_plus() {
        fish.weight + rod_level as f64 * UpgradeKind::Rod.bonus_per_level()
    } else {
        fish.weight
    }
}

pub fn total_weight(rod_level: i64) -> f64 {
    FISH.iter().map(|f| adjusted_weight(f, rod_level)).sum()
}

/// Species at `roll` in `[0, total_weight]` on the cumulative scale.
pub fn fish_at(roll: f64, rod_level: i64) -> &'static Fish {
    let mut cumulative = 0.0;
    for fish in FISH {
        cumulative += adjusted_weight(fish, rod_level);
        if roll <= cumulative {
            return fish;
        }
    }
    &FISH[0]
}

pub fn pick_fish<R: Rng + ?Sized>(rng: &mut R, rod_level: i64) -> &'static Fish {
    let roll = rng.random_range(0.0..=total_weight(rod_level));
    fish_at(roll, rod_level)
}

/// `(casts, amount per cast)` ranges for a rod level.
pub fn catch_tier(rod_level: i64) -> (RangeInclusive<i64>, RangeInclusive<i64>) {
    match rod_level {
        0 => (1..=2, 1..=1),
        l if l < 10 => (1..=2, 1..=2),
        l if l < 25 => (2..=3, 1..=2),
        l if l < 50 => (2..=4, 1..=3),
        _ => (3..=5, 2..=4),
    }
}

/// Rolls one cast session. In voice the cast count and every stack are boosted,
/// and the net adds one extra stack of `net_level * 5`.
pub fn roll_haul<R: Rng + ?Sized>(
    rng: &mut R,
    rod_level: i64,
    net_level: i64,
    in_voice: bool,
) -> Vec<(&'static Fish, i64)> {
    let (casts, amounts) = catch_tier(rod_level);
    let mut count = rng.random_range(casts);
    if in_voice {
        count = (count as f64 * VOICE_CATCH_MULT).floor() as i64;
    }
    let mut haul = Vec::with_capacity(count as usize + 1);
    for _ in 0..count {
        let fish = pick_fish(rng, rod_level);
        let mut amount = rng.random_range(amounts.clone());
        if in_voice {
            amount = (amount as f64 * VOICE_AMOUNT_MULT).floor() as i64;
        }
        haul.push((fish, amount));
    }
    if in_voice && net_level > 0 {
        let fish = pick_fish(rng, rod_level);
        haul.push((fish, net_level * UpgradeKind::Net.bonus_per_level() as i64));
    }
    haul
}

/// Passive robot catch: `robot_level * 10` single draws, grouped by species.
pub fn roll_robot_catch<R: Rng + ?Sized>(
    rng: &mut R,
    robot_level: i64,
    rod_level: i64,
) -> Vec<(&'static Fish, i64)> {
    let total = robot_level * UpgradeKind::Robot.bonus_per_level() as i64;
    let mut grouped: Vec<(&'static Fish, i64)> = Vec::new();
    for _ in 0..total {
        let fish = pick_fish(rng, rod_level);
        match grouped.iter_mut().find(|(f, _)| f.name == fish.name) {
            Some((_, n)) => *n += 1,
            None => grouped.push((fish, 1)),
        }
    }
    grouped
}

/// Current market price per species, repriced every 15 minutes.
#[derive(Debug, Clone)]
pub struct FishMarket {
    pub prices: HashMap<&'static str, i64>,
    pub updated_at: DateTime<Utc>,
}

impl FishMarket {
    /// Every species at its base price.
    pub fn at_base(now: DateTime<Utc>) -> Self {
        Self {
            prices: FISH.iter().map(|f| (f.name, f.base_price)).collect(),
            updated_at: now,
        }
    }

    /// Each species moves to `floor(base * U(0.8, 1.2))`.
    pub fn reprice<R: Rng + ?Sized>(&mut self, rng: &mut R, now: DateTime<Utc>) {
        for fish in FISH {
            let factor = rng.random_range(0.8..=1.2);
            self.prices
                .insert(fish.name, (fish.base_price as f64 * factor).floor() as i64);
        }
        self.updated_at = now;
    }

    pub fn price_of(&self, name: &str) -> i64 {
        self.prices.get(name).copied().unwrap_or(0)
    }

    pub fn value_of(&self, stacks: &[(String, i64)]) -> i64 {
        stacks.iter().map(|(n, a)| self.price_of(n) * a).sum()
    }
}

#[derive(Debug)]
pub struct CatchOutcome {
    pub total_caught: i64,
    pub unlocked: Vec<&'static Achievement>,
}

/// Stores a haul, then feeds the quest and achievement counters.
pub async fn land_catch(
    pool: &DbPool,
    user_id: UserId,
    haul: &[(&'static Fish, i64)],
    at: DateTime<Utc>,
    stamp_cooldown: bool,
) -> Result<CatchOutcome, sqlx::Error> {
    let rows: Vec<(&str, i64)> = haul.iter().map(|(f, n)| (f.name, *n)).collect();
    let caught: i64 = haul.iter().map(|(_, n)| n).sum();
    let rare: i64 = haul
        .iter()
        .filter(|(f, _)| f.rarity.is_rare_plus())
        .map(|(_, n)| n)
        .sum();
    let legendary: i64 = haul
        .iter()
        .filter(|(f, _)| f.rarity == Rarity::Legendary)
        .map(|(_, n)| n)
        .sum();
    let totals =
        database::fishing::record_catches(pool, user_id, &rows, legendary, at, stamp_cooldown)
            .await?;
    let total_caught = totals.caught;
    info!(target: "fishing.catch", user = user_id.get(), caught, rare, legendary, "catch landed");

    update_quest_progress(pool, user_id, QuestKind::FishAny, caught).await;
    update_quest_progress(pool, user_id, QuestKind::FishRare, rare).await;

    let mut unlocked =
        check_achievement_progress(pool, user_id, Metric::FishCaught, total_caught).await?;
    if legendary > 0 {
        unlocked.extend(
            check_achievement_progress(pool, user_id, Metric::LegendaryFish, totals.legendary)
                .await?,
        );
    }
    Ok(CatchOutcome {
        total_caught,
        unlocked,
    })
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SaleReceipt {
    pub lines: Vec<(String, i64, i64)>,
    pub gross: i64,
    pub tax: i64,
    pub net: i64,
}

/// Builds a sale at market prices; the fish market fee is applied on the gross.
pub fn price_sale(market: &FishMarket, items: &[(String, i64)], level: i64) -> SaleReceipt {
    let lines: Vec<(String, i64, i64)> = items
        .iter()
        .map(|(name, amount)| (name.clone(), *amount, market.price_of(name) * amount))
        .collect();
    let gross = lines.iter().map(|(_, _, v)| v).sum();
    let (tax, net) = calculate_transaction_tax(gross, TaxKind::FishingSell, level);
    SaleReceipt {
        lines,
        gross,
        tax,
        net,
    }
}

/// Removes the fish and pays the seller in one transaction.
/// Returns `false` if the inventory changed underneath and the sale was rolled back.
pub async fn execute_sale(
    pool: &DbPool,
    user_id: UserId,
    receipt: &SaleReceipt,
) -> Result<bool, sqlx::Error> {
    let now = Utc::now();
    let mut tx = pool.begin().await?;
    for (name, amount, _) in &receipt.lines {
        if !database::fishing::remove_fish(&mut tx, user_id, name, *amount).await? {
            tx.rollback().await?;
            return Ok(false);
        }
    }
    database::users::add_currency(&mut *tx, user_id, receipt.net).await?;
    if receipt.tax > 0 {
        database::tax::record_tax(&mut *tx, user_id, TaxKind::FishingSell.as_str(), receipt.tax, now)
            .await?;
    }
    tx.commit().await?;
    info!(target: "fishing.sell", user = user_id.get(), gross = receipt.gross, tax = receipt.tax, "fish sold");
    Ok(true)
}

/// First inventory stack whose name contains `query` (case-insensitive).
pub fn match_stack<'a>(stacks: &'a [(String, i64)], query: &str) -> Option<&'a (String, i64)> {
    let query = query.to_lowercase();
    stacks
        .iter()
        .find(|(name, _)| name.to_lowercase().contains(&query))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpgradeOutcome {
    Upgraded { new_level: i64, cost: i64 },
    MaxLevel,
    Insufficient { cost: i64 },
}

/// Buys one level of an upgrade track.
pub async fn buy_upgrade(
    pool: &DbPool,
    user_id: UserId,
    kind: UpgradeKind,
) -> Result<UpgradeOutcome, sqlx::Error> {
    let level = database::fishing::upgrade_level(pool, user_id, kind.key()).await?;
    if level >= kind.max_level() {
        return Ok(UpgradeOutcome::MaxLevel);
    }
    let cost = kind.cost(level);
    let mut tx = pool.begin().await?;
    if !database::users::add_currency(&mut *tx, user_id, -cost).await? {
        tx.rollback().await?;
        return Ok(UpgradeOutcome::Insufficient { cost });
    }
    if !database::fishing::bump_upgrade(&mut *tx, user_id, kind.key(), level).await? {
        // Raced with another purchase; nothing was charged.
        tx.rollback().await?;
        return Ok(UpgradeOutcome::MaxLevel);
    }
    tx.commit().await?;
    Ok(UpgradeOutcome::Upgraded {
        new_level: level + 1,
        cost,
    })
}

/// Levels of all three tracks as `(rod, robot, net)`.
pub async fn upgrade_levels(pool: &DbPool, user_id: UserId) -> Result<(i64, i64, i64), sqlx::Error> {
    Ok((
        database::fishing::upgrade_level(pool, user_id, UpgradeKind::Rod.key()).await?,
        database::fishing::upgrade_level(pool, user_id, UpgradeKind::Robot.key()).await?,
        database::fishing::upgrade_level(pool, user_id, UpgradeKind::Net.key()).await?,
    ))
}

/// `fcompare` scoring: 1 for the higher value, 0.5 each on a tie.
pub fn compare_points(a: &[i64], b: &[i64]) -> (f64, f64) {
    a.iter().zip(b).fold((0.0, 0.0), |(pa, pb), (x, y)| match x.cmp(y) {
        std::cmp::Ordering::Greater => (pa + 1.0, pb),
        std::cmp::Ordering::Less => (pa, pb + 1.0),
        std::cmp::Ordering::Equal => (pa + 0.5, pb + 0.5),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FishBoard {
    Caught,
    Value,
    Unique,
}

impl FishBoard {
    pub fn parse(raw: Option<&str>) -> Option<Self> {
        match raw.map(str::to_lowercase).as_deref() {
            None | Some("caught") | Some("total") => Some(FishBoard::Caught),
            Some("value") | Some("worth") => Some(FishBoard::Value),
            Some("unique") | Some("species") => Some(FishBoard::Unique),
            _ => None,
        }
    }
}

/// Ranked `(user_id, caught, value, unique)` rows for the fishing leaderboard.
pub async fn leaderboard(
    pool: &DbPool,
    market: &FishMarket,
    board: FishBoard,
    limit: usize,
) -> Result<Vec<(i64, i64, i64, i64)>, sqlx::Error> {
    let rows = database::fishing::leader_rows(pool).await?;
    let stacks = database::fishing::all_stacks(pool).await?;
    let mut values: HashMap<i64, i64> = HashMap::new();
    for (user, name, amount) in &stacks {
        *values.entry(*user).or_default() += market.price_of(name) * amount;
    }
    let mut ranked: Vec<(i64, i64, i64, i64)> = rows
        .into_iter()
        .map(|r| {
            let value = values.get(&r.user_id).copied().unwrap_or(0);
            (r.user_id, r.total_fish_caught, value, r.unique_fish)
        })
        .collect();
    ranked.sort_by(|a, b| match board {
        FishBoard::Caught => b.1.cmp(&a.1),
        FishBoard::Value => b.2.cmp(&a.2),
        FishBoard::Unique => b.3.cmp(&a.3).then(b.1.cmp(&a.1)),
    });
    ranked.truncate(limit);
    Ok(ranked)
}
