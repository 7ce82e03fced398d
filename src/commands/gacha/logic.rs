//! The gacha prize table and the luck-adjusted draw.

use crate::commands::achievements::logic::total_luck;
use crate::commands::economy::item::BoosterItem;
use crate::commands::quests::logic::{QuestKind, update_quest_progress};
use crate::database::{self, DbPool};
use rand::Rng;
use serenity::model::id::UserId;
use tracing::info;

/// Each point of luck moves 0.1% of probability onto the rare tiers, up to 10%.
pub const LUCK_STEP: f64 = 0.001;
pub const MAX_LUCK_BONUS: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prize {
    Item(BoosterItem),
    Currency(i64),
}

#[derive(Debug)]
pub struct Tier {
    pub prize: Prize,
    pub rate: f64,
    pub label: &'static str,
    pub emoji: &'static str,
}

/// Rare tiers in scan order. The common prize takes whatever probability is left.
pub const RARE_TIERS: &[Tier] = &[
    Tier { prize: Prize::Item(BoosterItem::X20), rate: 0.0001, label: "20x XP (Divine)", emoji: "🔥" },
    Tier { prize: Prize::Item(BoosterItem::X10), rate: 0.0004, label: "10x XP (Mythic)", emoji: "💫" },
    Tier { prize: Prize::Item(BoosterItem::X8), rate: 0.001, label: "8x XP (Epic)", emoji: "🌈" },
    Tier { prize: Prize::Currency(100_000), rate: 0.005, label: "Rp 100,000 (Legendary)", emoji: "🌟" },
    Tier { prize: Prize::Item(BoosterItem::X4), rate: 0.0145, label: "4x XP (Super Rare)", emoji: "💎" },
    Tier { prize: Prize::Item(BoosterItem::X2), rate: 0.08, label: "2x XP (Rare)", emoji: "✨" },
];

pub const COMMON: Tier = Tier {
    prize: Prize::Currency(10_000),
    rate: 0.899,
    label: "Rp 10,000 (Common)",
    emoji: "🎁",
};

pub fn luck_bonus(luck: i64) -> f64 {
    (luck.max(0) as f64 * LUCK_STEP).min(MAX_LUCK_BONUS)
}

fn rare_base_total() -> f64 {
    RARE_TIERS.iter().map(|t| t.rate).sum()
}

/// A rare tier's probability after its proportional share of the luck bonus.
pub fn adjusted_rate(tier: &Tier, luck: i64) -> f64 {
    tier.rate + luck_bonus(luck) * (tier.rate / rare_base_total())
}

/// Every tier with its adjusted probability, the common prize last.
pub fn adjusted_rates(luck: i64) -> Vec<(&'static Tier, f64)> {
    let mut rates: Vec<(&'static Tier, f64)> =
        RARE_TIERS.iter().map(|t| (t, adjusted_rate(t, luck))).collect();
    let rare: f64 = rates.iter().map(|(_, r)| r).sum();
    rates.push((&COMMON, (1.0 - rare).max(0.0)));
    rates
}

/// The tier hit by `roll` in `[0, 1)`.
pub fn draw(roll: f64, luck: i64) -> &'static Tier {
    let mut cumulative = 0.0;
    for tier in RARE_TIERS {
        cumulative += adjusted_rate(tier, luck);
        if roll < cumulative {
            return tier;
        }
    }
    &COMMON
}

#[derive(Debug)]
pub enum RollOutcome {
    NoRolls,
    Won { tier: &'static Tier, rolls_left: i64 },
}

/// Spends one roll, draws and grants the prize in one transaction.
pub async fn roll_gacha(pool: &DbPool, user_id: UserId) -> Result<RollOutcome, sqlx::Error> {
    let luck = total_luck(pool, user_id).await?;
    let roll = rand::rng().random::<f64>();
    let tier = draw(roll, luck);

    let mut tx = pool.begin().await?;
    database::users::ensure_user(&mut *tx, user_id).await?;
    if !database::users::add_gacha_rolls(&mut *tx, user_id, -1).await? {
        tx.rollback().await?;
        return Ok(RollOutcome::NoRolls);
    }
    match tier.prize {
        Prize::Item(item) => {
            database::users::add_booster(&mut *tx, user_id, item, 1).await?;
        }
        Prize::Currency(amount) => {
            database::users::add_currency(&mut *tx, user_id, amount).await?;
        }
    }
    let rolls_left = database::users::get_user(&mut *tx, user_id)
        .await?
        .map_or(0, |p| p.gacha_rolls);
    tx.commit().await?;

    info!(target: "gacha.roll", user = user_id.get(), prize = tier.label, luck, "gacha rolled");
    update_quest_progress(pool, user_id, QuestKind::GachaRoll, 1).await;
    Ok(RollOutcome::Won { tier, rolls_left })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_table_sums_to_one() {
        let total: f64 = adjusted_rates(0).iter().map(|(_, r)| r).sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn luck_bonus_is_capped() {
        assert_eq!(luck_bonus(0), 0.0);
        assert!((luck_bonus(50) - 0.05).abs() < 1e-12);
        assert_eq!(luck_bonus(1_000), MAX_LUCK_BONUS);
    }
}
