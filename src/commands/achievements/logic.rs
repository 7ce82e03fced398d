//! Achievement definitions and the unlock check every system feeds into.

use crate::database::{self, DbPool};
use chrono::Utc;
use serenity::model::id::UserId;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Portfolio,
    Fishing,
    Trading,
    Jade,
    Quest,
    Level,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Portfolio,
        Category::Fishing,
        Category::Trading,
        Category::Jade,
        Category::Quest,
        Category::Level,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Category::Portfolio => "📊 Portfolio",
            Category::Fishing => "🎣 Fishing",
            Category::Trading => "💹 Trading",
            Category::Jade => "💎 Jade",
            Category::Quest => "📜 Quest",
            Category::Level => "⭐ Level",
        }
    }
}

/// The counters achievements are measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    PortfolioCount,
    FishCaught,
    LegendaryFish,
    TradingProfit,
    JadeCuts,
    JadeJackpots,
    QuestsCompleted,
    Level,
}

#[derive(Debug)]
pub struct Achievement {
    pub id: &'static str,
    pub name: &'static str,
    pub emoji: &'static str,
    pub description: &'static str,
    pub metric: Metric,
    pub requirement: i64,
    pub luck: i64,
    pub currency: i64,
    pub category: Category,
}

macro_rules! achievement {
    ($id:literal, $name:literal, $emoji:literal, $desc:literal, $metric:ident, $req:expr, $luck:expr, $cur:expr, $cat:ident) => {
        Achievement {
            id: $id,
            name: $name,
            emoji: $emoji,
            description: $desc,
            metric: Metric::$metric,
            requirement: $req,
            luck: $luck,
            currency: $cur,
            category: Category::$cat,
        }
    };
}

pub const ACHIEVEMENTS: &[Achievement] = &[
    achievement!("porto_beginner", "Portfolio Beginner", "📗", "Collect 5 portfolios", PortfolioCount, 5, 1, 10_000, Portfolio),
    achievement!("porto_collector", "Portfolio Collector", "📚", "Collect 25 portfolios", PortfolioCount, 25, 3, 50_000, Portfolio),
    achievement!("porto_master", "Portfolio Master", "🎓", "Collect 100 portfolios", PortfolioCount, 100, 5, 200_000, Portfolio),
    achievement!("porto_legend", "Portfolio Legend", "👑", "Collect 500 portfolios", PortfolioCount, 500, 10, 1_000_000, Portfolio),
    achievement!("fisher_novice", "Novice Fisher", "🎣", "Catch 100 fish", FishCaught, 100, 2, 25_000, Fishing),
    achievement!("fisher_pro", "Pro Fisher", "🐟", "Catch 1,000 fish", FishCaught, 1_000, 5, 100_000, Fishing),
    achievement!("legendary_catch", "Legendary Catch", "🐋", "Catch a legendary fish", LegendaryFish, 1, 8, 500_000, Fishing),
    achievement!("crypto_trader", "Crypto Trader", "📈", "Realise Rp 1M trading profit", TradingProfit, 1_000_000, 5, 100_000, Trading),
    achievement!("crypto_whale", "Crypto Whale", "🐳", "Realise Rp 10M trading profit", TradingProfit, 10_000_000, 15, 1_000_000, Trading),
    achievement!("jade_cutter", "Jade Cutter", "💎", "Cut 50 jade stones", JadeCuts, 50, 3, 50_000, Jade),
    achievement!("jackpot_hunter", "Jackpot Hunter", "🎰", "Hit 5 jade jackpots", JadeJackpots, 5, 10, 500_000, Jade),
    achievement!("quest_beginner", "Quest Beginner", "⭐", "Complete 10 quests", QuestsCompleted, 10, 2, 50_000, Quest),
    achievement!("quest_hunter", "Quest Hunter", "🏹", "Complete 50 quests", QuestsCompleted, 50, 5, 200_000, Quest),
    achievement!("quest_legend", "Quest Legend", "🌟", "Complete 200 quests", QuestsCompleted, 200, 15, 1_000_000, Quest),
    achievement!("level_10", "Ksatria", "🏹", "Reach level 10", Level, 10, 3, 50_000, Level),
    achievement!("level_25", "Raja", "👑", "Reach level 25", Level, 25, 10, 500_000, Level),
];

pub fn find(id: &str) -> Option<&'static Achievement> {
    ACHIEVEMENTS.iter().find(|a| a.id == id)
}

/// Achievements of `metric` that `value` satisfies and that are not in `unlocked`.
pub fn newly_reached(
    metric: Metric,
    value: i64,
    unlocked: &[String],
) -> impl Iterator<Item = &'static Achievement> + '_ {
    ACHIEVEMENTS.iter().filter(move |a| {
        a.metric == metric && value >= a.requirement && !unlocked.iter().any(|u| u == a.id)
    })
}

/// Sum of the luck granted by the given unlocked achievement ids.
pub fn luck_bonus_of(unlocked: &[String]) -> i64 {
    unlocked.iter().filter_map(|id| find(id)).map(|a| a.luck).sum()
}

/// Unlocks every achievement of `metric` that `value` reaches, granting its rewards.
/// Returns what was unlocked by this call.
pub async fn check_achievement_progress(
    pool: &DbPool,
    user_id: UserId,
    metric: Metric,
    value: i64,
) -> Result<Vec<&'static Achievement>, sqlx::Error> {
    let unlocked: Vec<String> = database::achievements::unlocked(pool, user_id)
        .await?
        .into_iter()
        .map(|u| u.achievement_id)
        .collect();
    let candidates: Vec<&'static Achievement> = newly_reached(metric, value, &unlocked).collect();
    if candidates.is_empty() {
        return Ok(candidates);
    }

    let now = Utc::now();
    let mut granted = Vec::with_capacity(candidates.len());
    let mut tx = pool.begin().await?;
    for ach in candidates {
        if database::achievements::unlock(&mut *tx, user_id, ach.id, now).await? {
            database::users::add_currency(&mut *tx, user_id, ach.currency).await?;
            database::users::add_luck(&mut *tx, user_id, ach.luck).await?;
            granted.push(ach);
        }
    }
    tx.commit().await?;
    for ach in &granted {
        info!(target: "achievements.unlock", user = user_id.get(), id = ach.id, "achievement unlocked");
    }
    Ok(granted)
}

/// Luck from unlocked achievements.
pub async fn total_luck_bonus(pool: &DbPool, user_id: UserId) -> Result<i64, sqlx::Error> {
    let unlocked: Vec<String> = database::achievements::unlocked(pool, user_id)
        .await?
        .into_iter()
        .map(|u| u.achievement_id)
        .collect();
    Ok(luck_bonus_of(&unlocked))
}

/// The luck figure gacha and jade odds scale with. Unlocks are credited into
/// `users.luck`, so it already contains the achievement share.
pub async fn total_luck(pool: &DbPool, user_id: UserId) -> Result<i64, sqlx::Error> {
    Ok(database::users::get_user(pool, user_id)
        .await?
        .map_or(0, |p| p.luck))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sixteen_unique_ids() {
        assert_eq!(ACHIEVEMENTS.len(), 16);
        for (i, a) in ACHIEVEMENTS.iter().enumerate() {
            assert!(ACHIEVEMENTS[i + 1..].iter().all(|b| b.id != a.id));
        }
    }

    #[test]
    fn reached_skips_unlocked() {
        let unlocked = vec!["porto_beginner".to_string()];
        let ids: Vec<_> = newly_reached(Metric::PortfolioCount, 30, &unlocked)
            .map(|a| a.id)
            .collect();
        assert_eq!(ids, vec!["porto_collector"]);
        assert_eq!(luck_bonus_of(&["level_10".into(), "nope".into()]), 3);
    }
}
