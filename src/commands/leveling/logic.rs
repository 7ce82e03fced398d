//! Level curve, rank titles and level-up rewards.

use crate::commands::achievements::logic::{Metric, check_achievement_progress};
use crate::config::Config;
use crate::constants::LEVEL_UP_CURRENCY_PER_LEVEL;
use crate::database::{self, DbPool};
use serenity::model::id::{GuildId, UserId};
use serenity::prelude::Context;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Rank {
    Warga,
    Prajurit,
    Ksatria,
    Bangsawan,
    Adipati,
    Raja,
}

impl Rank {
    pub const ALL: [Rank; 6] = [
        Rank::Warga,
        Rank::Prajurit,
        Rank::Ksatria,
        Rank::Bangsawan,
        Rank::Adipati,
        Rank::Raja,
    ];

    pub fn for_level(level: i64) -> Rank {
        match level {
            l if l >= 25 => Rank::Raja,
            l if l >= 20 => Rank::Adipati,
            l if l >= 15 => Rank::Bangsawan,
            l if l >= 10 => Rank::Ksatria,
            l if l >= 5 => Rank::Prajurit,
            _ => Rank::Warga,
        }
    }

    /// Name of the Discord role for this rank.
    pub fn role_name(&self) -> &'static str {
        match self {
            Rank::Warga => "Warga",
            Rank::Prajurit => "Prajurit",
            Rank::Ksatria => "Ksatria",
            Rank::Bangsawan => "Bangsawan",
            Rank::Adipati => "Adipati",
            Rank::Raja => "Raja",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Rank::Warga => "🧑‍🌾",
            Rank::Prajurit => "🛡️",
            Rank::Ksatria => "🏹",
            Rank::Bangsawan => "🎩",
            Rank::Adipati => "👑",
            Rank::Raja => "🌟",
        }
    }

    pub fn title(&self) -> String {
        format!("{} {}", self.role_name(), self.emoji())
    }
}

/// Cumulative XP needed to stand at `level`.
pub fn total_xp_needed_for_level(level: i64) -> i64 {
    if level <= 1 {
        return 0;
    }
    let n = level - 1;
    n * (n + 2)
}

pub fn gacha_rolls_for_level(level: i64) -> i64 {
    if level >= 10 { 2 } else { 1 }
}

pub fn luck_for_level(level: i64) -> i64 {
    match level {
        l if l >= 25 => 10,
        l if l >= 20 => 5,
        l if l >= 15 => 3,
        l if l >= 10 => 2,
        _ => 1,
    }
}

/// `(xp into the current level, xp span of the current level)`.
pub fn xp_progress(level: i64, xp: i64) -> (i64, i64) {
    let floor = total_xp_needed_for_level(level);
    let ceil = total_xp_needed_for_level(level + 1);
    ((xp - floor).max(0), ceil - floor)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelUp {
    pub old_level: i64,
    pub new_level: i64,
    pub currency: i64,
    pub rolls: i64,
    pub luck: i64,
}

impl LevelUp {
    pub fn gained(&self) -> i64 {
        self.new_level - self.old_level
    }

    pub fn rank_changed(&self) -> bool {
        Rank::for_level(self.old_level) != Rank::for_level(self.new_level)
    }
}

/// Computes every level gained by `xp` from `level` and the summed rewards.
pub fn compute_level_up(level: i64, xp: i64) -> Option<LevelUp> {
    let mut new_level = level;
    while xp >= total_xp_needed_for_level(new_level + 1) {
        new_level += 1;
    }
    if new_level == level {
        return None;
    }
    let gained = new_level - level;
    let currency = (1..=gained)
        .map(|i| LEVEL_UP_CURRENCY_PER_LEVEL * (level + i))
        .sum();
    let rolls = (1..=gained).map(|i| gacha_rolls_for_level(level + i)).sum();
    Some(LevelUp {
        old_level: level,
        new_level,
        currency,
        rolls,
        luck: luck_for_level(new_level) * gained,
    })
}

/// Applies any pending level-up for the user and records the `level` achievement.
pub async fn check_level_up(pool: &DbPool, user_id: UserId) -> Result<Option<LevelUp>, sqlx::Error> {
    let profile = database::users::get_or_create_user(pool, user_id).await?;
    let Some(up) = compute_level_up(profile.level, profile.xp) else {
        return Ok(None);
    };
    database::users::apply_level_up(pool, user_id, up.new_level, up.currency, up.rolls, up.luck)
        .await?;
    info!(target: "leveling", user = user_id.get(), from = up.old_level, to = up.new_level, "level up");
    check_achievement_progress(pool, user_id, Metric::Level, up.new_level).await?;
    Ok(Some(up))
}

/// Gives the member the role of their rank and removes the other configured rank roles.
/// Role failures are logged, never surfaced.
pub async fn sync_rank_role(
    ctx: &Context,
    config: &Config,
    guild_id: GuildId,
    user_id: UserId,
    level: i64,
) {
    let Some(target) = config.rank_role(Rank::for_level(level)) else {
        return;
    };
    let member = match guild_id.member(&ctx.http, user_id).await {
        Ok(m) => m,
        Err(e) => {
            warn!(target: "leveling", user = user_id.get(), error = %e, "member lookup failed");
            return;
        }
    };
    for (_, role) in config.rank_roles.iter().filter(|(_, r)| *r != target) {
        if member.roles.contains(role)
            && let Err(e) = member.remove_role(&ctx.http, *role).await
        {
            warn!(target: "leveling", role = role.get(), error = %e, "could not remove rank role");
        }
    }
    if !member.roles.contains(&target)
        && let Err(e) = member.add_role(&ctx.http, target).await
    {
        warn!(target: "leveling", role = target.get(), error = %e, "could not add rank role");
    }
}

/// Portfolio tier label for a kumpul count.
pub fn portfolio_tier(count: i64) -> &'static str {
    match count {
        c if c <= 5 => "🥉 Bronze",
        c if c <= 10 => "🥈 Silver",
        c if c <= 25 => "🥇 Gold",
        c if c <= 50 => "💠 Platinum",
        c if c <= 100 => "💎 Diamond",
        _ => "👑 Master",
    }
}
