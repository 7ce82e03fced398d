//! The daily global quest: templates, generation, progress tracking and the completion sweep.

use crate::commands::achievements::logic::{Achievement, Metric, check_achievement_progress};
use crate::constants::{QUEST_DURATION_HOURS, QUEST_GENERATION_HOUR_WIB, WIB};
use crate::database::models::{GlobalQuest, PendingCompletion};
use crate::database::{self, DbPool};
use crate::util::thousands;
use chrono::{DateTime, Duration, NaiveDate, Timelike, Utc};
use rand::Rng;
use rand::seq::IndexedRandom;
use serenity::model::id::UserId;
use std::str::FromStr;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestKind {
    FishRare,
    FishAny,
    TradeProfit,
    JadeCut,
    GachaRoll,
}

impl QuestKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestKind::FishRare => "fish_rare",
            QuestKind::FishAny => "fish_any",
            QuestKind::TradeProfit => "trade_profit",
            QuestKind::JadeCut => "jade_cut",
            QuestKind::GachaRoll => "gacha_roll",
        }
    }
}

impl FromStr for QuestKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fish_rare" => Ok(QuestKind::FishRare),
            "fish_any" => Ok(QuestKind::FishAny),
            "trade_profit" => Ok(QuestKind::TradeProfit),
            "jade_cut" => Ok(QuestKind::JadeCut),
            "gacha_roll" => Ok(QuestKind::GachaRoll),
            _ => Err(()),
        }
    }
}

pub struct QuestTemplate {
    pub kind: QuestKind,
    pub title: &'static str,
    pub emoji: &'static str,
    pub reward_currency: i64,
    pub reward_luck: i64,
    pub amounts: &'static [i64],
}

impl QuestTemplate {
    pub fn describe(&self, amount: i64) -> String {
        match self.kind {
            QuestKind::FishRare => format!("Catch {amount} fish of Rare rarity or higher"),
            QuestKind::FishAny => format!("Catch {amount} fish of any kind"),
            QuestKind::TradeProfit => {
                format!("Realise Rp {} profit from crypto trading", thousands(amount))
            }
            QuestKind::JadeCut => format!("Cut {amount} jade stones (Rare or higher)"),
            QuestKind::GachaRoll => format!("Roll the gacha {amount} times"),
        }
    }
}

pub const QUEST_TEMPLATES: &[QuestTemplate] = &[
    QuestTemplate {
        kind: QuestKind::FishRare,
        title: "🟠 Rare Catch",
        emoji: "🟠",
        reward_currency: 50_000,
        reward_luck: 2,
        amounts: &[3, 5, 7, 10],
    },
    QuestTemplate {
        kind: QuestKind::FishAny,
        title: "🎣 Productive Angler",
        emoji: "🎣",
        reward_currency: 30_000,
        reward_luck: 1,
        amounts: &[20, 30, 50, 75, 100],
    },
    QuestTemplate {
        kind: QuestKind::TradeProfit,
        title: "📈 Trading Profit",
        emoji: "📈",
        reward_currency: 100_000,
        reward_luck: 3,
        amounts: &[100_000, 500_000, 1_000_000],
    },
    QuestTemplate {
        kind: QuestKind::JadeCut,
        title: "💎 Jade Cutter",
        emoji: "💎",
        reward_currency: 75_000,
        reward_luck: 2,
        amounts: &[1, 3, 5, 10],
    },
    QuestTemplate {
        kind: QuestKind::GachaRoll,
        title: "🎰 Gacha Streak",
        emoji: "🎰",
        reward_currency: 50_000,
        reward_luck: 2,
        amounts: &[2, 3, 4, 5],
    },
];

pub fn template(kind: QuestKind) -> &'static QuestTemplate {
    match kind {
        QuestKind::FishRare => &QUEST_TEMPLATES[0],
        QuestKind::FishAny => &QUEST_TEMPLATES[1],
        QuestKind::TradeProfit => &QUEST_TEMPLATES[2],
        QuestKind::JadeCut => &QUEST_TEMPLATES[3],
        QuestKind::GachaRoll => &QUEST_TEMPLATES[4],
    }
}

/// `global_YYYYMMDD` for the WIB calendar day.
pub fn quest_id_for(date_wib: NaiveDate) -> String {
    format!("global_{}", date_wib.format("%Y%m%d"))
}

pub fn build_quest(template: &QuestTemplate, amount: i64, now: DateTime<Utc>) -> GlobalQuest {
    GlobalQuest {
        quest_id: quest_id_for(now.with_timezone(&WIB).date_naive()),
        quest_type: template.kind.as_str().to_string(),
        title: template.title.to_string(),
        description: template.describe(amount),
        emoji: template.emoji.to_string(),
        target_amount: amount,
        reward_currency: template.reward_currency,
        reward_luck: template.reward_luck,
        created_at: now,
        expires_at: now + Duration::hours(QUEST_DURATION_HOURS),
        active: true,
    }
}

pub fn pick_quest<R: Rng + ?Sized>(rng: &mut R, now: DateTime<Utc>) -> GlobalQuest {
    let tpl = &QUEST_TEMPLATES[rng.random_range(0..QUEST_TEMPLATES.len())];
    let amount = tpl.amounts.choose(rng).copied().unwrap_or(1);
    build_quest(tpl, amount, now)
}

/// The hourly check generates at 07:00 WIB, or whenever nothing is running.
pub fn is_generation_hour(now: DateTime<Utc>) -> bool {
    now.with_timezone(&WIB).hour() == QUEST_GENERATION_HOUR_WIB
}

/// The next 07:00 WIB strictly after `now`.
pub fn next_reset(now: DateTime<Utc>) -> DateTime<Utc> {
    let local = now.with_timezone(&WIB);
    let mut date = local.date_naive();
    if local.hour() >= QUEST_GENERATION_HOUR_WIB {
        date = date.succ_opt().unwrap_or(date);
    }
    date.and_hms_opt(QUEST_GENERATION_HOUR_WIB, 0, 0)
        .and_then(|naive| naive.and_local_timezone(WIB).single())
        .map_or(now + Duration::hours(24), |t| t.with_timezone(&Utc))
}

/// Creates today's quest unless it already exists. Returns the new quest.
pub async fn generate_daily_quest(
    pool: &DbPool,
    now: DateTime<Utc>,
) -> Result<Option<GlobalQuest>, sqlx::Error> {
    let quest_id = quest_id_for(now.with_timezone(&WIB).date_naive());
    if database::quests::get_quest(pool, &quest_id).await?.is_some() {
        return Ok(None);
    }
    let quest = {
        let mut rng = rand::rng();
        pick_quest(&mut rng, now)
    };
    database::quests::replace_active_quest(pool, &quest).await?;
    info!(target: "quests.generate", quest_id = %quest.quest_id, kind = %quest.quest_type, target = quest.target_amount, "daily quest created");
    Ok(Some(quest))
}

/// Replaces today's quest with a freshly rolled one, dropping its progress.
pub async fn force_daily_quest(pool: &DbPool, now: DateTime<Utc>) -> Result<GlobalQuest, sqlx::Error> {
    let quest_id = quest_id_for(now.with_timezone(&WIB).date_naive());
    database::quests::delete_quest(pool, &quest_id).await?;
    let quest = {
        let mut rng = rand::rng();
        pick_quest(&mut rng, now)
    };
    database::quests::replace_active_quest(pool, &quest).await?;
    info!(target: "quests.generate", quest_id = %quest.quest_id, kind = %quest.quest_type, "daily quest forced");
    Ok(quest)
}

/// Adds progress to the running quest of `kind`. Quest bookkeeping never fails the
/// calling command; errors are logged.
pub async fn update_quest_progress(pool: &DbPool, user_id: UserId, kind: QuestKind, amount: i64) {
    if amount <= 0 {
        return;
    }
    if let Err(e) =
        database::quests::add_progress(pool, user_id, kind.as_str(), amount, Utc::now()).await
    {
        warn!(target: "quests.progress", user = user_id.get(), kind = kind.as_str(), error = %e, "progress update failed");
    }
}

/// One reward paid by the sweep.
#[derive(Debug)]
pub struct CompletedQuest {
    pub row: PendingCompletion,
    pub total_completed: i64,
    pub unlocked: Vec<&'static Achievement>,
}

/// Pays every finished-but-unrewarded progress row exactly once.
pub async fn sweep_completions(pool: &DbPool) -> Result<Vec<CompletedQuest>, sqlx::Error> {
    let mut done = Vec::new();
    for row in database::quests::pending_completions(pool).await? {
        let user_id = UserId::new(row.user_id as u64);
        let now = Utc::now();
        let mut tx = pool.begin().await?;
        if !database::quests::mark_completed(&mut tx, &row.quest_id, user_id, now).await? {
            tx.rollback().await?;
            continue;
        }
        database::users::add_currency(&mut *tx, user_id, row.reward_currency).await?;
        database::users::add_luck(&mut *tx, user_id, row.reward_luck).await?;
        let total_completed = database::quests::bump_quest_stats(&mut *tx, user_id, now).await?;
        tx.commit().await?;

        let unlocked =
            check_achievement_progress(pool, user_id, Metric::QuestsCompleted, total_completed)
                .await?;
        info!(target: "quests.sweep", user = row.user_id, quest_id = %row.quest_id, "quest reward paid");
        done.push(CompletedQuest {
            row,
            total_completed,
            unlocked,
        });
    }
    Ok(done)
}

/// Colored bar: green when done, then yellow / orange / red by how far along.
pub fn create_progress_bar(current: i64, target: i64, length: usize) -> String {
    let ratio = if target <= 0 {
        1.0
    } else {
        (current as f64 / target as f64).clamp(0.0, 1.0)
    };
    let cell = match ratio {
        r if r >= 1.0 => "🟩",
        r if r >= 0.5 => "🟨",
        r if r >= 0.25 => "🟧",
        _ => "🟥",
    };
    let filled = ((ratio * length as f64).floor() as usize).min(length);
    format!("{}{}", cell.repeat(filled), "⬜".repeat(length - filled))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn progress_bar_colors_by_ratio() {
        assert_eq!(create_progress_bar(10, 10, 4), "🟩🟩🟩🟩");
        assert_eq!(create_progress_bar(5, 10, 4), "🟨🟨⬜⬜");
        assert_eq!(create_progress_bar(1, 4, 4), "🟧⬜⬜⬜");
        assert_eq!(create_progress_bar(0, 4, 4), "⬜⬜⬜⬜");
    }

    #[test]
    fn reset_is_next_seven_am_wib() {
        // 06:00 WIB on 2024-05-01 is 23:00 UTC the day before.
        let before = Utc.with_ymd_and_hms(2024, 4, 30, 23, 0, 0).unwrap();
        assert_eq!(next_reset(before), Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap());
        let after = Utc.with_ymd_and_hms(2024, 5, 1, 1, 0, 0).unwrap();
        assert_eq!(next_reset(after), Utc.with_ymd_and_hms(2024, 5, 2, 0, 0, 0).unwrap());
    }
}
