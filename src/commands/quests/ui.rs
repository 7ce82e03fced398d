//! Contains the UI rendering for quest status, announcements and completions.

use super::logic::{CompletedQuest, create_progress_bar};
use crate::commands::common::mention;
use crate::commands::fishing::ui::achievement_lines;
use crate::database::models::{GlobalQuest, QuestProgress, QuestStats};
use crate::ui::style::{COLOR_GREEN, COLOR_INFO, COLOR_WARNING, footer};
use crate::util::{medal, rp};
use chrono::{DateTime, Utc};
use serenity::builder::CreateEmbed;

fn percent(progress: i64, target: i64) -> i64 {
    if target > 0 {
        (progress * 100 / target).min(100)
    } else {
        0
    }
}

/// Shown when nothing is running; `next_reset` is the next 07:00 WIB.
pub fn no_quest_embed(next_reset: DateTime<Utc>) -> CreateEmbed {
    CreateEmbed::new()
        .title("📋 Daily Quest")
        .description("No active quest!\n\n✨ A **new daily quest** spawns at **07:00 WIB**")
        .color(COLOR_WARNING)
        .field("⏰ Reset Time", format!("<t:{}:R>", next_reset.timestamp()), false)
        .footer(footer("Daily quest system • Resets every day at 07:00 WIB"))
}

pub fn quest_embed(
    quest: &GlobalQuest,
    progress: Option<&QuestProgress>,
    top: &[QuestProgress],
    participation: (i64, i64),
) -> CreateEmbed {
    let current = progress.map_or(0, |p| p.current_progress);
    let completed = progress.is_some_and(|p| p.completed);
    let status = if completed { "✅ COMPLETED!" } else { "🔄 IN PROGRESS" };
    let target = quest.target_amount;

    let mut embed = CreateEmbed::new()
        .title(format!("📋 Daily Quest • {status}"))
        .description("**Today's Global Quest** (the same for every player)")
        .color(if completed { COLOR_GREEN } else { COLOR_WARNING })
        .field(format!("{} {}", quest.emoji, quest.title), &quest.description, false)
        .field(
            "📊 Your Progress",
            format!(
                "**{}%** completed\n{}\n`{current}/{target}` {}",
                percent(current, target),
                create_progress_bar(current, target, 15),
                quest.emoji
            ),
            false,
        )
        .field("💰 Reward", rp(quest.reward_currency), true)
        .field("🍀 Luck Bonus", format!("+{}", quest.reward_luck), true)
        .field("⏰ Deadline", format!("<t:{}:R>", quest.expires_at.timestamp()), true);

    if !top.is_empty() {
        let lines = top
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let marker = if p.completed {
                    "✅".to_string()
                } else {
                    medal(i + 1)
                };
                format!(
                    "{marker} {}: {} `{}/{target}`",
                    mention(p.user_id),
                    create_progress_bar(p.current_progress, target, 8),
                    p.current_progress
                )
            })
            .collect::<Vec<_>>()
            .join("\n");
        embed = embed.field("🏆 Leaderboard Top 10", lines, false);
    }
    let (players, finished) = participation;
    embed
        .field(
            "👥 Participation",
            format!("{players} players • {finished} completed"),
            false,
        )
        .footer(footer(format!(
            "Quest ID: {} • Progress updates every 10 seconds",
            quest.quest_id
        )))
}

pub fn announcement_embed(quest: &GlobalQuest) -> CreateEmbed {
    CreateEmbed::new()
        .title("🌅 NEW DAILY QUEST!")
        .description(format!(
            "**Today's quest for ALL PLAYERS!**\n\n{} **{}**\n{}",
            quest.emoji, quest.title, quest.description
        ))
        .color(COLOR_WARNING)
        .field(
            "📊 Target",
            format!(
                "{}\n`0/{}` completed",
                create_progress_bar(0, quest.target_amount, 15),
                quest.target_amount
            ),
            false,
        )
        .field(
            "💰 Reward",
            format!(
                "**Currency:** {}\n**Luck Bonus:** +{}",
                rp(quest.reward_currency),
                quest.reward_luck
            ),
            true,
        )
        .field(
            "⏰ Deadline",
            format!(
                "Expires: <t:{}:R>\nReset: tomorrow at **07:00 WIB**",
                quest.expires_at.timestamp()
            ),
            true,
        )
        .field(
            "💡 Info",
            "✅ **Active right away!** No need to accept\n📊 Progress updates every 10 seconds\n🏆 **Everyone gets the same quest**\n⚡ Finish it and the reward is paid automatically!",
            false,
        )
}

pub fn completion_embed(done: &CompletedQuest) -> CreateEmbed {
    let row = &done.row;
    let mut embed = CreateEmbed::new()
        .title("✅ QUEST COMPLETED!")
        .description(format!("{} finished today's quest!", mention(row.user_id)))
        .color(COLOR_GREEN)
        .field("📋 Quest", format!("{} {}", row.emoji, row.title), false)
        .field("💰 Reward", rp(row.reward_currency), true)
        .field("🍀 Luck Bonus", format!("+{}", row.reward_luck), true)
        .field("🏆 Total Completed", done.total_completed.to_string(), true);
    if !done.unlocked.is_empty() {
        embed = embed.field("🏆 Achievement Unlocked!", achievement_lines(&done.unlocked), false);
    }
    embed
}

pub fn stats_embed(
    name: &str,
    stats: &QuestStats,
    current: Option<(&GlobalQuest, Option<&QuestProgress>)>,
) -> CreateEmbed {
    let mut embed = CreateEmbed::new()
        .title(format!("📊 Quest Stats • {name}"))
        .color(COLOR_INFO)
        .field(
            "🏆 Total Quests Completed",
            format!("**{}** quests", stats.total_completed),
            true,
        );
    if let Some(last) = stats.last_completed_at {
        embed = embed.field("⏰ Last Completed", format!("<t:{}:R>", last.timestamp()), true);
    }
    embed = match current {
        Some((quest, Some(progress))) => {
            let status = if progress.completed { "✅ COMPLETED" } else { "🔄 IN PROGRESS" };
            embed.field(
                format!("{} Current Quest • {status}", quest.emoji),
                format!(
                    "**{}**\n{}\n`{}/{}` ({}%)",
                    quest.title,
                    create_progress_bar(progress.current_progress, quest.target_amount, 12),
                    progress.current_progress,
                    quest.target_amount,
                    percent(progress.current_progress, quest.target_amount)
                ),
                false,
            )
        }
        _ => embed.field("📋 Current Quest", "No progress on today's quest yet", false),
    };
    embed.footer(footer("Use quest to see the full quest details"))
}
