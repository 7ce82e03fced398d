//! Embeds for profiles, the leaderboard, ranks and kumpul sessions.

use super::logic::{LevelUp, Rank, portfolio_tier, xp_progress};
use crate::commands::common::mention;
use crate::commands::economy::item::BoosterItem;
use crate::commands::quests::logic::create_progress_bar;
use crate::constants::{EMOJI_CANCEL, EMOJI_CONFIRM, EMOJI_DENY, EMOJI_FIRE, KUMPUL_DURATION_DAYS};
use crate::database::models::{LeaderboardEntry, Profile};
use crate::ui::style::{COLOR_ALERT, COLOR_GOLD, COLOR_GREEN, COLOR_KUMPUL, COLOR_MOCHI, COLOR_WARNING, footer};
use crate::util::{medal, rp, thousands};
use serenity::builder::CreateEmbed;

/// Everything the profile card shows besides the user row itself.
pub struct ProfileExtras {
    pub portfolio_count: i64,
    pub achievements_unlocked: i64,
    pub achievements_total: usize,
    pub achievement_luck: i64,
    pub double_xp_active: bool,
}

pub fn profile_embed(name: &str, profile: &Profile, extras: &ProfileExtras, prefix: &str) -> CreateEmbed {
    let rank = Rank::for_level(profile.level);
    let (into, span) = xp_progress(profile.level, profile.xp);
    let boosters = BoosterItem::ALL
        .iter()
        .map(|b| format!("{}: **{}**", b.short(), b.count_in(profile)))
        .collect::<Vec<_>>()
        .join(" • ");
    let mut multiplier = format!("x{}", profile.next_xp_mult);
    if extras.double_xp_active {
        multiplier.push_str(" • ⚡ Double Daily XP");
    }
    let base_luck = profile.luck - extras.achievement_luck;
    CreateEmbed::new()
        .title(format!("👤 Profile • {name}"))
        .color(COLOR_MOCHI)
        .field("🏅 Rank", rank.title(), true)
        .field("⭐ Level", profile.level.to_string(), true)
        .field("💰 Currency", rp(profile.currency), true)
        .field(
            "📈 XP",
            format!(
                "{} / {}\n{}",
                thousands(into),
                thousands(span),
                create_progress_bar(into, span, 10)
            ),
            false,
        )
        .field("🎰 Gacha Rolls", profile.gacha_rolls.to_string(), true)
        .field("✨ Next XP Multiplier", multiplier, true)
        .field("🎒 XP Boosters", boosters, false)
        .field(
            "📚 Portfolio Activity",
            format!(
                "**Count**: {}\n**Tier**: {}",
                extras.portfolio_count,
                portfolio_tier(extras.portfolio_count)
            ),
            false,
        )
        .field(
            "🏆 Achievements",
            format!(
                "**Unlocked**: {}/{}\n**Luck**: 🍀 {} base + {} achievements = **{}**",
                extras.achievements_unlocked,
                extras.achievements_total,
                base_luck,
                extras.achievement_luck,
                profile.luck
            ),
            false,
        )
        .footer(footer(format!(
            "{prefix}achievements for details • {prefix}quest for the active quest"
        )))
}

pub fn top_embed(rows: &[LeaderboardEntry]) -> CreateEmbed {
    let body = rows
        .iter()
        .enumerate()
        .map(|(i, r)| {
            format!(
                "{} {} • Level {} | {}",
                medal(i + 1),
                mention(r.user_id),
                r.level,
                rp(r.currency)
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    CreateEmbed::new()
        .title("🏆 Mochi Leaderboard")
        .description(format!("Top 10 by level & currency\n\n{body}"))
        .color(COLOR_GOLD)
        .footer(footer("Level up by sharing your portfolio!"))
}

fn rank_benefits(rank: Rank) -> &'static str {
    match rank {
        Rank::Warga => "+1 Luck/level, +1 gacha roll/level",
        Rank::Prajurit => "+1 Luck/level, +1 gacha roll/level",
        Rank::Ksatria => "+2 Luck/level, +2 gacha rolls/level",
        Rank::Bangsawan => "+3 Luck/level, +2 gacha rolls/level, a free 2x XP every week",
        Rank::Adipati => "+5 Luck/level, +2 gacha rolls/level, tax free",
        Rank::Raja => "+10 Luck/level, +2 gacha rolls/level, every benefit",
    }
}

fn level_range(rank: Rank) -> &'static str {
    match rank {
        Rank::Warga => "Level 1–4",
        Rank::Prajurit => "Level 5–9",
        Rank::Ksatria => "Level 10–14",
        Rank::Bangsawan => "Level 15–19",
        Rank::Adipati => "Level 20–24",
        Rank::Raja => "Level 25+",
    }
}

pub fn rank_embed(name: &str, profile: &Profile) -> CreateEmbed {
    let rank = Rank::for_level(profile.level);
    let (into, span) = xp_progress(profile.level, profile.xp);
    let ladder = Rank::ALL
        .iter()
        .map(|r| {
            let marker = if *r == rank { " ◀" } else { "" };
            format!(
                "{} **{}** ({}){marker}\n└─ {}",
                r.emoji(),
                r.role_name(),
                level_range(*r),
                rank_benefits(*r)
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");
    CreateEmbed::new()
        .title("🏅 Mochi Rank System")
        .description(format!(
            "**{name}**: {} • Level {}\n**{}** XP to level {}",
            rank.title(),
            profile.level,
            thousands(span - into),
            profile.level + 1
        ))
        .color(COLOR_GOLD)
        .field("📜 Ranks", ladder, false)
        .footer(footer("Level up to climb the ranks!"))
}

pub fn level_up_embed(user_id: i64, up: &LevelUp) -> CreateEmbed {
    let mut embed = CreateEmbed::new()
        .title("🎉 LEVEL UP!")
        .description(format!(
            "{} reached **Level {}**!",
            mention(user_id),
            up.new_level
        ))
        .color(COLOR_GREEN)
        .field("💰 Currency", format!("+{}", rp(up.currency)), true)
        .field("🎰 Gacha Rolls", format!("+{}", up.rolls), true)
        .field("🍀 Luck", format!("+{}", up.luck), true);
    if up.rank_changed() {
        embed = embed.field(
            "🏅 New Rank",
            Rank::for_level(up.new_level).title(),
            false,
        );
    }
    embed
}

pub fn kumpul_start_embed(user_id: u64) -> CreateEmbed {
    CreateEmbed::new()
        .title("🔥 Real-Time XP Gathering Started!")
        .description(format!(
            "**Session** by <@{user_id}> has started.\nXP is credited **in real time** as {EMOJI_FIRE} reactions grow.\n**Duration**: the session runs for **{KUMPUL_DURATION_DAYS} days**.\n**Reset**: reactions pay once per round; rounds reset every hour after the first hour."
        ))
        .color(COLOR_KUMPUL)
}

pub fn cancel_verify_embed(session_owner: i64, link: &str, paid_reactions: i64, owner_name: &str) -> CreateEmbed {
    CreateEmbed::new()
        .title("🚨 KUMPUL XP CANCELLATION CHECK")
        .description(format!(
            "**User**: {} (`{session_owner}`)\n**Message**: [Jump]({link})\n**Current reactions**: {paid_reactions} {EMOJI_FIRE}\n\nOwner `{owner_name}` reacted {EMOJI_CANCEL}. Cancel this XP session?\n{EMOJI_CONFIRM} **YES, cancel** | {EMOJI_DENY} **NO, continue**.",
            mention(session_owner)
        ))
        .color(COLOR_ALERT)
}

pub fn cancel_result_embed(title: &str, description: String, confirmed: bool) -> CreateEmbed {
    CreateEmbed::new()
        .title(title)
        .description(description)
        .color(if confirmed { COLOR_GREEN } else { COLOR_WARNING })
}
