//! `achievements [@user]` and `achhelp`.

use super::logic::{ACHIEVEMENTS, Category, luck_bonus_of};
use crate::AppState;
use crate::commands::common::{reply, target_or_author};
use crate::database;
use crate::error::CommandResult;
use crate::ui::style::{COLOR_GOLD, COLOR_PURPLE, footer, help_embed};
use crate::util::{rp, thousands};
use serenity::builder::CreateEmbed;
use serenity::model::channel::Message;
use serenity::prelude::*;
use std::sync::Arc;

pub async fn run_achievements(
    ctx: &Context,
    msg: &Message,
    state: &Arc<AppState>,
    args: &[&str],
) -> CommandResult {
    let user = target_or_author(ctx, msg, args.first()).await?;
    let unlocked: Vec<String> = database::achievements::unlocked(&state.db, user.id)
        .await?
        .into_iter()
        .map(|u| u.achievement_id)
        .collect();

    let mut embed = CreateEmbed::new()
        .title(format!("🏆 Achievements • {}", user.name))
        .description(format!(
            "Unlocked **{}/{}** • Luck from achievements: **+{}**",
            unlocked.len(),
            ACHIEVEMENTS.len(),
            luck_bonus_of(&unlocked)
        ))
        .color(COLOR_GOLD);
    for category in Category::ALL {
        let lines = ACHIEVEMENTS
            .iter()
            .filter(|a| a.category == category)
            .map(|a| {
                let done = unlocked.iter().any(|u| u == a.id);
                let mark = if done { "✅" } else { "🔒" };
                format!(
                    "{mark} {} **{}**: {} (+{} luck, {})",
                    a.emoji,
                    a.name,
                    a.description,
                    a.luck,
                    rp(a.currency)
                )
            })
            .collect::<Vec<_>>()
            .join("\n");
        embed = embed.field(category.title(), lines, false);
    }
    embed = embed.footer(footer("Achievements unlock automatically as you play"));
    reply(ctx, msg, embed).await?;
    Ok(())
}

pub async fn run_achievement_help(ctx: &Context, msg: &Message, state: &Arc<AppState>) -> CommandResult {
    let p = &state.config.prefix;
    let total_luck: i64 = ACHIEVEMENTS.iter().map(|a| a.luck).sum();
    let total_rp: i64 = ACHIEVEMENTS.iter().map(|a| a.currency).sum();
    let embed = help_embed(
        "🏆 Achievement Guide",
        "Milestones across every game. Each one pays once, forever.",
        COLOR_PURPLE,
        &[
            ("📋 Commands", format!("`{p}achievements [@user]` see progress")),
            (
                "🎁 Rewards",
                format!(
                    "Every achievement grants Rupiah and permanent **luck**.\nAll together: **+{total_luck} luck** and **Rp {}**.",
                    thousands(total_rp)
                ),
            ),
            (
                "🍀 Luck",
                "Luck raises your gacha odds for rare prizes and lowers the jade loss rate.".to_string(),
            ),
        ],
    );
    reply(ctx, msg, embed).await?;
    Ok(())
}
