//! `gacha` and `rate`.

use super::logic::{Prize, RollOutcome, adjusted_rates, luck_bonus, roll_gacha};
use crate::AppState;
use crate::commands::achievements::logic::total_luck;
use crate::commands::common::reply;
use crate::error::{CommandError, CommandResult};
use crate::ui::style::{COLOR_MOCHI, footer};
use crate::util::rp;
use serenity::builder::CreateEmbed;
use serenity::model::channel::Message;
use serenity::prelude::*;
use std::sync::Arc;

pub async fn run_gacha(ctx: &Context, msg: &Message, state: &Arc<AppState>) -> CommandResult {
    let RollOutcome::Won { tier, rolls_left } = roll_gacha(&state.db, msg.author.id).await? else {
        return Err(CommandError::bad(
            "You have no gacha rolls! Level up to earn more.",
        ));
    };
    let line = match tier.prize {
        Prize::Item(item) => format!(
            "{} **{}** item! Use it with `{}use {}`.",
            tier.emoji,
            tier.label,
            state.config.prefix,
            item.short()
        ),
        Prize::Currency(amount) => format!("{} **{}**: +{}", tier.emoji, tier.label, rp(amount)),
    };
    let embed = CreateEmbed::new()
        .title("🎰 Mochi Gacha")
        .description(line)
        .color(COLOR_MOCHI)
        .footer(footer(format!("Rolls left: {rolls_left}")));
    reply(ctx, msg, embed).await?;
    Ok(())
}

pub async fn run_rate(ctx: &Context, msg: &Message, state: &Arc<AppState>) -> CommandResult {
    let luck = total_luck(&state.db, msg.author.id).await?;
    let mut embed = CreateEmbed::new()
        .title("📊 Mochi Gacha Rates")
        .description(format!("Rates for your **Luck: `{luck}`**"))
        .color(COLOR_MOCHI);
    for (tier, rate) in adjusted_rates(luck) {
        embed = embed.field(
            format!("{} {}", tier.emoji, tier.label),
            format!("`{:.3}%`", rate * 100.0),
            false,
        );
    }
    embed = embed
        .field(
            "ℹ️ Info",
            format!(
                "• Every **1 Luck = +0.1%** spread over the rare prizes\n• Your bonus: **+{:.1}%**\n• Max bonus: +10% (Luck 100)",
                luck_bonus(luck) * 100.0
            ),
            false,
        )
        .footer(footer("Level up and unlock achievements for more luck!"));
    reply(ctx, msg, embed).await?;
    Ok(())
}
