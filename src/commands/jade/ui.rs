//! Jade embeds: the shop, the purchase prompts and the cut reveal.

use super::logic::{JADE_TIERS, JadeBoard, JadeTier, SettledCut, risk_label, win_rate};
use crate::commands::common::mention;
use crate::commands::fishing::ui::achievement_lines;
use crate::database::models::{JadeLeaderRow, JadeStats};
use crate::ui::style::{COLOR_ALERT, COLOR_GOLD, COLOR_GREEN, COLOR_WARNING, footer};
use crate::util::{medal, rp, signed};
use serenity::builder::CreateEmbed;

pub fn shop_embed(prefix: &str) -> CreateEmbed {
    let mut embed = CreateEmbed::new()
        .title("🪨 Jade Stone Shop")
        .description("**Cut jade stones and find treasure!**\n⚠️ High Risk, High Reward!")
        .color(0x50C878);
    for tier in JADE_TIERS {
        embed = embed.field(
            format!("{} {} • {} RISK", tier.emoji, tier.name, risk_label(tier.loss_chance)),
            format!(
                "💰 **Price**: {}\n📊 **Max Return**: {}x\n🎰 **Jackpot**: 0.05% ({}x)\n📈 **Win Rate**: {:.1}%\n📉 **Loss Rate**: {:.0}%\n💎 **Max Win**: {}",
                rp(tier.price),
                tier.max_multi,
                tier.jackpot_multi,
                tier.win_chance(0.0) * 100.0,
                tier.loss_chance * 100.0,
                rp((tier.price as f64 * tier.jackpot_multi) as i64)
            ),
            false,
        );
    }
    embed
        .field(
            "📌 How to play",
            format!(
                "1️⃣ Pick a stone: `{prefix}buyjade <type>`\n2️⃣ Confirm the purchase (30s)\n3️⃣ React 🔨 to cut it (60s)\n4️⃣ See what was inside! 🎉\n\n💡 Luck from achievements lowers the loss rate!"
            ),
            false,
        )
        .footer(footer("⚠️ Expensive stones = High Risk, High Reward!"))
}

pub fn confirm_embed(tier: &JadeTier, balance: i64, luck: f64) -> CreateEmbed {
    let loss = tier.adjusted_loss(luck);
    let mut embed = CreateEmbed::new()
        .title("🪨 Confirm Purchase")
        .description(format!("Are you sure you want to buy **{}**?", tier.name))
        .color(tier.color)
        .field("💰 Price", rp(tier.price), true)
        .field("💳 Balance", rp(balance), true)
        .field("⚠️ Risk Level", risk_label(loss), true)
        .field(
            "🎰 Odds",
            format!(
                "🎰 Jackpot: {:.2}% ({}x)\n📈 Profit: {:.1}%\n📉 Loss: {:.0}%",
                tier.adjusted_jackpot(luck) * 100.0,
                tier.jackpot_multi,
                tier.win_chance(luck) * 100.0,
                loss * 100.0
            ),
            false,
        );
    if luck > 0.0 {
        embed = embed.field(
            "🍀 Luck Bonus",
            format!("+{:.1}% (lowers the loss rate!)", luck * 100.0),
            false,
        );
    }
    embed.footer(footer("React ✅ to confirm or ❌ to cancel (30 seconds)"))
}

pub fn ready_embed(tier: &JadeTier, luck: f64) -> CreateEmbed {
    CreateEmbed::new()
        .title(format!("🪨 {} Ready to Cut!", tier.name))
        .description(format!(
            "{} **Your stone is ready!**\n\nReact 🔨 to cut it open!\n\n*Is there treasure inside?*",
            tier.emoji
        ))
        .color(tier.color)
        .field("💰 Investment", rp(tier.price), true)
        .field("🎰 Win Rate", format!("{:.1}%", tier.win_chance(luck) * 100.0), true)
        .field("📉 Loss Rate", format!("{:.0}%", tier.adjusted_loss(luck) * 100.0), true)
        .footer(footer("React 🔨 to cut! (60 seconds)"))
}

pub fn notice_embed(title: &str, description: impl Into<String>) -> CreateEmbed {
    CreateEmbed::new()
        .title(title)
        .description(description)
        .color(COLOR_WARNING)
}

pub fn result_embed(tier: &JadeTier, cut: &SettledCut, luck: f64) -> CreateEmbed {
    let result = cut.result;
    let profit = result.profit(tier.price);
    let mut embed = if result.jackpot {
        CreateEmbed::new()
            .title("🎰 JACKPOT! 🎰")
            .description(format!(
                "# {0} **INCREDIBLE!** {0}\n\nYou found a rare treasure!\n**{1:.0}x JACKPOT MULTIPLIER!**",
                tier.emoji, result.multiplier
            ))
            .color(COLOR_GOLD)
    } else if profit > 0 {
        CreateEmbed::new()
            .title("✨ Profit!")
            .description(format!("{} You found something valuable inside the stone!", tier.emoji))
            .color(COLOR_GREEN)
    } else if profit == 0 {
        CreateEmbed::new()
            .title("😐 Break Even")
            .description(format!("{} Your money is back. No profit, no loss.", tier.emoji))
            .color(0xFFFF00)
    } else {
        CreateEmbed::new()
            .title("💔 Loss")
            .description(format!("{} Sadly, this stone was empty...", tier.emoji))
            .color(COLOR_ALERT)
    };
    embed = embed
        .field("💰 Investment", rp(tier.price), true)
        .field("💎 Result", rp(result.reward), true)
        .field(
            "📊 Profit/Loss",
            format!("**{} Rp** ({:.2}x)", signed(profit), result.multiplier),
            true,
        );
    if cut.tax > 0 {
        embed = embed.field(
            "🏛️ Jade tax (2%)",
            format!("-{} • received {}", rp(cut.tax), rp(cut.payout)),
            false,
        );
    }
    if luck > 0.0 {
        embed = embed.field(
            "🍀 Luck Bonus Active",
            format!("+{:.1}% luck improved your odds!", luck * 100.0),
            false,
        );
    }
    if !cut.unlocked.is_empty() {
        embed = embed.field("🏆 Achievement Unlocked!", achievement_lines(&cut.unlocked), false);
    }
    embed.footer(footer("Buy another stone from the jadeshop!"))
}

pub fn jackpot_announcement(user_id: u64, tier: &JadeTier, reward: i64, multiplier: f64) -> CreateEmbed {
    CreateEmbed::new()
        .title("🎉 JADE JACKPOT! 🎉")
        .description(format!(
            "<@{user_id}> hit a **{multiplier:.0}x** jackpot on a {} {}!\n💎 Prize: **{}**",
            tier.emoji,
            tier.name,
            rp(reward)
        ))
        .color(COLOR_GOLD)
}

pub fn stats_embed(name: &str, stats: &JadeStats, luck: f64) -> CreateEmbed {
    let win = win_rate(stats.total_wins, stats.total_cuts);
    let loss = win_rate(stats.total_losses, stats.total_cuts);
    let profit = stats.total_won - stats.total_spent;
    let roi = if stats.total_spent > 0 {
        profit as f64 / stats.total_spent as f64 * 100.0
    } else {
        0.0
    };
    CreateEmbed::new()
        .title(format!("📊 Jade Stats • {name}"))
        .color(if profit >= 0 { COLOR_GREEN } else { COLOR_ALERT })
        .field("💰 Total Spent", rp(stats.total_spent), true)
        .field("💎 Total Won", rp(stats.total_won), true)
        .field("🪨 Total Cuts", format!("{}x", stats.total_cuts), true)
        .field("📈 Wins", format!("{}x ({win:.1}%)", stats.total_wins), true)
        .field("📉 Losses", format!("{}x ({loss:.1}%)", stats.total_losses), true)
        .field("🎰 Jackpots", format!("{}x", stats.total_jackpots), true)
        .field("💹 Net Profit", format!("{} Rp ({roi:+.1}%)", signed(profit)), true)
        .field("🍀 Jade Luck", format!("+{:.1}%", luck * 100.0), true)
}

pub fn leaderboard_embed(board: JadeBoard, rows: &[JadeLeaderRow], prefix: &str) -> CreateEmbed {
    let body = if rows.is_empty() {
        "Nobody has cut a stone yet.".to_string()
    } else {
        rows.iter()
            .enumerate()
            .map(|(i, r)| {
                format!(
                    "{} {}\n   💰 Spent: {} | 💎 Won: {}\n   📊 W/L: {}/{} ({:.1}%) | 🎰 {}x | 📈 {}",
                    medal(i + 1),
                    mention(r.user_id),
                    rp(r.total_spent),
                    rp(r.total_won),
                    r.total_wins,
                    r.total_cuts - r.total_wins,
                    win_rate(r.total_wins, r.total_cuts),
                    r.total_jackpots,
                    signed(r.total_won - r.total_spent)
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    };
    CreateEmbed::new()
        .title(format!("🏆 Jade Leaderboard • {}", board.title()))
        .description(body)
        .color(COLOR_GOLD)
        .footer(footer(format!(
            "{prefix}jlb [profit|spent|won|cuts|jackpots|winrate]"
        )))
}

pub fn rates_embed(luck: f64) -> CreateEmbed {
    let mut embed = CreateEmbed::new()
        .title("🎲 Jade Rates")
        .description(format!("Odds with your luck bonus (**+{:.1}%**)", luck * 100.0))
        .color(0x50C878);
    for tier in JADE_TIERS {
        embed = embed.field(
            format!("{} {}", tier.emoji, tier.name),
            format!(
                "🎰 Jackpot: {:.2}% • 📈 Win: {:.1}% • 📉 Loss: {:.1}%\nWin range 1.05x to {}x",
                tier.adjusted_jackpot(luck) * 100.0,
                tier.win_chance(luck) * 100.0,
                tier.adjusted_loss(luck) * 100.0,
                tier.max_multi
            ),
            false,
        );
    }
    embed.footer(footer("Every point of luck lowers the loss rate by 0.1% (max 20%)"))
}
