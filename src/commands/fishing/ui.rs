//! Embeds for the fishing commands.

use super::data::{FISH, Fish, Rarity, UpgradeKind, find_fish};
use super::logic::{FishBoard, FishMarket, SaleReceipt, catch_tier, total_weight, adjusted_weight};
use crate::commands::achievements::logic::Achievement;
use crate::commands::common::mention;
use crate::constants::FISH_MARKET_REFRESH_MINS;
use crate::ui::style::{COLOR_GOLD, COLOR_GREEN, COLOR_INFO, COLOR_WARNING, footer};
use crate::util::{format_duration, medal, rp, thousands};
use chrono::{Duration, Utc};
use serenity::builder::CreateEmbed;

pub fn catch_embed(
    haul: &[(&'static Fish, i64)],
    market: &FishMarket,
    in_voice: bool,
    auto: bool,
    unlocked: &[&'static Achievement],
) -> CreateEmbed {
    let mut lines = String::new();
    let mut total = 0;
    for (fish, amount) in haul {
        let value = market.price_of(fish.name) * amount;
        total += value;
        lines.push_str(&format!(
            "{} **{}** x{} ({})\n",
            fish.emoji,
            fish.name,
            amount,
            rp(value)
        ));
    }
    let title = if auto { "🤖 Auto-Fishing!" } else { "🎣 Fishing Results!" };
    let mut embed = CreateEmbed::new()
        .title(title)
        .description(lines)
        .color(COLOR_INFO);
    if in_voice {
        embed = embed.field("🎤 Voice Bonus", "**+150%** casts (2.5x) and bigger stacks!", false);
    }
    embed = embed
        .field("💰 Total Value", rp(total), true)
        .field("🎒 Inventory", "Use `inventory`", true);
    if !unlocked.is_empty() {
        embed = embed.field("🏆 Achievement Unlocked!", achievement_lines(unlocked), false);
    }
    let tip = if in_voice {
        "Sell with sellfish • Prices change every 15 minutes!"
    } else {
        "💡 Join a voice channel for +150% fish! • Prices change every 15 minutes!"
    };
    embed.footer(footer(tip))
}

pub fn achievement_lines(unlocked: &[&'static Achievement]) -> String {
    unlocked
        .iter()
        .map(|a| format!("{} **{}** (+{} luck, +{})", a.emoji, a.name, a.luck, rp(a.currency)))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn inventory_embed(owner: &str, stacks: &[(String, i64)], market: &FishMarket) -> CreateEmbed {
    let mut embed = CreateEmbed::new()
        .title(format!("🎒 {owner}'s Fish Inventory"))
        .color(COLOR_INFO);
    if stacks.is_empty() {
        return embed.description("No fish yet. Go `fish`!");
    }
    let mut grand_total = 0;
    for rarity in Rarity::ALL {
        let lines: Vec<String> = stacks
            .iter()
            .filter_map(|(name, amount)| {
                let fish = find_fish(name)?;
                (fish.rarity == rarity).then(|| {
                    let value = market.price_of(name) * amount;
                    grand_total += value;
                    format!("{} {} x{} • {}", fish.emoji, fish.name, amount, rp(value))
                })
            })
            .collect();
        if !lines.is_empty() {
            embed = embed.field(rarity.label(), lines.join("\n"), false);
        }
    }
    let count: i64 = stacks.iter().map(|(_, a)| a).sum();
    embed
        .field("🐟 Total Fish", thousands(count), true)
        .field("💰 Market Value", rp(grand_total), true)
        .footer(footer("sellfish <fish> <amount|all> • sellfish all • 25% market fee"))
}

pub fn sale_embed(receipt: &SaleReceipt) -> CreateEmbed {
    let lines = receipt
        .lines
        .iter()
        .map(|(name, amount, value)| format!("• {name} x{amount} = {}", rp(*value)))
        .collect::<Vec<_>>()
        .join("\n");
    CreateEmbed::new()
        .title("💰 Fish Sold!")
        .description(lines)
        .color(COLOR_GREEN)
        .field("💵 Gross", rp(receipt.gross), true)
        .field("📉 Market fee", format!("-{}", rp(receipt.tax)), true)
        .field("✅ Received", rp(receipt.net), true)
        .footer(footer("Prices update every 15 minutes"))
}

pub fn market_embed(market: &FishMarket) -> CreateEmbed {
    let mut embed = CreateEmbed::new()
        .title("📊 Fish Market")
        .description("Current prices per fish")
        .color(COLOR_GOLD);
    for rarity in Rarity::ALL {
        let lines: Vec<String> = FISH
            .iter()
            .filter(|f| f.rarity == rarity)
            .map(|f| {
                let price = market.price_of(f.name);
                let trend = match price.cmp(&f.base_price) {
                    std::cmp::Ordering::Greater => "📈",
                    std::cmp::Ordering::Less => "📉",
                    std::cmp::Ordering::Equal => "➖",
                };
                format!("{} {} • {} {}", f.emoji, f.name, rp(price), trend)
            })
            .collect();
        embed = embed.field(rarity.label(), lines.join("\n"), false);
    }
    let next = market.updated_at + Duration::minutes(FISH_MARKET_REFRESH_MINS as i64) - Utc::now();
    embed.footer(footer(format!(
        "Next update in ~{} • 25% market fee on sales",
        format_duration(next.max(Duration::zero()))
    )))
}

pub fn upgrades_embed(levels: (i64, i64, i64), currency: i64) -> CreateEmbed {
    let (rod, robot, net) = levels;
    let mut embed = CreateEmbed::new()
        .title("⚙️ Fishing Upgrades")
        .description(format!("Balance: **{}**", rp(currency)))
        .color(COLOR_INFO);
    for (kind, level) in [(UpgradeKind::Rod, rod), (UpgradeKind::Robot, robot), (UpgradeKind::Net, net)] {
        let next = if level >= kind.max_level() {
            "**MAX**".to_string()
        } else {
            format!("Next: {}", rp(kind.cost(level)))
        };
        embed = embed.field(
            format!("{} {} (Lv.{}/{})", kind.emoji(), kind.name(), level, kind.max_level()),
            format!("{}\n{}", kind.description(), next),
            false,
        );
    }
    embed.footer(footer("fishupgrade <rod|robot|net>"))
}

pub fn stats_embed(
    name: &str,
    total_caught: i64,
    levels: (i64, i64, i64),
    stacks: &[(String, i64)],
    market: &FishMarket,
) -> CreateEmbed {
    let (rod, robot, net) = levels;
    let held: i64 = stacks.iter().map(|(_, a)| a).sum();
    CreateEmbed::new()
        .title(format!("📊 Fishing Stats • {name}"))
        .color(COLOR_INFO)
        .field("🎣 Total Caught", thousands(total_caught), true)
        .field("🎒 In Inventory", thousands(held), true)
        .field("🐠 Species", stacks.len().to_string(), true)
        .field("💰 Inventory Value", rp(market.value_of(stacks)), true)
        .field(
            "⚙️ Upgrades",
            format!("🎣 Rod Lv.{rod}\n🤖 Robot Lv.{robot}\n🕸️ Net Lv.{net}"),
            true,
        )
}

pub fn rates_embed(rod_level: i64) -> CreateEmbed {
    let total = total_weight(rod_level);
    let mut embed = CreateEmbed::new()
        .title("🎲 Fish Catch Rates")
        .description(format!("With your rod at **Lv.{rod_level}**"))
        .color(COLOR_INFO);
    for rarity in Rarity::ALL {
        let lines: Vec<String> = FISH
            .iter()
            .filter(|f| f.rarity == rarity)
            .map(|f| {
                format!(
                    "{} {} • {:.2}%",
                    f.emoji,
                    f.name,
                    adjusted_weight(f, rod_level) / total * 100.0
                )
            })
            .collect();
        embed = embed.field(rarity.label(), lines.join("\n"), true);
    }
    let (casts, amounts) = catch_tier(rod_level);
    embed.field(
        "📦 Per cast session",
        format!(
            "{}-{} catches, {}-{} fish each",
            casts.start(),
            casts.end(),
            amounts.start(),
            amounts.end()
        ),
        false,
    )
}

pub fn leaderboard_embed(board: FishBoard, rows: &[(i64, i64, i64, i64)]) -> CreateEmbed {
    let title = match board {
        FishBoard::Caught => "🏆 Fishing Leaderboard • Total Caught",
        FishBoard::Value => "🏆 Fishing Leaderboard • Inventory Value",
        FishBoard::Unique => "🏆 Fishing Leaderboard • Unique Species",
    };
    let body = if rows.is_empty() {
        "Nobody has fished yet.".to_string()
    } else {
        rows.iter()
            .enumerate()
            .map(|(i, (user, caught, value, unique))| {
                let stat = match board {
                    FishBoard::Caught => format!("{} fish", thousands(*caught)),
                    FishBoard::Value => rp(*value),
                    FishBoard::Unique => format!("{unique}/{} species", FISH.len()),
                };
                format!("{} {} • {}", medal(i + 1), mention(*user), stat)
            })
            .collect::<Vec<_>>()
            .join("\n")
    };
    CreateEmbed::new()
        .title(title)
        .description(body)
        .color(COLOR_GOLD)
        .footer(footer("flb <caught|value|unique>"))
}

fn versus(a: i64, b: i64) -> (&'static str, &'static str) {
    match a.cmp(&b) {
        std::cmp::Ordering::Greater => ("🥇", "🥈"),
        std::cmp::Ordering::Less => ("🥈", "🥇"),
        std::cmp::Ordering::Equal => ("🤝", "🤝"),
    }
}

/// `stats` rows are `(label, a, b)`.
pub fn compare_embed(
    a: (u64, &str),
    b: (u64, &str),
    stats: &[(&str, i64, i64)],
    points: (f64, f64),
) -> CreateEmbed {
    let mut embed = CreateEmbed::new().title("⚖️ Fishing Stats Comparison");
    for (label, x, y) in stats {
        let (ma, mb) = versus(*x, *y);
        embed = embed.field(
            *label,
            format!("<@{}>: **{}** {ma}\n<@{}>: **{}** {mb}", a.0, thousands(*x), b.0, thousands(*y)),
            false,
        );
    }
    let (result, color) = if points.0 > points.1 {
        (format!("🏆 **Overall Winner**: {}", a.1), COLOR_GREEN)
    } else if points.1 > points.0 {
        (format!("🏆 **Overall Winner**: {}", b.1), COLOR_GREEN)
    } else {
        ("🤝 **It's a tie!**".to_string(), COLOR_WARNING)
    };
    embed
        .field("🏆 Result", format!("{result}\n{} : {}", points.0, points.1), false)
        .color(color)
        .footer(footer("Keep fishing to improve your stats! 🎣"))
}
