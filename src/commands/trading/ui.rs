//! Embeds for the trading commands.

use super::logic::{BuyFill, ChartStats, NetWorthRow, Position, SellFill};
use crate::commands::common::mention;
use crate::database::models::TradeRecord;
use crate::services::prices::{Crypto, Quote};
use crate::ui::style::{COLOR_ALERT, COLOR_GREEN, COLOR_INFO, COLOR_PURPLE, COLOR_SUCCESS, footer};
use crate::util::{medal, rp, thousands_f};
use serenity::builder::CreateEmbed;

fn idr(value: f64) -> String {
    format!("Rp {}", thousands_f(value, 0))
}

fn signed_pct(pct: f64) -> String {
    format!("{pct:+.2}%")
}

fn signed_idr(value: f64) -> String {
    if value >= 0.0 {
        format!("+{}", thousands_f(value, 0))
    } else {
        thousands_f(value, 0)
    }
}

fn trend(value: f64) -> &'static str {
    if value >= 0.0 { "📈" } else { "📉" }
}

pub fn market_embed(quotes: &[(&'static Crypto, Option<Quote>)], prefix: &str) -> CreateEmbed {
    let body = quotes
        .iter()
        .map(|(crypto, quote)| match quote {
            Some(q) => format!(
                "{} **{}** | {}\n     └─ 24h: {}",
                trend(q.change_24h),
                crypto.ticker(),
                idr(q.price),
                signed_pct(q.change_24h)
            ),
            None => format!("⚠️ **{}** | Error fetching price", crypto.ticker()),
        })
        .collect::<Vec<_>>()
        .join("\n\n");
    CreateEmbed::new()
        .title("📊 Crypto Market - Mochi Exchange")
        .description(body)
        .color(COLOR_SUCCESS)
        .footer(footer(format!(
            "Type {prefix}buy or {prefix}sell to trade • Data from CoinGecko"
        )))
}

pub fn buy_embed(crypto: &Crypto, fill: &BuyFill, prefix: &str) -> CreateEmbed {
    let embed = CreateEmbed::new()
        .title("✅ Purchase Complete!")
        .color(COLOR_SUCCESS)
        .field("Crypto", format!("{} ({})", crypto.ticker(), crypto.name), true)
        .field("Price/unit", idr(fill.price), true)
        .field("Amount", format!("{:.8}", fill.amount), true)
        .field("💵 Total Paid", rp(fill.spent), true);
    let embed = if fill.tax > 0 {
        embed.field("🏛️ Tax (0.1%)", rp(fill.tax), true)
    } else {
        embed.field("🏛️ Tax Status", "**TAX FREE**", true)
    };
    embed
        .field("💎 Net for Crypto", rp(fill.net), true)
        .footer(footer(format!("Use {prefix}portfolio to see your assets")))
}

pub fn sell_embed(crypto: &Crypto, fill: &SellFill, prefix: &str) -> CreateEmbed {
    let color = if fill.profit_loss >= 0.0 { COLOR_SUCCESS } else { COLOR_ALERT };
    let embed = CreateEmbed::new()
        .title("✅ Sale Complete!")
        .color(color)
        .field("Crypto", format!("{} ({})", crypto.ticker(), crypto.name), true)
        .field("Amount", format!("{:.8}", fill.amount), true)
        .field("Price/unit", idr(fill.price), true)
        .field("💵 Gross", rp(fill.gross), true);
    let embed = if fill.tax > 0 {
        embed.field("🏛️ Tax (0.1%)", rp(fill.tax), true)
    } else {
        embed.field("🏛️ Tax Status", "**TAX FREE**", true)
    };
    embed
        .field("💰 Net Received", rp(fill.net), true)
        .field(
            "📊 Profit/Loss",
            format!(
                "**{} Rp** ({})",
                signed_idr(fill.profit_loss),
                signed_pct(fill.profit_pct)
            ),
            false,
        )
        .footer(footer(format!("Use {prefix}portfolio to see your assets")))
}

pub fn portfolio_embed(name: &str, cash: i64, positions: &[Position], prefix: &str) -> CreateEmbed {
    if positions.is_empty() {
        return CreateEmbed::new()
            .title(format!("💼 Portfolio • {name}"))
            .description(format!("No crypto yet. Start trading with `{prefix}buy`!"))
            .color(COLOR_ALERT)
            .field("💰 Cash", rp(cash), false);
    }
    let body = positions
        .iter()
        .map(|p| {
            format!(
                "**{}** ({})\n├─ Amount: `{:.8}`\n├─ Buy price: `{}`\n├─ Now: `{}`\n├─ Value: `{}`\n└─ {} P/L: `{}` ({})",
                p.crypto.ticker(),
                p.crypto.name,
                p.holding.amount,
                idr(p.holding.avg_buy_price),
                idr(p.price),
                idr(p.value()),
                trend(p.profit_loss()),
                signed_idr(p.profit_loss()),
                signed_pct(p.profit_pct())
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");
    let value: f64 = positions.iter().map(Position::value).sum();
    let invested: f64 = positions.iter().map(Position::invested).sum();
    let pl = value - invested;
    let pl_pct = if invested > 0.0 { pl / invested * 100.0 } else { 0.0 };
    CreateEmbed::new()
        .title(format!("💼 Portfolio • {name}"))
        .description(body)
        .color(if pl >= 0.0 { COLOR_SUCCESS } else { COLOR_ALERT })
        .field(
            "📊 Summary",
            format!(
                "💰 **Cash**: {}\n💎 **Crypto value**: {}\n🎯 **Invested**: {}\n{} **Total P/L**: {} ({})\n💵 **Net Worth**: {}",
                rp(cash),
                idr(value),
                idr(invested),
                trend(pl),
                signed_idr(pl),
                signed_pct(pl_pct),
                rp(cash + value as i64)
            ),
            false,
        )
        .footer(footer(format!(
            "Use {prefix}market for prices • Live data from CoinGecko"
        )))
}

pub fn chart_embed(crypto: &Crypto, days: u32, chart: &str, stats: &ChartStats) -> CreateEmbed {
    let change = stats.change_pct();
    CreateEmbed::new()
        .title(format!("{} {} Chart - {days} day(s)", trend(change), crypto.ticker()))
        .description(format!("```\n{chart}\n```"))
        .color(if change >= 0.0 { COLOR_SUCCESS } else { COLOR_ALERT })
        .field(
            "📊 Statistics",
            format!(
                "**Current**: {}\n**Change**: {}\n**High**: {}\n**Low**: {}",
                idr(stats.current),
                signed_pct(change),
                idr(stats.high),
                idr(stats.low)
            ),
            false,
        )
        .footer(footer(format!("Data from CoinGecko • last {days} day(s)")))
}

pub fn history_embed(name: &str, trades: &[TradeRecord]) -> CreateEmbed {
    let body = trades
        .iter()
        .map(|t| {
            let side = if t.trade_type == "buy" { "🟢 BUY" } else { "🔴 SELL" };
            let last = match t.profit_loss {
                Some(pl) => format!("└─ {} P/L: `{}`", trend(pl), signed_idr(pl)),
                None => format!("└─ Total: `{}`", idr(t.total)),
            };
            format!(
                "{side} **{}** • <t:{}:R>\n├─ Amount: `{:.6}`\n├─ Price: `{}`\n{last}",
                t.crypto_symbol,
                t.timestamp.timestamp(),
                t.amount,
                idr(t.price)
            )
        })
        .collect::<Vec<_>>();
    // Embed descriptions cap at 4096 characters.
    let mut text = String::new();
    let mut shown = 0;
    for entry in body {
        if text.len() + entry.len() + 2 > 4000 {
            break;
        }
        text.push_str(&entry);
        text.push_str("\n\n");
        shown += 1;
    }
    CreateEmbed::new()
        .title(format!("📜 Trading History • {name}"))
        .description(text)
        .color(COLOR_INFO)
        .footer(footer(format!("Showing last {shown} trades")))
}

pub fn networth_embed(rows: &[NetWorthRow]) -> CreateEmbed {
    let body = rows
        .iter()
        .enumerate()
        .map(|(i, r)| {
            format!(
                "{} {}\n├─ Net Worth: `{}`\n├─ Cash: `{}`\n└─ Crypto: `{}`",
                medal(i + 1),
                mention(r.user_id),
                rp(r.total()),
                rp(r.cash),
                rp(r.assets)
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");
    CreateEmbed::new()
        .title("💎 Net Worth Leaderboard")
        .description(format!("Top traders by total assets (cash + crypto)\n\n{body}"))
        .color(COLOR_GREEN)
        .footer(footer("Trade smart, get rich! 💰"))
}

pub fn convert_embed(amount: f64, from: &Crypto, to: &Crypto, idr_value: f64, out: f64) -> CreateEmbed {
    CreateEmbed::new()
        .title("💱 Crypto Converter")
        .color(COLOR_PURPLE)
        .field("From", format!("`{amount:.6}` {}\n= {}", from.ticker(), idr(idr_value)), true)
        .field("To", format!("`{out:.6}` {}\n= {}", to.ticker(), idr(idr_value)), true)
        .footer(footer("Live prices from CoinGecko"))
}
