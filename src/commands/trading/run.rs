//! Prefix entry points for trading: `market`, `buy`, `sell`, `portfolio`, `chart`,
//! `history`, `networth`, `convert` and `thelp`.

use super::logic::{
    Amount, BuyOutcome, CHART_DAYS, CHART_HEIGHT, CHART_WIDTH, SellOutcome, chart_stats, convert,
    execute_buy, execute_sell, rank_net_worth, render_chart, value_positions,
};
use super::ui;
use crate::AppState;
use crate::commands::common::{reply, say, show, target_or_author};
use crate::constants::LEADERBOARD_SIZE;
use crate::database;
use crate::error::{CommandError, CommandResult};
use crate::services::prices::{CRYPTOS, Crypto, find_crypto};
use crate::ui::style::{COLOR_INFO, help_embed};
use crate::util::{parse_f64, parse_i64, parse_limit, rp};
use chrono::Utc;
use serenity::builder::EditMessage;
use serenity::model::channel::Message;
use serenity::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

const AVAILABLE: &str = "💎 Available: btc, eth, bnb, sol, xrp, gold, silver";

fn lookup(raw: &str, prefix: &str) -> Result<&'static Crypto, CommandError> {
    find_crypto(raw).ok_or_else(|| {
        CommandError::bad(format!(
            "Crypto `{raw}` is not available! Check `{prefix}market` for the list."
        ))
    })
}

fn is_all(raw: &str) -> bool {
    raw.eq_ignore_ascii_case("all")
}

pub async fn run_market(ctx: &Context, msg: &Message, state: &Arc<AppState>) -> CommandResult {
    let mut loading = say(ctx, msg, "⏳ Fetching market data...").await?;
    let mut rows = Vec::with_capacity(CRYPTOS.len());
    for crypto in CRYPTOS {
        let quote = match state.prices.quote(crypto).await {
            Ok(q) => Some(q),
            Err(e) => {
                warn!(target: "trading.price", coin = crypto.symbol, error = %e, "market quote failed");
                None
            }
        };
        rows.push((crypto, quote));
    }
    let embed = ui::market_embed(&rows, &state.config.prefix);
    loading
        .edit(&ctx.http, EditMessage::new().content("").embed(embed))
        .await?;
    Ok(())
}

pub async fn run_buy(
    ctx: &Context,
    msg: &Message,
    state: &Arc<AppState>,
    args: &[&str],
) -> CommandResult {
    const USAGE: &str = "buy <crypto> <rupiah|all>";
    let [coin, raw, ..] = args else {
        return Err(CommandError::missing(USAGE));
    };
    let crypto = lookup(coin, &state.config.prefix)?;
    let spend = if is_all(raw) {
        Amount::All
    } else {
        Amount::Exact(parse_i64(raw)?)
    };
    let price = state.prices.quote(crypto).await?.price;
    match execute_buy(&state.db, msg.author.id, crypto, spend, price, Utc::now()).await? {
        BuyOutcome::Bought(fill) => {
            reply(ctx, msg, ui::buy_embed(crypto, &fill, &state.config.prefix)).await?;
            Ok(())
        }
        BuyOutcome::TooPoor { balance } => Err(CommandError::bad(format!(
            "Not enough balance! You have: {}",
            rp(balance)
        ))),
        BuyOutcome::Nothing => Err(CommandError::bad("The amount must be more than 0!")),
    }
}

pub async fn run_sell(
    ctx: &Context,
    msg: &Message,
    state: &Arc<AppState>,
    args: &[&str],
) -> CommandResult {
    const USAGE: &str = "sell <crypto> <amount|all>";
    let [coin, raw, ..] = args else {
        return Err(CommandError::missing(USAGE));
    };
    let crypto = lookup(coin, &state.config.prefix)?;
    let amount = if is_all(raw) {
        Amount::All
    } else {
        Amount::Exact(parse_f64(raw)?)
    };
    let price = state.prices.quote(crypto).await?.price;
    match execute_sell(&state.db, msg.author.id, crypto, amount, price, Utc::now()).await? {
        SellOutcome::Sold { fill, unlocked } => {
            let mut embed = ui::sell_embed(crypto, &fill, &state.config.prefix);
            if !unlocked.is_empty() {
                embed = embed.field(
                    "🏆 Achievement Unlocked!",
                    crate::commands::fishing::ui::achievement_lines(&unlocked),
                    false,
                );
            }
            reply(ctx, msg, embed).await?;
            Ok(())
        }
        SellOutcome::NoHolding => Err(CommandError::bad(format!(
            "You don't own any {}!",
            crypto.ticker()
        ))),
        SellOutcome::Short { held } => Err(CommandError::bad(format!(
            "Not enough to sell!\nYou have: {held:.8} {}",
            crypto.ticker()
        ))),
        SellOutcome::Nothing => Err(CommandError::bad("The amount must be more than 0!")),
    }
}

pub async fn run_portfolio(
    ctx: &Context,
    msg: &Message,
    state: &Arc<AppState>,
    args: &[&str],
) -> CommandResult {
    let user = target_or_author(ctx, msg, args.first()).await?;
    let cash = database::users::get_or_create_user(&state.db, user.id)
        .await?
        .currency;
    let holdings = database::trading::holdings(&state.db, user.id).await?;
    let mut quotes = HashMap::new();
    for holding in &holdings {
        if let Some(crypto) = super::logic::crypto_for_ticker(&holding.crypto_symbol) {
            quotes.insert(crypto.symbol, state.prices.quote(crypto).await?);
        }
    }
    let positions = value_positions(holdings, &quotes);
    reply(
        ctx,
        msg,
        ui::portfolio_embed(&user.name, cash, &positions, &state.config.prefix),
    )
    .await?;
    Ok(())
}

pub async fn run_chart(
    ctx: &Context,
    msg: &Message,
    state: &Arc<AppState>,
    args: &[&str],
) -> CommandResult {
    const USAGE: &str = "chart <crypto> [1|7|30|90]";
    let coin = args.first().ok_or(CommandError::missing(USAGE))?;
    let crypto = lookup(coin, &state.config.prefix)?;
    let days = match args.get(1) {
        Some(raw) => parse_i64(raw)?,
        None => 7,
    };
    let days = u32::try_from(days)
        .ok()
        .filter(|d| CHART_DAYS.contains(d))
        .ok_or_else(|| CommandError::bad("Days must be one of 1, 7, 30 or 90!"))?;

    let mut loading = say(
        ctx,
        msg,
        format!("⏳ Fetching {} chart for {days} day(s)...", crypto.ticker()),
    )
    .await?;
    let prices = state.prices.market_chart(crypto, days).await?;
    let Some(stats) = chart_stats(&prices) else {
        loading
            .edit(&ctx.http, EditMessage::new().content("❌ No chart data available!"))
            .await?;
        return Ok(());
    };
    let chart = render_chart(&prices, CHART_HEIGHT, CHART_WIDTH);
    loading
        .edit(
            &ctx.http,
            EditMessage::new()
                .content("")
                .embed(ui::chart_embed(crypto, days, &chart, &stats)),
        )
        .await?;
    Ok(())
}

pub async fn run_history(
    ctx: &Context,
    msg: &Message,
    state: &Arc<AppState>,
    args: &[&str],
) -> CommandResult {
    let limit = parse_limit(args.first(), 10, 50)?;
    let trades = database::trading::recent_trades(&state.db, msg.author.id, limit).await?;
    if trades.is_empty() {
        return Err(CommandError::bad("📭 No trading history yet!"));
    }
    reply(ctx, msg, ui::history_embed(&msg.author.name, &trades)).await?;
    Ok(())
}

pub async fn run_networth(ctx: &Context, msg: &Message, state: &Arc<AppState>) -> CommandResult {
    let traders = database::trading::traders(&state.db).await?;
    if traders.is_empty() {
        return Err(CommandError::bad("📭 Nobody owns any crypto yet!"));
    }
    let mut prompt = say(ctx, msg, "⏳ Valuing portfolios...").await?;
    let positions = database::trading::all_positions(&state.db).await?;
    let quotes: HashMap<_, _> = state
        .prices
        .quotes()
        .await
        .into_iter()
        .map(|(c, q)| (c.symbol, q))
        .collect();
    let mut rows = rank_net_worth(&traders, &positions, &quotes);
    rows.truncate(LEADERBOARD_SIZE as usize);
    show(ctx, &mut prompt, ui::networth_embed(&rows)).await;
    Ok(())
}

pub async fn run_convert(
    ctx: &Context,
    msg: &Message,
    state: &Arc<AppState>,
    args: &[&str],
) -> CommandResult {
    const USAGE: &str = "convert <amount> <from> <to>";
    let [raw, from, to, ..] = args else {
        return Err(CommandError::missing(USAGE));
    };
    let amount = parse_f64(raw)?;
    let from = lookup(from, &state.config.prefix)?;
    let to = lookup(to, &state.config.prefix)?;
    let from_price = state.prices.quote(from).await?.price;
    let to_price = state.prices.quote(to).await?.price;
    let (idr_value, out) = convert(amount, from_price, to_price);
    reply(ctx, msg, ui::convert_embed(amount, from, to, idr_value, out)).await?;
    Ok(())
}

pub async fn run_trading_help(ctx: &Context, msg: &Message, state: &Arc<AppState>) -> CommandResult {
    let p = &state.config.prefix;
    let embed = help_embed(
        "📈 Mochi Exchange - Trading Guide",
        "Trade crypto and commodities with live IDR prices.",
        COLOR_INFO,
        &[
            (
                "💹 Trading",
                format!(
                    "`{p}market` - Live prices\n`{p}buy <crypto> <rupiah|all>` - Buy with Rupiah\n`{p}sell <crypto> <amount|all>` - Sell coins\n`{p}portfolio [@user]` - Your assets\n`{p}chart <crypto> [1|7|30|90]` - Price chart"
                ),
            ),
            (
                "🧰 Advanced",
                format!(
                    "`{p}history [n]` - Recent trades\n`{p}alert <crypto> <above|below> <price>` - DM on a price\n`{p}alerts` / `{p}delalert <n>` - Manage alerts\n`{p}networth` - Richest traders\n`{p}convert <amount> <from> <to>` - Convert coins"
                ),
            ),
            (
                "🏛️ Taxes",
                "0.1% on every buy and sell. Level 20+ trades tax free.".to_string(),
            ),
            ("💎 Assets", AVAILABLE.to_string()),
        ],
    );
    reply(ctx, msg, embed).await?;
    Ok(())
}
