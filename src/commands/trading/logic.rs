//! Buy/sell fills, portfolio valuation and the ASCII price chart.

use crate::commands::achievements::logic::{Achievement, Metric, check_achievement_progress};
use crate::commands::quests::logic::{QuestKind, update_quest_progress};
use crate::commands::tax::logic::{TaxKind, calculate_transaction_tax};
use crate::database::models::Holding;
use crate::database::{self, DbPool};
use crate::services::prices::{CRYPTOS, Crypto, Quote};
use chrono::{DateTime, Utc};
use serenity::model::id::UserId;
use std::collections::HashMap;
use tracing::{info, instrument};

pub const CHART_HEIGHT: usize = 12;
pub const CHART_WIDTH: usize = 35;
pub const CHART_DAYS: [u32; 4] = [1, 7, 30, 90];

/// How much of something a command asked for: a number or `all`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Amount<T> {
    All,
    Exact(T),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BuyFill {
    pub spent: i64,
    pub tax: i64,
    pub net: i64,
    pub amount: f64,
    pub price: f64,
}

/// The tax is taken out of the spend; only the remainder buys coins.
pub fn buy_fill(spend: i64, price: f64, level: i64) -> BuyFill {
    let (tax, net) = calculate_transaction_tax(spend, TaxKind::TradingBuy, level);
    BuyFill {
        spent: spend,
        tax,
        net,
        amount: net as f64 / price,
        price,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SellFill {
    pub amount: f64,
    pub price: f64,
    pub gross: i64,
    pub tax: i64,
    pub net: i64,
    pub profit_loss: f64,
    pub profit_pct: f64,
}

pub fn sell_fill(amount: f64, price: f64, avg_buy_price: f64, level: i64) -> SellFill {
    let gross = (price * amount).floor() as i64;
    let (tax, net) = calculate_transaction_tax(gross, TaxKind::TradingSell, level);
    let profit_pct = if avg_buy_price > 0.0 {
        (price - avg_buy_price) / avg_buy_price * 100.0
    } else {
        0.0
    };
    SellFill {
        amount,
        price,
        gross,
        tax,
        net,
        profit_loss: (price - avg_buy_price) * amount,
        profit_pct,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BuyOutcome {
    Bought(BuyFill),
    TooPoor { balance: i64 },
    Nothing,
}

#[instrument(level = "info", skip(pool, crypto), fields(coin = crypto.symbol))]
pub async fn execute_buy(
    pool: &DbPool,
    user_id: UserId,
    crypto: &Crypto,
    spend: Amount<i64>,
    price: f64,
    now: DateTime<Utc>,
) -> Result<BuyOutcome, sqlx::Error> {
    let profile = database::users::get_or_create_user(pool, user_id).await?;
    let spend = match spend {
        Amount::All => profile.currency,
        Amount::Exact(v) => v,
    };
    if spend <= 0 {
        return Ok(BuyOutcome::Nothing);
    }
    let fill = buy_fill(spend, price, profile.level);
    let ticker = crypto.ticker();

    let mut tx = pool.begin().await?;
    if !database::users::add_currency(&mut *tx, user_id, -spend).await? {
        tx.rollback().await?;
        return Ok(BuyOutcome::TooPoor {
            balance: profile.currency,
        });
    }
    database::trading::add_to_position(&mut *tx, user_id, &ticker, fill.amount, price).await?;
    database::trading::record_trade(
        &mut *tx,
        user_id,
        "buy",
        &ticker,
        fill.amount,
        price,
        spend as f64,
        None,
        now,
    )
    .await?;
    if fill.tax > 0 {
        database::tax::record_tax(&mut *tx, user_id, TaxKind::TradingBuy.as_str(), fill.tax, now)
            .await?;
    }
    tx.commit().await?;
    info!(target: "trading.trade", user = user_id.get(), coin = crypto.symbol, spend, amount = fill.amount, "buy filled");
    Ok(BuyOutcome::Bought(fill))
}

#[derive(Debug)]
pub enum SellOutcome {
    Sold {
        fill: SellFill,
        unlocked: Vec<&'static Achievement>,
    },
    NoHolding,
    Short {
        held: f64,
    },
    Nothing,
}

#[instrument(level = "info", skip(pool, crypto), fields(coin = crypto.symbol))]
pub async fn execute_sell(
    pool: &DbPool,
    user_id: UserId,
    crypto: &Crypto,
    amount: Amount<f64>,
    price: f64,
    now: DateTime<Utc>,
) -> Result<SellOutcome, sqlx::Error> {
    let ticker = crypto.ticker();
    let profile = database::users::get_or_create_user(pool, user_id).await?;

    let mut tx = pool.begin().await?;
    let Some(holding) = database::trading::holding(&mut *tx, user_id, &ticker).await? else {
        tx.rollback().await?;
        return Ok(SellOutcome::NoHolding);
    };
    let amount = match amount {
        Amount::All => holding.amount,
        Amount::Exact(v) => v,
    };
    if amount <= 0.0 {
        tx.rollback().await?;
        return Ok(SellOutcome::Nothing);
    }
    if amount > holding.amount {
        tx.rollback().await?;
        return Ok(SellOutcome::Short {
            held: holding.amount,
        });
    }
    let fill = sell_fill(amount, price, holding.avg_buy_price, profile.level);

    database::trading::reduce_position(&mut tx, user_id, &ticker, amount).await?;
    database::users::add_currency(&mut *tx, user_id, fill.net).await?;
    database::trading::record_trade(
        &mut *tx,
        user_id,
        "sell",
        &ticker,
        amount,
        price,
        fill.gross as f64,
        Some(fill.profit_loss),
        now,
    )
    .await?;
    if fill.tax > 0 {
        database::tax::record_tax(&mut *tx, user_id, TaxKind::TradingSell.as_str(), fill.tax, now)
            .await?;
    }
    let realized = database::trading::realized_profit(&mut *tx, user_id).await?;
    tx.commit().await?;

    if fill.profit_loss > 0.0 {
        update_quest_progress(pool, user_id, QuestKind::TradeProfit, fill.profit_loss as i64).await;
    }
    let unlocked =
        check_achievement_progress(pool, user_id, Metric::TradingProfit, realized.max(0.0) as i64)
            .await?;
    info!(target: "trading.trade", user = user_id.get(), coin = crypto.symbol, amount, pl = fill.profit_loss, "sell filled");
    Ok(SellOutcome::Sold { fill, unlocked })
}

/// One open position valued at the current price.
#[derive(Debug, Clone)]
pub struct Position {
    pub crypto: &'static Crypto,
    pub holding: Holding,
    pub price: f64,
}

impl Position {
    pub fn value(&self) -> f64 {
        self.price * self.holding.amount
    }

    pub fn invested(&self) -> f64 {
        self.holding.avg_buy_price * self.holding.amount
    }

    pub fn profit_loss(&self) -> f64 {
        self.value() - self.invested()
    }

    pub fn profit_pct(&self) -> f64 {
        if self.holding.avg_buy_price > 0.0 {
            (self.price - self.holding.avg_buy_price) / self.holding.avg_buy_price * 100.0
        } else {
            0.0
        }
    }
}

pub fn crypto_for_ticker(ticker: &str) -> Option<&'static Crypto> {
    CRYPTOS.iter().find(|c| c.ticker() == ticker)
}

/// Pairs holdings with quotes. Holdings without a quote are skipped.
pub fn value_positions(holdings: Vec<Holding>, quotes: &HashMap<&'static str, Quote>) -> Vec<Position> {
    holdings
        .into_iter()
        .filter_map(|holding| {
            let crypto = crypto_for_ticker(&holding.crypto_symbol)?;
            let price = quotes.get(crypto.symbol)?.price;
            Some(Position {
                crypto,
                holding,
                price,
            })
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetWorthRow {
    pub user_id: i64,
    pub cash: i64,
    pub assets: i64,
}

impl NetWorthRow {
    pub fn total(&self) -> i64 {
        self.cash + self.assets
    }
}

/// Cash plus crypto value of every trader, richest first.
pub fn rank_net_worth(
    traders: &[(i64, i64)],
    positions: &[(i64, String, f64)],
    quotes: &HashMap<&'static str, Quote>,
) -> Vec<NetWorthRow> {
    let mut rows: Vec<NetWorthRow> = traders
        .iter()
        .map(|&(user_id, cash)| {
            let assets: f64 = positions
                .iter()
                .filter(|(uid, _, _)| *uid == user_id)
                .filter_map(|(_, ticker, amount)| {
                    let crypto = crypto_for_ticker(ticker)?;
                    Some(quotes.get(crypto.symbol)?.price * amount)
                })
                .sum();
            NetWorthRow {
                user_id,
                cash,
                assets: assets as i64,
            }
        })
        .collect();
    rows.sort_by(|a, b| b.total().cmp(&a.total()));
    rows
}

/// `(value in IDR, amount of the target coin)`.
pub fn convert(amount: f64, from_price: f64, to_price: f64) -> (f64, f64) {
    let idr = amount * from_price;
    (idr, idr / to_price)
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartStats {
    pub current: f64,
    pub start: f64,
    pub high: f64,
    pub low: f64,
}

impl ChartStats {
    pub fn change_pct(&self) -> f64 {
        if self.start > 0.0 {
            (self.current - self.start) / self.start * 100.0
        } else {
            0.0
        }
    }
}

pub fn chart_stats(prices: &[f64]) -> Option<ChartStats> {
    let (&start, &current) = (prices.first()?, prices.last()?);
    let high = prices.iter().copied().fold(f64::MIN, f64::max);
    let low = prices.iter().copied().fold(f64::MAX, f64::min);
    Some(ChartStats {
        current,
        start,
        high,
        low,
    })
}

/// Column chart: `●` marks each sample's row, `│` fills below it.
/// Longer series are down-sampled to `width` columns by a fixed step.
pub fn render_chart(prices: &[f64], height: usize, width: usize) -> String {
    if prices.is_empty() || height == 0 {
        return String::new();
    }
    let stats = chart_stats(prices);
    let (low, high) = stats.map_or((0.0, 0.0), |s| (s.low, s.high));
    let range = high - low;
    let mut rows: Vec<usize> = prices
        .iter()
        .map(|p| {
            if range == 0.0 {
                height / 2
            } else {
                (((p - low) / range) * (height - 1) as f64) as usize
            }
        })
        .collect();
    if rows.len() > width && width > 0 {
        let step = rows.len() / width;
        rows = (0..width).map(|i| rows[i * step]).collect();
    }
    (0..height)
        .rev()
        .map(|y| {
            rows.iter()
                .map(|&r| match r.cmp(&y) {
                    std::cmp::Ordering::Equal => '●',
                    std::cmp::Ordering::Greater => '│',
                    std::cmp::Ordering::Less => ' ',
                })
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buy_tax_comes_out_of_spend() {
        let fill = buy_fill(1_000_000, 500_000.0, 5);
        assert_eq!(fill.tax, 1_000);
        assert_eq!(fill.net, 999_000);
        assert!((fill.amount - 1.998).abs() < 1e-9);
        assert_eq!(buy_fill(1_000_000, 500_000.0, 20).tax, 0);
    }

    #[test]
    fn sell_profit_uses_average_price() {
        let fill = sell_fill(2.0, 150.0, 100.0, 1);
        assert_eq!(fill.gross, 300);
        assert_eq!(fill.tax, 0);
        assert_eq!(fill.profit_loss, 100.0);
        assert_eq!(fill.profit_pct, 50.0);
    }

    #[test]
    fn flat_series_sits_mid_height() {
        let chart = render_chart(&[5.0; 10], 12, 35);
        let lines: Vec<&str> = chart.lines().collect();
        assert_eq!(lines.len(), 12);
        // Row 6 from the bottom is line index 5 from the top.
        assert_eq!(lines[5], "●".repeat(10));
        assert!(lines[0].trim().is_empty());
    }

    #[test]
    fn long_series_is_downsampled() {
        let prices: Vec<f64> = (0..100).map(f64::from).collect();
        let chart = render_chart(&prices, 12, 35);
        assert!(chart.lines().all(|l| l.chars().count() == 35));
        let bottom = chart.lines().last().unwrap();
        assert!(bottom.starts_with('●'));
        assert!(!bottom.contains(' '));
    }

    #[test]
    fn conversion_goes_through_idr() {
        let (idr, out) = convert(2.0, 1_000.0, 500.0);
        assert_eq!(idr, 2_000.0);
        assert_eq!(out, 4.0);
    }
}
