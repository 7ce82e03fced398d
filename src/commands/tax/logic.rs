//! Tax rates, per-transaction tax math and the weekly income collection.

use crate::constants::{FISH_SELL_TAX_RATE, TAX_EXEMPT_LEVEL, WEEKLY_TAX_HOUR_UTC, WEEKLY_TAX_WINDOW_MINS};
use crate::database::{self, DbPool};
use chrono::{DateTime, Datelike, Duration, NaiveTime, Timelike, Utc, Weekday};
use serenity::model::id::UserId;
use tracing::{info, instrument};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaxKind {
    Income,
    TradingBuy,
    TradingSell,
    FishingSell,
    JadeCut,
    ItemTrade,
}

impl TaxKind {
    pub const ALL: [TaxKind; 6] = [
        TaxKind::Income,
        TaxKind::TradingBuy,
        TaxKind::TradingSell,
        TaxKind::FishingSell,
        TaxKind::JadeCut,
        TaxKind::ItemTrade,
    ];

    pub fn rate(&self) -> f64 {
        match self {
            TaxKind::Income => 0.05,
            TaxKind::TradingBuy => 0.001,
            TaxKind::TradingSell => 0.001,
            TaxKind::FishingSell => FISH_SELL_TAX_RATE,
            TaxKind::JadeCut => 0.02,
            TaxKind::ItemTrade => 0.10,
        }
    }

    /// Value stored in `tax_history.tax_type`.
    pub fn as_str(&self) -> &'static str {
        match self {
            TaxKind::Income => "income_tax",
            TaxKind::TradingBuy => "trading_buy_tax",
            TaxKind::TradingSell => "trading_sell_tax",
            TaxKind::FishingSell => "fishing_sell_tax",
            TaxKind::JadeCut => "jade_cut_tax",
            TaxKind::ItemTrade => "item_trade_tax",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TaxKind::Income => "📅 Weekly income",
            TaxKind::TradingBuy => "📈 Crypto buy",
            TaxKind::TradingSell => "📉 Crypto sell",
            TaxKind::FishingSell => "🐟 Fish sale",
            TaxKind::JadeCut => "💎 Jade payout",
            TaxKind::ItemTrade => "🔄 Item trade",
        }
    }

    pub fn label_for(tax_type: &str) -> &'static str {
        TaxKind::ALL
            .iter()
            .find(|k| k.as_str() == tax_type)
            .map(|k| k.label())
            .unwrap_or("❔ Other")
    }
}

pub fn is_exempt(level: i64) -> bool {
    level >= TAX_EXEMPT_LEVEL
}

/// Returns `(tax, net)`; exempt levels pay nothing.
pub fn calculate_transaction_tax(amount: i64, kind: TaxKind, level: i64) -> (i64, i64) {
    if is_exempt(level) || amount <= 0 {
        return (0, amount.max(0));
    }
    let tax = (amount as f64 * kind.rate()).floor() as i64;
    (tax, amount - tax)
}

/// Monday 00:00 UTC of the week containing `now`.
pub fn week_start(now: DateTime<Utc>) -> DateTime<Utc> {
    let days_back = now.weekday().num_days_from_monday() as i64;
    let monday = now.date_naive() - Duration::days(days_back);
    monday.and_time(NaiveTime::MIN).and_utc()
}

/// Monday 17:00 to 17:05 UTC.
pub fn is_weekly_tax_window(now: DateTime<Utc>) -> bool {
    now.weekday() == Weekday::Mon
        && now.hour() == WEEKLY_TAX_HOUR_UTC
        && now.minute() < WEEKLY_TAX_WINDOW_MINS
}

/// The next Monday 17:00 UTC strictly after `now`.
pub fn next_collection(now: DateTime<Utc>) -> DateTime<Utc> {
    let this_week = week_start(now) + Duration::hours(WEEKLY_TAX_HOUR_UTC as i64);
    if now < this_week {
        this_week
    } else {
        this_week + Duration::weeks(1)
    }
}

/// A forced collection is allowed once per Monday-based week.
pub fn can_force(last_forced: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    match last_forced {
        Some(last) => last < week_start(now),
        None => true,
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WeeklyTaxReport {
    pub payers: i64,
    pub exempt: i64,
    pub total: i64,
}

/// Charges every non-exempt holder 5% of their balance.
#[instrument(level = "info", skip(pool))]
pub async fn collect_weekly_tax(
    pool: &DbPool,
    now: DateTime<Utc>,
) -> Result<WeeklyTaxReport, sqlx::Error> {
    let mut report = WeeklyTaxReport::default();
    let holders = database::users::users_with_currency(pool).await?;
    let mut tx = pool.begin().await?;
    for holder in holders {
        if is_exempt(holder.level) {
            report.exempt += 1;
            continue;
        }
        let (tax, _) = calculate_transaction_tax(holder.currency, TaxKind::Income, holder.level);
        if tax <= 0 {
            continue;
        }
        let user_id = UserId::new(holder.user_id as u64);
        if database::tax::collect(&mut tx, user_id, TaxKind::Income.as_str(), tax, now).await? {
            report.payers += 1;
            report.total += tax;
        }
    }
    tx.commit().await?;
    info!(target: "tax.weekly", payers = report.payers, exempt = report.exempt, total = report.total, "weekly tax collected");
    Ok(report)
}

/// Runs the owner-triggered collection unless one already ran this week.
/// Returns `None` when blocked.
pub async fn force_collection(
    pool: &DbPool,
    now: DateTime<Utc>,
) -> Result<Option<WeeklyTaxReport>, sqlx::Error> {
    if !can_force(database::tax::last_forced_tax(pool).await?, now) {
        return Ok(None);
    }
    let report = collect_weekly_tax(pool, now).await?;
    database::tax::set_last_forced_tax(pool, now).await?;
    Ok(Some(report))
}
