//! Item trades, booster activation and the weekly claim.

use super::item::BoosterItem;
use crate::commands::tax::logic::{TaxKind, calculate_transaction_tax};
use crate::constants::{WEEKLY_COOLDOWN_DAYS, WEEKLY_MIN_LEVEL};
use crate::database::{self, DbPool};
use chrono::{DateTime, Duration, Utc};
use serenity::model::id::UserId;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeOutcome {
    Done { tax: i64, net: i64 },
    SellerShort { held: i64 },
    BuyerShort,
}

/// Moves `amount` boosters from seller to buyer and `price` the other way, minus the
/// item-trade tax on the seller's proceeds. All or nothing.
pub async fn execute_trade(
    pool: &DbPool,
    seller: UserId,
    buyer: UserId,
    item: BoosterItem,
    amount: i64,
    price: i64,
) -> Result<TradeOutcome, sqlx::Error> {
    let mut tx = pool.begin().await?;
    let seller_row = database::users::get_user(&mut *tx, seller).await?;
    let seller_level = seller_row.as_ref().map_or(1, |p| p.level);
    if !database::users::add_booster(&mut *tx, seller, item, -amount).await? {
        tx.rollback().await?;
        return Ok(TradeOutcome::SellerShort {
            held: seller_row.map_or(0, |p| item.count_in(&p)),
        });
    }
    if !database::users::add_currency(&mut *tx, buyer, -price).await? {
        tx.rollback().await?;
        return Ok(TradeOutcome::BuyerShort);
    }
    let (tax, net) = calculate_transaction_tax(price, TaxKind::ItemTrade, seller_level);
    database::users::add_booster(&mut *tx, buyer, item, amount).await?;
    database::users::add_currency(&mut *tx, seller, net).await?;
    if tax > 0 {
        database::tax::record_tax(&mut *tx, seller, TaxKind::ItemTrade.as_str(), tax, Utc::now())
            .await?;
    }
    tx.commit().await?;
    info!(
        target: "economy.trade",
        seller = seller.get(),
        buyer = buyer.get(),
        item = item.short(),
        amount,
        price,
        tax,
        "item trade"
    );
    Ok(TradeOutcome::Done { tax, net })
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UseOutcome {
    Activated,
    AlreadyActive(f64),
    NoItem,
}

/// Consumes one booster and arms it for the next kumpul payout.
pub async fn use_booster(
    pool: &DbPool,
    user_id: UserId,
    item: BoosterItem,
) -> Result<UseOutcome, sqlx::Error> {
    let profile = database::users::get_or_create_user(pool, user_id).await?;
    if profile.next_xp_mult > 1.0 {
        return Ok(UseOutcome::AlreadyActive(profile.next_xp_mult));
    }
    let mut tx = pool.begin().await?;
    if !database::users::arm_xp_booster(&mut *tx, user_id, item.multiplier()).await? {
        tx.rollback().await?;
        let current = database::users::get_or_create_user(pool, user_id).await?;
        return Ok(UseOutcome::AlreadyActive(current.next_xp_mult));
    }
    if !database::users::add_booster(&mut *tx, user_id, item, -1).await? {
        tx.rollback().await?;
        return Ok(UseOutcome::NoItem);
    }
    tx.commit().await?;
    info!(target: "economy.use", user = user_id.get(), item = item.short(), "booster armed");
    Ok(UseOutcome::Activated)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeeklyOutcome {
    Claimed,
    LevelTooLow(i64),
    Cooldown(Duration),
}

/// Time left before a weekly claim stamped `last` can be repeated.
pub fn weekly_remaining(last: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Option<Duration> {
    let next = last? + Duration::days(WEEKLY_COOLDOWN_DAYS);
    (next > now).then(|| next - now)
}

pub async fn claim_weekly(
    pool: &DbPool,
    user_id: UserId,
    now: DateTime<Utc>,
) -> Result<WeeklyOutcome, sqlx::Error> {
    let profile = database::users::get_or_create_user(pool, user_id).await?;
    if profile.level < WEEKLY_MIN_LEVEL {
        return Ok(WeeklyOutcome::LevelTooLow(profile.level));
    }
    if let Some(left) = weekly_remaining(profile.last_weekly_claim, now) {
        return Ok(WeeklyOutcome::Cooldown(left));
    }
    let mut tx = pool.begin().await?;
    if !database::users::stamp_weekly_claim(&mut *tx, user_id, profile.last_weekly_claim, now).await? {
        tx.rollback().await?;
        return Ok(WeeklyOutcome::Cooldown(Duration::days(WEEKLY_COOLDOWN_DAYS)));
    }
    database::users::add_booster(&mut *tx, user_id, BoosterItem::X2, 1).await?;
    tx.commit().await?;
    Ok(WeeklyOutcome::Claimed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weekly_cooldown_window() {
        let now = Utc::now();
        assert_eq!(weekly_remaining(None, now), None);
        assert_eq!(weekly_remaining(Some(now - Duration::days(8)), now), None);
        assert_eq!(
            weekly_remaining(Some(now - Duration::days(6)), now),
            Some(Duration::days(1))
        );
    }
}
