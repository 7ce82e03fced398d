//! Catalog, daily generation and the purchase transaction of the daily shop.

use crate::commands::economy::item::BoosterItem;
use crate::constants::{SHOP_RETENTION_DAYS, WIB};
use crate::database::models::ShopSlot;
use crate::database::{self, DbPool};
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use rand::seq::{IndexedRandom, index};
use serenity::model::id::UserId;
use tracing::{info, instrument};

pub const DOUBLE_DAILY_XP_BUFF: &str = "double_daily_xp";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShopCategory {
    Booster,
    Gacha,
    Luck,
    Currency,
    Special,
}

impl ShopCategory {
    pub const ALL: [ShopCategory; 5] = [
        ShopCategory::Booster,
        ShopCategory::Gacha,
        ShopCategory::Luck,
        ShopCategory::Currency,
        ShopCategory::Special,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            ShopCategory::Booster => "✨ XP Boosters",
            ShopCategory::Gacha => "🎰 Gacha Rolls",
            ShopCategory::Luck => "🍀 Luck Boosters",
            ShopCategory::Currency => "💰 Currency Packages",
            ShopCategory::Special => "🎁 Special Items",
        }
    }
}

/// What an item hands over once paid for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grant {
    Booster(BoosterItem),
    Rolls(i64),
    Luck(i64),
    Currency(i64),
    MysteryBox,
    DoubleDailyXp,
}

#[derive(Debug)]
pub struct CatalogItem {
    pub key: &'static str,
    pub name: &'static str,
    pub emoji: &'static str,
    pub description: &'static str,
    pub base_price: i64,
    pub max_stock: i64,
    pub category: ShopCategory,
    pub grant: Grant,
}

macro_rules! item {
    ($key:literal, $name:literal, $emoji:literal, $desc:literal, $price:expr, $stock:expr, $cat:ident, $grant:expr) => {
        CatalogItem {
            key: $key,
            name: $name,
            emoji: $emoji,
            description: $desc,
            base_price: $price,
            max_stock: $stock,
            category: ShopCategory::$cat,
            grant: $grant,
        }
    };
}

pub static CATALOG: &[CatalogItem] = &[
    item!("xp_2x", "2x XP Booster", "✨", "Double XP for your next portfolio", 25_000, 10, Booster, Grant::Booster(BoosterItem::X2)),
    item!("xp_4x", "4x XP Booster", "🌟", "4x XP for your next portfolio", 75_000, 5, Booster, Grant::Booster(BoosterItem::X4)),
    item!("xp_8x", "8x XP Booster", "🌈", "8x XP for your next portfolio", 200_000, 3, Booster, Grant::Booster(BoosterItem::X8)),
    item!("gacha_roll_1", "1 Gacha Roll", "🎰", "One gacha roll", 50_000, 8, Gacha, Grant::Rolls(1)),
    item!("gacha_roll_3", "3 Gacha Rolls", "🎲", "Three gacha rolls", 120_000, 5, Gacha, Grant::Rolls(3)),
    item!("gacha_roll_5", "5 Gacha Rolls", "🎪", "Five gacha rolls", 180_000, 3, Gacha, Grant::Rolls(5)),
    item!("luck_boost_small", "Lucky Charm", "🍀", "+5 Luck (PERMANENT!)", 150_000, 5, Luck, Grant::Luck(5)),
    item!("luck_boost_medium", "Fortune Talisman", "🔮", "+10 Luck (PERMANENT!)", 300_000, 3, Luck, Grant::Luck(10)),
    item!("luck_boost_large", "Divine Blessing", "✨", "+25 Luck (PERMANENT!)", 1_000_000, 1, Luck, Grant::Luck(25)),
    item!("money_small", "Money Pouch", "💰", "+Rp 100,000", 80_000, 10, Currency, Grant::Currency(100_000)),
    item!("money_medium", "Money Bag", "💵", "+Rp 500,000", 350_000, 5, Currency, Grant::Currency(500_000)),
    item!("money_large", "Treasure Chest", "💎", "+Rp 2,000,000", 1_200_000, 2, Currency, Grant::Currency(2_000_000)),
    item!("mystery_box", "Mystery Box", "🎁", "Random reward (2x-10x XP or Rp 50k-500k)", 100_000, 5, Special, Grant::MysteryBox),
    item!("double_daily_xp", "Double Daily XP", "⚡", "2x XP on every portfolio for the rest of today", 200_000, 3, Special, Grant::DoubleDailyXp),
];

pub fn find_item(key: &str) -> Option<&'static CatalogItem> {
    CATALOG.iter().find(|i| i.key == key)
}

/// Catalog entry whose name or key contains `query` (case-insensitive).
pub fn search_catalog(query: &str) -> Option<&'static CatalogItem> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return None;
    }
    CATALOG
        .iter()
        .find(|i| i.name.to_lowercase().contains(&query) || i.key.contains(&query))
}

/// The first in-stock slot matching `query`, with its catalog entry.
pub fn match_slot<'a>(
    slots: &'a [ShopSlot],
    query: &str,
) -> Option<(&'a ShopSlot, &'static CatalogItem)> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return None;
    }
    slots.iter().filter(|s| s.stock > 0).find_map(|slot| {
        let item = find_item(&slot.item_key)?;
        (item.name.to_lowercase().contains(&query) || item.key.contains(&query))
            .then_some((slot, item))
    })
}

/// `YYYYMMDD` of the WIB calendar day.
pub fn shop_id_for(now: DateTime<Utc>) -> String {
    now.with_timezone(&WIB).format("%Y%m%d").to_string()
}

/// The next 00:00 WIB strictly after `now`.
pub fn next_reset(now: DateTime<Utc>) -> DateTime<Utc> {
    let tomorrow = now.with_timezone(&WIB).date_naive() + Duration::days(1);
    tomorrow
        .and_hms_opt(0, 0, 0)
        .and_then(|naive| naive.and_local_timezone(WIB).single())
        .map_or(now + Duration::hours(24), |t| t.with_timezone(&Utc))
}

pub fn discount_percent(slot: &ShopSlot) -> i64 {
    if slot.original_price <= 0 {
        return 0;
    }
    ((1.0 - slot.price as f64 / slot.original_price as f64) * 100.0).round() as i64
}

/// Rolls a fresh shop: 8 to 12 distinct items, one or two of them discounted 20-50%.
pub fn generate_slots<R: Rng + ?Sized>(rng: &mut R, shop_id: &str) -> Vec<ShopSlot> {
    let count = rng.random_range(8..=12usize);
    let picked: Vec<&CatalogItem> = CATALOG.choose_multiple(rng, count).collect();
    let deal_count = rng.random_range(1..=2usize).min(picked.len());
    let deals = index::sample(rng, picked.len(), deal_count).into_vec();

    picked
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let is_special = deals.contains(&i);
            let discount = if is_special {
                rng.random_range(0.2..=0.5)
            } else {
                0.0
            };
            ShopSlot {
                shop_id: shop_id.to_string(),
                item_key: item.key.to_string(),
                price: (item.base_price as f64 * (1.0 - discount)) as i64,
                stock: rng.random_range((item.max_stock / 2).max(1)..=item.max_stock),
                original_price: item.base_price,
                is_special,
            }
        })
        .collect()
}

/// Stores today's shop unless it already exists (`force` replaces it) and purges shops
/// older than a week. Returns the stored slots when a shop was written.
#[instrument(level = "info", skip(pool))]
pub async fn generate_daily_shop(
    pool: &DbPool,
    now: DateTime<Utc>,
    force: bool,
) -> Result<Option<(String, Vec<ShopSlot>)>, sqlx::Error> {
    let shop_id = shop_id_for(now);
    if !force && database::shop::shop_exists(pool, &shop_id).await? {
        return Ok(None);
    }
    let slots = {
        let mut rng = rand::rng();
        generate_slots(&mut rng, &shop_id)
    };
    let oldest_kept = shop_id_for(now - Duration::days(SHOP_RETENTION_DAYS));
    let purged = database::shop::store_shop(pool, &shop_id, &slots, &oldest_kept).await?;
    info!(
        target: "shop.daily",
        shop_id = %shop_id,
        items = slots.len(),
        deals = slots.iter().filter(|s| s.is_special).count(),
        purged,
        "daily shop generated"
    );
    Ok(Some((shop_id, slots)))
}

/// In-stock slots of today's shop, deals first.
pub async fn current_slots(pool: &DbPool, now: DateTime<Utc>) -> Result<Vec<ShopSlot>, sqlx::Error> {
    let mut slots = database::shop::slots(pool, &shop_id_for(now)).await?;
    slots.retain(|s| s.stock > 0);
    Ok(slots)
}

/// What the buyer actually received.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reward {
    Booster(BoosterItem),
    Rolls(i64),
    Luck(i64),
    Currency(i64),
    DoubleXpUntil(DateTime<Utc>),
}

impl Reward {
    pub fn describe(&self) -> String {
        match self {
            Reward::Booster(item) => format!("{item} booster added to your inventory!"),
            Reward::Rolls(n) => format!("+{n} gacha roll(s) added!"),
            Reward::Luck(n) => format!("+{n} Luck (PERMANENT!)"),
            Reward::Currency(n) => format!("+{}", crate::util::rp(*n)),
            Reward::DoubleXpUntil(until) => {
                format!("⚡ 2x XP active until <t:{}:t>", until.timestamp())
            }
        }
    }
}

/// 40% a random XP booster (2x to 10x), otherwise Rp 50,000 to 500,000.
pub fn open_mystery_box<R: Rng + ?Sized>(rng: &mut R) -> Reward {
    const BOX_BOOSTERS: [BoosterItem; 4] =
        [BoosterItem::X2, BoosterItem::X4, BoosterItem::X8, BoosterItem::X10];
    if rng.random::<f64>() < 0.4 {
        Reward::Booster(*BOX_BOOSTERS.choose(rng).unwrap_or(&BoosterItem::X2))
    } else {
        Reward::Currency(rng.random_range(50_000..=500_000))
    }
}

/// Turns a grant into a concrete reward, rolling the mystery box when needed.
pub fn resolve_grant<R: Rng + ?Sized>(rng: &mut R, grant: Grant, now: DateTime<Utc>) -> Reward {
    match grant {
        Grant::Booster(item) => Reward::Booster(item),
        Grant::Rolls(n) => Reward::Rolls(n),
        Grant::Luck(n) => Reward::Luck(n),
        Grant::Currency(n) => Reward::Currency(n),
        Grant::MysteryBox => open_mystery_box(rng),
        Grant::DoubleDailyXp => Reward::DoubleXpUntil(next_reset(now)),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PurchaseOutcome {
    Bought { reward: Reward },
    SoldOut,
    TooPoor,
}

/// Takes one unit of stock, charges the buyer and hands over the item, all in one transaction.
#[instrument(level = "info", skip(pool, item), fields(item = item.key))]
pub async fn purchase(
    pool: &DbPool,
    user_id: UserId,
    slot: &ShopSlot,
    item: &'static CatalogItem,
    now: DateTime<Utc>,
) -> Result<PurchaseOutcome, sqlx::Error> {
    let reward = {
        let mut rng = rand::rng();
        resolve_grant(&mut rng, item.grant, now)
    };
    let mut tx = pool.begin().await?;
    if !database::shop::take_stock(&mut tx, &slot.shop_id, &slot.item_key).await? {
        tx.rollback().await?;
        return Ok(PurchaseOutcome::SoldOut);
    }
    if !database::users::add_currency(&mut *tx, user_id, -slot.price).await? {
        tx.rollback().await?;
        return Ok(PurchaseOutcome::TooPoor);
    }
    database::shop::record_purchase(&mut *tx, user_id, &slot.shop_id, &slot.item_key, slot.price, now)
        .await?;
    match reward {
        Reward::Booster(b) => {
            database::users::add_booster(&mut *tx, user_id, b, 1).await?;
        }
        Reward::Rolls(n) => {
            database::users::add_gacha_rolls(&mut *tx, user_id, n).await?;
        }
        Reward::Luck(n) => database::users::add_luck(&mut *tx, user_id, n).await?,
        Reward::Currency(n) => {
            database::users::add_currency(&mut *tx, user_id, n).await?;
        }
        Reward::DoubleXpUntil(until) => {
            database::shop::grant_buff(&mut *tx, user_id, DOUBLE_DAILY_XP_BUFF, until).await?;
        }
    }
    tx.commit().await?;
    info!(target: "shop.buy", user = user_id.get(), item = item.key, price = slot.price, "shop purchase");
    Ok(PurchaseOutcome::Bought { reward })
}

pub async fn has_double_daily_xp(
    pool: &DbPool,
    user_id: UserId,
    now: DateTime<Utc>,
) -> Result<bool, sqlx::Error> {
    database::shop::buff_active(pool, user_id, DOUBLE_DAILY_XP_BUFF, now).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn catalog_keys_are_unique() {
        for (i, a) in CATALOG.iter().enumerate() {
            assert!(CATALOG[i + 1..].iter().all(|b| b.key != a.key), "{}", a.key);
        }
        assert_eq!(CATALOG.len(), 14);
    }

    #[test]
    fn shop_id_uses_wib_date() {
        // 18:30 UTC is already the next day in Jakarta.
        let now = Utc.with_ymd_and_hms(2024, 3, 9, 18, 30, 0).unwrap();
        assert_eq!(shop_id_for(now), "20240310");
        assert_eq!(
            next_reset(now),
            Utc.with_ymd_and_hms(2024, 3, 10, 17, 0, 0).unwrap()
        );
    }

    #[test]
    fn search_matches_name_or_key() {
        assert_eq!(search_catalog("lucky").map(|i| i.key), Some("luck_boost_small"));
        assert_eq!(search_catalog("MONEY_LARGE").map(|i| i.key), Some("money_large"));
        assert!(search_catalog("   ").is_none());
    }

    #[test]
    fn generated_shop_respects_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let slots = generate_slots(&mut rng, "20240101");
            assert!((8..=12).contains(&slots.len()));
            let deals = slots.iter().filter(|s| s.is_special).count();
            assert!((1..=2).contains(&deals));
            for slot in &slots {
                let item = find_item(&slot.item_key).unwrap();
                assert!(slot.stock >= (item.max_stock / 2).max(1) && slot.stock <= item.max_stock);
                if slot.is_special {
                    assert!((20..=50).contains(&discount_percent(slot)), "{slot:?}");
                } else {
                    assert_eq!(slot.price, item.base_price);
                }
            }
        }
    }

    #[test]
    fn mystery_box_rewards_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..200 {
            match open_mystery_box(&mut rng) {
                Reward::Booster(b) => assert_ne!(b, BoosterItem::X20),
                Reward::Currency(n) => assert!((50_000..=500_000).contains(&n)),
                other => panic!("unexpected {other:?}"),
            }
        }
    }
}
