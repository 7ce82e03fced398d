//! Storage flows against a fresh in-memory SQLite database per test.
use chrono::{Duration, Utc};
use mochi_bot::commands::economy::item::BoosterItem;
use mochi_bot::commands::economy::logic::{
    TradeOutcome, UseOutcome, WeeklyOutcome, claim_weekly, execute_trade, use_booster,
};
use mochi_bot::commands::fishing::data::{UpgradeKind, find_fish};
use mochi_bot::commands::fishing::logic::{
    FishMarket, UpgradeOutcome, buy_upgrade, execute_sale, land_catch, price_sale,
};
use mochi_bot::commands::gacha::logic::{Prize, RollOutcome, roll_gacha};
use mochi_bot::commands::jade::logic::{JADE_TIERS, calculate_reward, settle_cut};
use mochi_bot::commands::leveling::kumpul::{SessionStep, next_check};
use mochi_bot::commands::leveling::logic::check_level_up;
use mochi_bot::commands::quests::logic::{
    QuestKind, build_quest, force_daily_quest, generate_daily_quest, sweep_completions, template,
};
use mochi_bot::commands::shop::logic::{PurchaseOutcome, Reward, find_item, purchase};
use mochi_bot::commands::tax::logic::{
    TaxKind, calculate_transaction_tax, collect_weekly_tax, force_collection,
};
use mochi_bot::commands::trading::logic::{Amount, BuyOutcome, SellOutcome, execute_buy, execute_sell};
use mochi_bot::database::kumpul::{self as sessions, SessionStatus};
use mochi_bot::database::models::ShopSlot;
use mochi_bot::database::{self, DbPool, maintenance, quests, users};
use mochi_bot::services::prices::find_crypto;
use serenity::model::id::{ChannelId, MessageId, UserId};

const ALICE: UserId = UserId::new(101);
const BOB: UserId = UserId::new(202);

async fn fresh_db() -> DbPool {
    let pool = database::connect("sqlite::memory:", 1).await.unwrap();
    database::create_schema(&pool).await.unwrap();
    pool
}

async fn balance(pool: &DbPool, user: UserId) -> i64 {
    users::get_or_create_user(pool, user).await.unwrap().currency
}

#[tokio::test]
async fn schema_is_idempotent() {
    let pool = fresh_db().await;
    database::create_schema(&pool).await.unwrap();
    assert!(database::init::migrate_jade_stats(&pool).await.unwrap().is_empty());

    let reports = maintenance::verify(&pool).await.unwrap();
    assert_eq!(reports.len(), maintenance::TABLES.len());
    for report in &reports {
        assert!(!report.columns.is_empty(), "{} is missing", report.table);
        assert_eq!(report.rows, 0);
    }
    let jade = database::init::table_columns(&pool, "jade_stats").await.unwrap();
    assert!(jade.iter().any(|c| c == "total_jackpots"));
    let fishing = database::init::table_columns(&pool, "fishing_stats").await.unwrap();
    assert!(fishing.iter().any(|c| c == "legendary_caught"));
}

#[tokio::test]
async fn balances_never_go_negative() {
    let pool = fresh_db().await;
    assert!(users::add_currency(&pool, ALICE, 100).await.unwrap());
    assert!(!users::add_currency(&pool, ALICE, -150).await.unwrap());
    assert_eq!(balance(&pool, ALICE).await, 100);

    assert!(users::transfer_currency(&pool, ALICE, BOB, 60).await.unwrap());
    assert!(!users::transfer_currency(&pool, ALICE, BOB, 100).await.unwrap());
    assert_eq!(balance(&pool, ALICE).await, 40);
    assert_eq!(balance(&pool, BOB).await, 60);
}

#[tokio::test]
async fn level_ups_pay_out_once() {
    let pool = fresh_db().await;
    users::add_xp(&pool, ALICE, 8).await.unwrap();
    let up = check_level_up(&pool, ALICE).await.unwrap().expect("level up");
    assert_eq!((up.old_level, up.new_level), (1, 3));
    assert!(check_level_up(&pool, ALICE).await.unwrap().is_none());

    let profile = users::get_or_create_user(&pool, ALICE).await.unwrap();
    assert_eq!(profile.level, 3);
    assert!(profile.currency >= 250_000);
    assert_eq!(profile.gacha_rolls, 2);
}

#[tokio::test]
async fn weekly_tax_skips_exempt_players() {
    let pool = fresh_db().await;
    users::add_currency(&pool, ALICE, 10_000).await.unwrap();
    users::add_currency(&pool, BOB, 10_000).await.unwrap();
    users::apply_level_up(&pool, BOB, 20, 0, 0, 0).await.unwrap();

    let now = Utc::now();
    let report = collect_weekly_tax(&pool, now).await.unwrap();
    assert_eq!((report.payers, report.exempt, report.total), (1, 1, 500));
    assert_eq!(balance(&pool, ALICE).await, 9_500);
    assert_eq!(balance(&pool, BOB).await, 10_000);

    let history = database::tax::history(&pool, ALICE, 10).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].tax_type, "income_tax");
    assert_eq!(history[0].amount, 500);

    assert!(force_collection(&pool, now).await.unwrap().is_some());
    assert!(force_collection(&pool, now).await.unwrap().is_none());
}

#[tokio::test]
async fn item_trade_is_all_or_nothing() {
    let pool = fresh_db().await;
    users::add_booster(&pool, ALICE, BoosterItem::X2, 2).await.unwrap();
    users::add_currency(&pool, BOB, 30_000).await.unwrap();

    let short = execute_trade(&pool, ALICE, BOB, BoosterItem::X2, 1, 50_000).await.unwrap();
    assert_eq!(short, TradeOutcome::BuyerShort);
    let too_many = execute_trade(&pool, ALICE, BOB, BoosterItem::X2, 5, 1_000).await.unwrap();
    assert_eq!(too_many, TradeOutcome::SellerShort { held: 2 });

    let done = execute_trade(&pool, ALICE, BOB, BoosterItem::X2, 1, 25_000).await.unwrap();
    assert_eq!(done, TradeOutcome::Done { tax: 2_500, net: 22_500 });
    let alice = users::get_or_create_user(&pool, ALICE).await.unwrap();
    let bob = users::get_or_create_user(&pool, BOB).await.unwrap();
    assert_eq!((alice.xp_2x, alice.currency), (1, 22_500));
    assert_eq!((bob.xp_2x, bob.currency), (1, 5_000));
}

#[tokio::test]
async fn boosters_arm_one_at_a_time() {
    let pool = fresh_db().await;
    assert_eq!(use_booster(&pool, ALICE, BoosterItem::X4).await.unwrap(), UseOutcome::NoItem);
    users::add_booster(&pool, ALICE, BoosterItem::X4, 1).await.unwrap();
    users::add_booster(&pool, ALICE, BoosterItem::X2, 1).await.unwrap();

    assert_eq!(use_booster(&pool, ALICE, BoosterItem::X4).await.unwrap(), UseOutcome::Activated);
    assert_eq!(
        use_booster(&pool, ALICE, BoosterItem::X2).await.unwrap(),
        UseOutcome::AlreadyActive(4.0)
    );
    let profile = users::get_or_create_user(&pool, ALICE).await.unwrap();
    assert_eq!((profile.xp_4x, profile.xp_2x), (0, 1));
    assert_eq!(profile.next_xp_mult, 4.0);

    // A use that read the old multiplier before this one landed still cannot re-arm.
    assert!(!users::arm_xp_booster(&pool, ALICE, 2.0).await.unwrap());
    users::set_next_xp_mult(&pool, ALICE, 1.0).await.unwrap();
    assert!(users::arm_xp_booster(&pool, ALICE, 2.0).await.unwrap());
}

#[tokio::test]
async fn unknown_users_cannot_be_debited() {
    let pool = fresh_db().await;
    assert!(!users::add_currency(&pool, ALICE, -500).await.unwrap());
    assert!(!users::add_gacha_rolls(&pool, ALICE, -1).await.unwrap());
    assert!(!users::add_booster(&pool, ALICE, BoosterItem::X8, -1).await.unwrap());
    let profile = users::get_or_create_user(&pool, ALICE).await.unwrap();
    assert_eq!((profile.currency, profile.gacha_rolls, profile.xp_8x), (0, 0, 0));
}

#[tokio::test]
async fn shop_purchase_rolls_back_when_declined() {
    let pool = fresh_db().await;
    let item = find_item("gacha_roll_1").expect("catalog item");
    let slot = ShopSlot {
        shop_id: "20240110".to_string(),
        item_key: item.key.to_string(),
        price: item.base_price,
        stock: 1,
        original_price: item.base_price,
        is_special: false,
    };
    database::shop::store_shop(&pool, &slot.shop_id, std::slice::from_ref(&slot), "20240101")
        .await
        .unwrap();
    let stock = |pool: DbPool| async move {
        database::shop::slots(&pool, "20240110").await.unwrap()[0].stock
    };
    let now = Utc::now();

    users::add_currency(&pool, BOB, 10_000).await.unwrap();
    assert_eq!(purchase(&pool, BOB, &slot, item, now).await.unwrap(), PurchaseOutcome::TooPoor);
    assert_eq!(balance(&pool, BOB).await, 10_000);
    assert_eq!(stock(pool.clone()).await, 1);
    assert!(database::shop::purchases(&pool, BOB, 10).await.unwrap().is_empty());

    users::add_currency(&pool, ALICE, 60_000).await.unwrap();
    assert_eq!(
        purchase(&pool, ALICE, &slot, item, now).await.unwrap(),
        PurchaseOutcome::Bought { reward: Reward::Rolls(1) }
    );
    let alice = users::get_or_create_user(&pool, ALICE).await.unwrap();
    assert_eq!((alice.currency, alice.gacha_rolls), (10_000, 1));
    assert_eq!(stock(pool.clone()).await, 0);

    users::add_currency(&pool, BOB, 100_000).await.unwrap();
    assert_eq!(purchase(&pool, BOB, &slot, item, now).await.unwrap(), PurchaseOutcome::SoldOut);
    assert_eq!(balance(&pool, BOB).await, 110_000);
    assert_eq!(database::shop::purchases(&pool, ALICE, 10).await.unwrap().len(), 1);
}

#[tokio::test]
async fn crypto_trades_tax_and_average_positions() {
    let pool = fresh_db().await;
    let btc = find_crypto("btc").expect("btc");
    let now = Utc::now();
    users::add_currency(&pool, ALICE, 2_000_000).await.unwrap();

    let BuyOutcome::Bought(first) =
        execute_buy(&pool, ALICE, btc, Amount::Exact(1_000_000), 500_000.0, now).await.unwrap()
    else {
        panic!("first buy should fill");
    };
    assert_eq!((first.tax, first.net), (1_000, 999_000));
    let BuyOutcome::Bought(second) =
        execute_buy(&pool, ALICE, btc, Amount::All, 250_000.0, now).await.unwrap()
    else {
        panic!("second buy should fill");
    };
    assert_eq!(balance(&pool, ALICE).await, 0);

    let held = database::trading::holding(&pool, ALICE, "BTC").await.unwrap().expect("position");
    assert!((held.amount - (first.amount + second.amount)).abs() < 1e-9);
    let weighted = (first.amount * 500_000.0 + second.amount * 250_000.0) / held.amount;
    assert!((held.avg_buy_price - weighted).abs() < 1e-6);

    assert_eq!(
        execute_buy(&pool, ALICE, btc, Amount::Exact(10), 250_000.0, now).await.unwrap(),
        BuyOutcome::TooPoor { balance: 0 }
    );
    assert_eq!(balance(&pool, ALICE).await, 0);

    let short = execute_sell(&pool, ALICE, btc, Amount::Exact(held.amount + 1.0), 400_000.0, now)
        .await
        .unwrap();
    assert!(matches!(short, SellOutcome::Short { held: h } if (h - held.amount).abs() < 1e-9));
    assert_eq!(balance(&pool, ALICE).await, 0);

    // Leaves less than the dust threshold behind, so the position row goes away.
    let SellOutcome::Sold { fill, .. } =
        execute_sell(&pool, ALICE, btc, Amount::Exact(held.amount - 5e-9), 400_000.0, now)
            .await
            .unwrap()
    else {
        panic!("sell should fill");
    };
    assert_eq!(calculate_transaction_tax(fill.gross, TaxKind::TradingSell, 1), (fill.tax, fill.net));
    assert_eq!(balance(&pool, ALICE).await, fill.net);
    assert!(database::trading::holding(&pool, ALICE, "BTC").await.unwrap().is_none());

    let none = execute_sell(&pool, ALICE, btc, Amount::All, 400_000.0, now).await.unwrap();
    assert!(matches!(none, SellOutcome::NoHolding));
    assert_eq!(balance(&pool, ALICE).await, fill.net);
    assert_eq!(
        database::tax::user_total(&pool, ALICE).await.unwrap(),
        first.tax + second.tax + fill.tax
    );
}

#[tokio::test]
async fn jade_cut_pays_out_after_tax() {
    let pool = fresh_db().await;
    let common = &JADE_TIERS[0];

    let win = calculate_reward(common, 0.0, 0.9, 0.0);
    let settled = settle_cut(&pool, ALICE, common, win, 1).await.unwrap();
    assert_eq!((settled.tax, settled.payout), calculate_transaction_tax(win.reward, TaxKind::JadeCut, 1));
    assert_eq!(settled.tax + settled.payout, win.reward);
    assert_eq!(balance(&pool, ALICE).await, settled.payout);
    assert_eq!(database::tax::user_total(&pool, ALICE).await.unwrap(), settled.tax);

    let jackpot = calculate_reward(common, 0.0, 0.0, 0.5);
    let settled = settle_cut(&pool, ALICE, common, jackpot, 20).await.unwrap();
    assert_eq!((settled.tax, settled.payout), (0, jackpot.reward));

    let stats = database::jade::get_stats(&pool, ALICE).await.unwrap();
    assert_eq!(stats.total_cuts, 2);
    assert_eq!(stats.total_spent, common.price * 2);
    assert_eq!(stats.total_won, win.reward + jackpot.reward);
    assert_eq!((stats.total_wins, stats.total_losses, stats.total_jackpots), (2, 0, 1));
}

#[tokio::test]
async fn gacha_spends_exactly_one_roll() {
    let pool = fresh_db().await;
    let now = Utc::now();
    let quest = build_quest(template(QuestKind::GachaRoll), 5, now);
    quests::replace_active_quest(&pool, &quest).await.unwrap();

    assert!(matches!(roll_gacha(&pool, ALICE).await.unwrap(), RollOutcome::NoRolls));
    users::add_gacha_rolls(&pool, ALICE, 2).await.unwrap();

    let RollOutcome::Won { tier, rolls_left } = roll_gacha(&pool, ALICE).await.unwrap() else {
        panic!("a roll was available");
    };
    assert_eq!(rolls_left, 1);
    let profile = users::get_or_create_user(&pool, ALICE).await.unwrap();
    assert_eq!(profile.gacha_rolls, 1);
    match tier.prize {
        Prize::Currency(amount) => assert_eq!(profile.currency, amount),
        Prize::Item(item) => {
            let held = [
                (BoosterItem::X2, profile.xp_2x),
                (BoosterItem::X4, profile.xp_4x),
                (BoosterItem::X8, profile.xp_8x),
                (BoosterItem::X10, profile.xp_10x),
                (BoosterItem::X20, profile.xp_20x),
            ];
            assert!(held.contains(&(item, 1)), "{item:?} was not granted");
        }
    }

    assert!(matches!(roll_gacha(&pool, ALICE).await.unwrap(), RollOutcome::Won { rolls_left: 0, .. }));
    assert!(matches!(roll_gacha(&pool, ALICE).await.unwrap(), RollOutcome::NoRolls));
    assert_eq!(users::get_or_create_user(&pool, ALICE).await.unwrap().gacha_rolls, 0);

    let progress = quests::user_progress(&pool, &quest.quest_id, ALICE).await.unwrap().expect("progress");
    assert_eq!(progress.current_progress, 2);
}

#[tokio::test]
async fn upgrades_charge_once_per_level() {
    let pool = fresh_db().await;
    users::add_currency(&pool, ALICE, 300).await.unwrap();

    let rod = UpgradeKind::Rod;
    assert_eq!(
        buy_upgrade(&pool, ALICE, rod).await.unwrap(),
        UpgradeOutcome::Upgraded { new_level: 1, cost: 200 }
    );
    assert_eq!(balance(&pool, ALICE).await, 100);
    assert_eq!(
        buy_upgrade(&pool, ALICE, rod).await.unwrap(),
        UpgradeOutcome::Insufficient { cost: rod.cost(1) }
    );
    assert_eq!(balance(&pool, ALICE).await, 100);

    // A purchase that still expects level 0 is refused.
    assert!(!database::fishing::bump_upgrade(&pool, ALICE, rod.key(), 0).await.unwrap());
    assert!(database::fishing::bump_upgrade(&pool, ALICE, rod.key(), 1).await.unwrap());
    assert_eq!(database::fishing::upgrade_level(&pool, ALICE, rod.key()).await.unwrap(), 2);
}

#[tokio::test]
async fn weekly_bonus_is_claimed_once() {
    let pool = fresh_db().await;
    let now = Utc::now();
    assert_eq!(claim_weekly(&pool, BOB, now).await.unwrap(), WeeklyOutcome::LevelTooLow(1));

    users::ensure_user(&pool, ALICE).await.unwrap();
    users::apply_level_up(&pool, ALICE, 15, 0, 0, 0).await.unwrap();
    assert_eq!(claim_weekly(&pool, ALICE, now).await.unwrap(), WeeklyOutcome::Claimed);
    let later = now + Duration::hours(1);
    assert!(matches!(
        claim_weekly(&pool, ALICE, later).await.unwrap(),
        WeeklyOutcome::Cooldown(_)
    ));
    // A claim that read the empty stamp before the first one landed.
    assert!(!users::stamp_weekly_claim(&pool, ALICE, None, later).await.unwrap());
    assert_eq!(users::get_or_create_user(&pool, ALICE).await.unwrap().xp_2x, 1);

    let next_week = now + Duration::days(7);
    assert_eq!(claim_weekly(&pool, ALICE, next_week).await.unwrap(), WeeklyOutcome::Claimed);
    assert_eq!(users::get_or_create_user(&pool, ALICE).await.unwrap().xp_2x, 2);
}

#[tokio::test]
async fn legendary_achievement_reads_the_stored_total() {
    let pool = fresh_db().await;
    let paus = find_fish("Ikan Paus").expect("legendary fish");
    let teri = find_fish("Ikan Teri").expect("common fish");
    let now = Utc::now();

    let first = land_catch(&pool, ALICE, &[(teri, 2), (paus, 1)], now, false).await.unwrap();
    assert_eq!(first.total_caught, 3);
    assert!(first.unlocked.iter().any(|a| a.id == "legendary_catch"));

    let second = land_catch(&pool, ALICE, &[(paus, 2)], now, false).await.unwrap();
    assert!(second.unlocked.is_empty());
    let stats = database::fishing::get_stats(&pool, ALICE).await.unwrap();
    assert_eq!((stats.total_fish_caught, stats.legendary_caught), (5, 3));
    assert!(stats.last_fish_time.is_none());
}

#[tokio::test]
async fn each_fire_reaction_is_paid_once() {
    let pool = fresh_db().await;
    let message = MessageId::new(9_001);
    let start = Utc::now();
    sessions::create_session(&pool, message, ALICE, ChannelId::new(5), start, start + Duration::days(7))
        .await
        .unwrap();
    assert!(sessions::open_session_for(&pool, ALICE).await.unwrap().is_some());

    assert!(sessions::raise_max_reactions(&pool, message, 0, 3).await.unwrap());
    assert!(!sessions::raise_max_reactions(&pool, message, 0, 3).await.unwrap());

    assert!(
        sessions::transition_status(&pool, message, SessionStatus::Active, SessionStatus::Calculating)
            .await
            .unwrap()
    );
    assert!(!sessions::raise_max_reactions(&pool, message, 3, 4).await.unwrap());
    assert!(
        !sessions::transition_status(&pool, message, SessionStatus::Active, SessionStatus::Ended)
            .await
            .unwrap()
    );
    sessions::set_status(&pool, message, SessionStatus::Active).await.unwrap();

    let session = sessions::get_session(&pool, message).await.unwrap().expect("session");
    assert_eq!(session.max_reactions, 3);
    assert_eq!(session.status(), Some(SessionStatus::Active));
    assert_eq!(next_check(&session, start + Duration::minutes(30)), SessionStep::Touch);
    assert_eq!(next_check(&session, start + Duration::hours(2)), SessionStep::Reset);
    assert_eq!(next_check(&session, start + Duration::days(8)), SessionStep::End);

    sessions::mark_xp_check(&pool, message, start + Duration::hours(2), true).await.unwrap();
    let session = sessions::get_session(&pool, message).await.unwrap().expect("session");
    assert_eq!(session.max_reactions, 0);

    sessions::set_status(&pool, message, SessionStatus::Ended).await.unwrap();
    assert!(sessions::open_session_for(&pool, ALICE).await.unwrap().is_none());
    assert!(sessions::active_sessions(&pool).await.unwrap().is_empty());
}

#[tokio::test]
async fn quest_progress_clamps_and_pays_once() {
    let pool = fresh_db().await;
    let now = Utc::now();
    let quest = build_quest(template(QuestKind::FishAny), 5, now);
    quests::replace_active_quest(&pool, &quest).await.unwrap();

    let (_, progress, target) = quests::add_progress(&pool, ALICE, "fish_any", 3, now)
        .await
        .unwrap()
        .expect("running quest");
    assert_eq!((progress, target), (3, 5));
    let (_, progress, _) = quests::add_progress(&pool, ALICE, "fish_any", 10, now)
        .await
        .unwrap()
        .expect("running quest");
    assert_eq!(progress, 5);
    assert!(quests::add_progress(&pool, ALICE, "jade_cut", 1, now).await.unwrap().is_none());

    let paid = sweep_completions(&pool).await.unwrap();
    assert_eq!(paid.len(), 1);
    assert_eq!(paid[0].total_completed, 1);
    assert!(sweep_completions(&pool).await.unwrap().is_empty());

    let profile = users::get_or_create_user(&pool, ALICE).await.unwrap();
    assert_eq!(profile.currency, quest.reward_currency);
    assert_eq!(profile.luck, quest.reward_luck);
    assert_eq!(quests::participation(&pool, &quest.quest_id).await.unwrap(), (1, 1));
}

#[tokio::test]
async fn daily_quest_is_generated_once_and_can_be_forced() {
    let pool = fresh_db().await;
    let now = Utc::now();
    let first = generate_daily_quest(&pool, now).await.unwrap().expect("new quest");
    assert!(generate_daily_quest(&pool, now).await.unwrap().is_none());

    let forced = force_daily_quest(&pool, now).await.unwrap();
    assert_eq!(forced.quest_id, first.quest_id);
    let active = quests::active_quest(&pool, now).await.unwrap().expect("active");
    assert_eq!(active.quest_type, forced.quest_type);
    assert_eq!(quests::recent_quests(&pool, 5).await.unwrap().len(), 1);
}

#[tokio::test]
async fn fish_sale_moves_stock_into_currency() {
    let pool = fresh_db().await;
    database::fishing::record_catches(&pool, ALICE, &[("Ikan Teri", 3), ("Ikan Paus", 1)], 1, Utc::now(), true)
        .await
        .unwrap();
    let stacks: Vec<(String, i64)> = database::fishing::inventory(&pool, ALICE)
        .await
        .unwrap()
        .into_iter()
        .map(|s| (s.fish_name, s.amount))
        .collect();
    assert_eq!(stacks.len(), 2);

    let receipt = price_sale(&FishMarket::at_base(Utc::now()), &stacks, 1);
    assert!(execute_sale(&pool, ALICE, &receipt).await.unwrap());
    assert_eq!(balance(&pool, ALICE).await, receipt.net);
    assert!(database::fishing::inventory(&pool, ALICE).await.unwrap().is_empty());
    assert!(!execute_sale(&pool, ALICE, &receipt).await.unwrap());
    assert_eq!(database::tax::user_total(&pool, ALICE).await.unwrap(), receipt.tax);
}

#[test]
fn on_disk_database_survives_a_reconnect() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}", dir.path().join("mochi.db").display());
    tokio_test::block_on(async {
        let pool = database::connect(&url, 2).await.unwrap();
        database::create_schema(&pool).await.unwrap();
        users::add_currency(&pool, ALICE, 1_234).await.unwrap();
        pool.close().await;

        let pool = database::connect(&url, 2).await.unwrap();
        assert_eq!(balance(&pool, ALICE).await, 1_234);
        let dump = maintenance::backup(&pool).await.unwrap();
        let rows = dump["users"].as_array().expect("users table");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["currency"], 1_234);
        pool.close().await;
    });
}
