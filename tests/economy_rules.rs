//! Taxes, trading fills, the daily shop roll and quest scheduling.
use chrono::{NaiveDate, TimeZone, Utc};
use mochi_bot::commands::quests::logic::{
    QuestKind, build_quest, create_progress_bar, is_generation_hour, next_reset as quest_reset,
    quest_id_for, template,
};
use mochi_bot::commands::shop::logic::{
    discount_percent, find_item, generate_slots, next_reset as shop_reset, shop_id_for,
};
use mochi_bot::commands::tax::logic::{
    TaxKind, calculate_transaction_tax, can_force, is_exempt, is_weekly_tax_window,
    next_collection, week_start,
};
use mochi_bot::commands::trading::logic::{buy_fill, convert, render_chart, sell_fill};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::HashSet;

#[test]
fn transaction_tax_by_kind() {
    assert_eq!(calculate_transaction_tax(1_000, TaxKind::Income, 1), (50, 950));
    assert_eq!(calculate_transaction_tax(1_000_000, TaxKind::TradingBuy, 5), (1_000, 999_000));
    assert_eq!(calculate_transaction_tax(25_000, TaxKind::ItemTrade, 19), (2_500, 22_500));
    assert_eq!(calculate_transaction_tax(1_000, TaxKind::FishingSell, 3), (250, 750));
    assert_eq!(calculate_transaction_tax(999, TaxKind::TradingSell, 1), (0, 999));
    assert_eq!(calculate_transaction_tax(0, TaxKind::Income, 1), (0, 0));
}

#[test]
fn level_twenty_pays_nothing() {
    assert!(!is_exempt(19));
    assert!(is_exempt(20));
    for kind in TaxKind::ALL {
        assert_eq!(calculate_transaction_tax(50_000, kind, 20), (0, 50_000));
    }
    assert_eq!(TaxKind::label_for("jade_cut_tax"), TaxKind::JadeCut.label());
    assert_eq!(TaxKind::label_for("mystery"), "❔ Other");
}

#[test]
fn weekly_tax_calendar() {
    let wednesday = Utc.with_ymd_and_hms(2024, 1, 10, 9, 30, 0).unwrap();
    let monday = Utc.with_ymd_and_hms(2024, 1, 8, 0, 0, 0).unwrap();
    assert_eq!(week_start(wednesday), monday);

    assert!(is_weekly_tax_window(Utc.with_ymd_and_hms(2024, 1, 8, 17, 3, 0).unwrap()));
    assert!(!is_weekly_tax_window(Utc.with_ymd_and_hms(2024, 1, 8, 17, 5, 0).unwrap()));
    assert!(!is_weekly_tax_window(Utc.with_ymd_and_hms(2024, 1, 9, 17, 0, 0).unwrap()));

    let monday_morning = Utc.with_ymd_and_hms(2024, 1, 8, 10, 0, 0).unwrap();
    assert_eq!(
        next_collection(monday_morning),
        Utc.with_ymd_and_hms(2024, 1, 8, 17, 0, 0).unwrap()
    );
    assert_eq!(
        next_collection(Utc.with_ymd_and_hms(2024, 1, 8, 17, 0, 0).unwrap()),
        Utc.with_ymd_and_hms(2024, 1, 15, 17, 0, 0).unwrap()
    );
}

#[test]
fn forced_collection_once_per_week() {
    let wednesday = Utc.with_ymd_and_hms(2024, 1, 10, 9, 30, 0).unwrap();
    assert!(can_force(None, wednesday));
    assert!(!can_force(Some(Utc.with_ymd_and_hms(2024, 1, 8, 17, 0, 0).unwrap()), wednesday));
    assert!(can_force(Some(Utc.with_ymd_and_hms(2024, 1, 7, 23, 59, 0).unwrap()), wednesday));
}

#[test]
fn buy_and_sell_fills() {
    let buy = buy_fill(1_000_000, 500_000.0, 5);
    assert_eq!((buy.tax, buy.net), (1_000, 999_000));
    assert!((buy.amount - 1.998).abs() < 1e-12);

    let sell = sell_fill(2.0, 600.0, 500.0, 5);
    assert_eq!((sell.gross, sell.tax, sell.net), (1_200, 1, 1_199));
    assert!((sell.profit_loss - 200.0).abs() < 1e-9);
    assert!((sell.profit_pct - 20.0).abs() < 1e-9);

    let exempt = sell_fill(2.0, 600.0, 0.0, 25);
    assert_eq!((exempt.tax, exempt.net), (0, 1_200));
    assert_eq!(exempt.profit_pct, 0.0);

    assert_eq!(convert(2.0, 100.0, 50.0), (200.0, 4.0));
}

#[test]
fn chart_marks_each_sample() {
    let chart = render_chart(&[1.0, 2.0, 3.0], 3, 10);
    assert_eq!(chart, "  ●\n ●│\n●││");
    assert_eq!(render_chart(&[], 3, 10), "");

    let long: Vec<f64> = (0..70).map(f64::from).collect();
    let chart = render_chart(&long, 12, 35);
    assert_eq!(chart.lines().count(), 12);
    assert!(chart.lines().all(|line| line.chars().count() == 35));
}

#[test]
fn daily_shop_roll_respects_its_bounds() {
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..25 {
        let slots = generate_slots(&mut rng, "20240110");
        assert!((8..=12).contains(&slots.len()));
        let specials = slots.iter().filter(|s| s.is_special).count();
        assert!((1..=2).contains(&specials));
        let keys: HashSet<&str> = slots.iter().map(|s| s.item_key.as_str()).collect();
        assert_eq!(keys.len(), slots.len());
        for slot in &slots {
            let item = find_item(&slot.item_key).expect("catalog item");
            assert!(slot.stock >= 1 && slot.stock <= item.max_stock);
            if slot.is_special {
                assert!((20..=50).contains(&discount_percent(slot)));
            } else {
                assert_eq!(slot.price, item.base_price);
            }
        }
    }
}

#[test]
fn shop_days_follow_jakarta_time() {
    // 18:00 UTC is already 01:00 the next day in WIB.
    let evening = Utc.with_ymd_and_hms(2024, 1, 10, 18, 0, 0).unwrap();
    assert_eq!(shop_id_for(evening), "20240111");
    let noon = Utc.with_ymd_and_hms(2024, 1, 10, 12, 0, 0).unwrap();
    assert_eq!(shop_reset(noon), Utc.with_ymd_and_hms(2024, 1, 10, 17, 0, 0).unwrap());
}

#[test]
fn quests_are_keyed_by_wib_day() {
    let day = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
    assert_eq!(quest_id_for(day), "global_20240110");

    let now = Utc.with_ymd_and_hms(2024, 1, 10, 0, 30, 0).unwrap();
    assert!(is_generation_hour(now));
    assert!(!is_generation_hour(Utc.with_ymd_and_hms(2024, 1, 10, 3, 0, 0).unwrap()));
    assert_eq!(quest_reset(now), Utc.with_ymd_and_hms(2024, 1, 11, 0, 0, 0).unwrap());

    let quest = build_quest(template(QuestKind::JadeCut), 3, now);
    assert_eq!(quest.quest_id, "global_20240110");
    assert_eq!(quest.quest_type, "jade_cut");
    assert_eq!(quest.target_amount, 3);
    assert!(quest.expires_at > now);
    assert_eq!("gacha_roll".parse::<QuestKind>(), Ok(QuestKind::GachaRoll));
    assert!("GACHA".parse::<QuestKind>().is_err());
}

#[test]
fn progress_bar_keeps_its_length() {
    for (current, target) in [(0, 10), (3, 10), (7, 10), (25, 10), (1, 0)] {
        assert_eq!(create_progress_bar(current, target, 10).chars().count(), 10);
    }
    assert_eq!(create_progress_bar(25, 10, 3), "🟩🟩🟩");
}
