//! Pure game rules: the level curve, the gacha and jade odds, fishing tables and market.
use chrono::{TimeZone, Utc};
use mochi_bot::commands::fishing::data::{FISH, Rarity, UpgradeKind, find_fish};
use mochi_bot::commands::fishing::logic::{
    FishMarket, adjusted_weight, catch_tier, compare_points, fish_at, price_sale, total_weight,
};
use mochi_bot::commands::gacha::logic::{
    COMMON, MAX_LUCK_BONUS, RARE_TIERS, adjusted_rates, draw, luck_bonus,
};
use mochi_bot::commands::jade::logic::{
    JADE_TIERS, MIN_LOSS_CHANCE, calculate_reward, find_tier, jade_luck, risk_label,
};
use mochi_bot::commands::leveling::logic::{
    Rank, compute_level_up, portfolio_tier, total_xp_needed_for_level, xp_progress,
};
use rand::SeedableRng;
use rand::rngs::StdRng;

#[test]
fn xp_curve_is_cumulative() {
    assert_eq!(total_xp_needed_for_level(1), 0);
    assert_eq!(total_xp_needed_for_level(2), 3);
    assert_eq!(total_xp_needed_for_level(3), 8);
    assert_eq!(total_xp_needed_for_level(5), 24);
    assert_eq!(xp_progress(2, 5), (2, 5));
    assert_eq!(xp_progress(3, 1), (0, 7));
}

#[test]
fn level_up_sums_rewards_over_skipped_levels() {
    assert!(compute_level_up(1, 2).is_none());

    let up = compute_level_up(1, 8).expect("two levels");
    assert_eq!(up.new_level, 3);
    assert_eq!(up.gained(), 2);
    assert_eq!(up.currency, 50_000 * 2 + 50_000 * 3);
    assert_eq!(up.rolls, 2);
    assert_eq!(up.luck, 2);
    assert!(!up.rank_changed());

    let up = compute_level_up(9, total_xp_needed_for_level(10)).expect("one level");
    assert_eq!(up.new_level, 10);
    assert_eq!(up.rolls, 2);
    assert!(up.rank_changed());
}

#[test]
fn ranks_and_portfolio_tiers() {
    assert_eq!(Rank::for_level(1), Rank::Warga);
    assert_eq!(Rank::for_level(5), Rank::Prajurit);
    assert_eq!(Rank::for_level(14), Rank::Ksatria);
    assert_eq!(Rank::for_level(15), Rank::Bangsawan);
    assert_eq!(Rank::for_level(24), Rank::Adipati);
    assert_eq!(Rank::for_level(80), Rank::Raja);
    assert_eq!(portfolio_tier(0), "🥉 Bronze");
    assert_eq!(portfolio_tier(11), "🥇 Gold");
    assert_eq!(portfolio_tier(101), "👑 Master");
}

#[test]
fn gacha_table_is_a_distribution() {
    let base: f64 = RARE_TIERS.iter().map(|t| t.rate).sum::<f64>() + COMMON.rate;
    assert!((base - 1.0).abs() < 1e-9);
    for luck in [0, 37, 100, 5_000] {
        let total: f64 = adjusted_rates(luck).iter().map(|(_, r)| r).sum();
        assert!((total - 1.0).abs() < 1e-9, "luck {luck} sums to {total}");
    }
}

#[test]
fn gacha_luck_is_capped_and_shifts_rare_odds() {
    assert_eq!(luck_bonus(-5), 0.0);
    assert!((luck_bonus(50) - 0.05).abs() < 1e-12);
    assert_eq!(luck_bonus(10_000), MAX_LUCK_BONUS);

    assert_eq!(draw(0.0, 0).label, RARE_TIERS[0].label);
    assert_eq!(draw(0.5, 0).label, COMMON.label);
    // 0.15 is common without luck, rare once the capped bonus is applied.
    assert_eq!(draw(0.15, 0).label, COMMON.label);
    assert_ne!(draw(0.15, 100).label, COMMON.label);
}

#[test]
fn jade_reward_bands() {
    let common = &JADE_TIERS[0];
    let jackpot = calculate_reward(common, 0.0, 0.0, 0.5);
    assert!(jackpot.jackpot);
    assert_eq!(jackpot.reward, 1_000);

    let loss = calculate_reward(common, 0.0, 0.3, 0.5);
    assert!(!loss.jackpot);
    assert_eq!(loss.reward, 47);
    assert!(!loss.is_win(common.price));
    assert_eq!(loss.profit(common.price), -53);

    let low_win = calculate_reward(common, 0.0, 0.9, 0.0);
    assert_eq!(low_win.reward, 105);
    assert!(low_win.is_win(common.price));
    let top_win = calculate_reward(common, 0.0, 0.9, 1.0);
    assert!((199..=200).contains(&top_win.reward));
}

#[test]
fn jade_luck_lowers_loss_down_to_the_floor() {
    assert!((jade_luck(50) - 0.05).abs() < 1e-12);
    assert_eq!(jade_luck(10_000), 0.2);
    let legendary = find_tier("imperial").expect("imperial stone");
    assert!((legendary.adjusted_loss(0.2) - 0.7).abs() < 1e-9);
    assert_eq!(legendary.adjusted_loss(5.0), MIN_LOSS_CHANCE);
    assert_eq!(risk_label(legendary.loss_chance), "🔴 EXTREME");
    assert_eq!(find_tier("giok").map(|t| t.key), Some("rare"));
    assert!(find_tier("granite").is_none());
}

#[test]
fn rod_bonus_only_touches_rare_species() {
    let teri = find_fish("Ikan Teri").expect("teri");
    let tuna = find_fish("Ikan Tuna").expect("tuna");
    assert_eq!(teri.rarity, Rarity::Common);
    assert_eq!(adjusted_weight(teri, 10), teri.weight);
    assert_eq!(adjusted_weight(tuna, 10), tuna.weight + 5.0);
    assert!(total_weight(10) > total_weight(0));
    assert_eq!(fish_at(0.0, 0).name, FISH[0].name);
    assert_eq!(fish_at(total_weight(0), 0).name, FISH[FISH.len() - 1].name);
}

#[test]
fn catch_tiers_grow_with_the_rod() {
    assert_eq!(catch_tier(0), (1..=2, 1..=1));
    assert_eq!(catch_tier(9), (1..=2, 1..=2));
    assert_eq!(catch_tier(10), (2..=3, 1..=2));
    assert_eq!(catch_tier(49), (2..=4, 1..=3));
    assert_eq!(catch_tier(100), (3..=5, 2..=4));
}

#[test]
fn upgrade_costs_start_at_base_and_grow() {
    assert_eq!(UpgradeKind::Rod.cost(0), 200);
    assert_eq!(UpgradeKind::Robot.cost(0), 5_000);
    assert_eq!(UpgradeKind::Net.cost(0), 15_000);
    for kind in UpgradeKind::ALL {
        assert!(kind.cost(10) > kind.cost(9));
    }
    assert_eq!("Fishing Rod".parse::<UpgradeKind>(), Ok(UpgradeKind::Rod));
}

#[test]
fn market_sale_applies_the_fee_below_the_exempt_level() {
    let market = FishMarket::at_base(Utc::now());
    let stacks = vec![("Ikan Teri".to_string(), 3), ("Ikan Paus".to_string(), 1)];
    assert_eq!(market.value_of(&stacks), 10_150);

    let receipt = price_sale(&market, &stacks, 1);
    assert_eq!(receipt.gross, 10_150);
    assert_eq!(receipt.tax, 2_537);
    assert_eq!(receipt.net, 7_613);

    let exempt = price_sale(&market, &stacks, 20);
    assert_eq!((exempt.tax, exempt.net), (0, 10_150));
}

#[test]
fn repricing_stays_within_twenty_percent() {
    let mut market = FishMarket::at_base(Utc::now());
    let mut rng = StdRng::seed_from_u64(7);
    let later = Utc.with_ymd_and_hms(2024, 5, 1, 12, 15, 0).unwrap();
    market.reprice(&mut rng, later);
    assert_eq!(market.updated_at, later);
    for fish in FISH {
        let price = market.price_of(fish.name);
        assert!(price >= (fish.base_price as f64 * 0.8).floor() as i64);
        assert!(price <= (fish.base_price as f64 * 1.2) as i64);
    }
}

#[test]
fn comparison_splits_ties() {
    assert_eq!(compare_points(&[3, 1, 2], &[1, 1, 5]), (1.5, 1.5));
    assert_eq!(compare_points(&[9, 9, 9], &[0, 0, 0]), (3.0, 0.0));
}
