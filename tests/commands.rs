//! Command names, aliases and help categories as players type them.
use chrono::{Duration, Utc};
use mochi_bot::commands::help::HelpCategory;
use mochi_bot::commands::leveling::kumpul::{cooldown_left, posted_portfolio, xp_award};
use mochi_bot::handler::{Command, parse_invocation};
use serenity::model::id::UserId;

#[test]
fn core_commands_resolve() {
    let expected = [
        ("kumpul", Command::Kumpul),
        ("profile", Command::Profile),
        ("gacha", Command::Gacha),
        ("fish", Command::Fish),
        ("af", Command::Autofish),
        ("bjade", Command::BuyJade),
        ("buy", Command::Buy),
        ("sbuy", Command::ShopBuy),
        ("qstats", Command::QuestStats),
        ("taxh", Command::TaxHistory),
        ("shoph", Command::ShopHistory),
        ("taxinfo", Command::TaxInfo),
        ("shopinfo", Command::ShopInfo),
        ("forcequestgen", Command::ForceQuestGen),
    ];
    for (word, command) in expected {
        assert_eq!(word.parse::<Command>(), Ok(command), "`{word}`");
    }
}

#[test]
fn canonical_name_round_trips() {
    for word in ["pay", "inv", "jlb", "fc", "dailyshop", "help_trade"] {
        let command: Command = word.parse().expect(word);
        let canonical = command.name();
        assert_eq!(canonical.parse::<Command>(), Ok(command));
    }
    assert_eq!(Command::Autofish.name(), "autofish");
}

#[test]
fn unknown_words_are_ignored() {
    for word in ["dance", "lottery", "", "fishy"] {
        assert!(word.parse::<Command>().is_err(), "`{word}` should not resolve");
    }
}

#[test]
fn invocation_splits_arguments() {
    let (name, args) = parse_invocation("mochi!tradeitem @bob 2x 1 25000", "mochi!").expect("command");
    assert_eq!(name, "tradeitem");
    assert_eq!(args, ["@bob", "2x", "1", "25000"]);
    assert_eq!(parse_invocation("hello mochi!top", "mochi!"), None);
}

#[test]
fn help_categories() {
    assert_eq!("ach".parse::<HelpCategory>(), Ok(HelpCategory::Achievements));
    assert_eq!("pajak".parse::<HelpCategory>(), Ok(HelpCategory::Tax));
    assert_eq!("Q".parse::<HelpCategory>(), Ok(HelpCategory::Quests));
    assert!("pets".parse::<HelpCategory>().is_err());
}

#[test]
fn kumpul_gatekeeping() {
    let now = Utc::now();
    assert_eq!(cooldown_left(None, now), None);
    assert_eq!(cooldown_left(Some(now - Duration::days(2)), now), Some(Duration::days(5)));
    assert_eq!(cooldown_left(Some(now - Duration::days(7)), now), None);

    let me = UserId::new(1);
    let other = UserId::new(2);
    assert!(posted_portfolio([(other, "nice"), (me, "my new work")], me, "mochi!"));
    assert!(!posted_portfolio([(me, "mochi!kumpul"), (other, "art")], me, "mochi!"));
}

#[test]
fn fire_xp_scales_with_boosters() {
    assert_eq!(xp_award(3, 3, 1.0, false), None);
    assert_eq!(xp_award(0, 4, 1.0, false), Some(4));
    assert_eq!(xp_award(2, 5, 4.0, false), Some(12));
    assert_eq!(xp_award(2, 5, 4.0, true), Some(24));
    assert_eq!(xp_award(0, 1, 0.5, false), Some(1));
}
