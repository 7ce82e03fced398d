//! Static fishing tables: species with rarity and weight, and the three upgrade tracks.

use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
}

impl Rarity {
    pub const ALL: [Rarity; 5] = [
        Rarity::Common,
        Rarity::Uncommon,
        Rarity::Rare,
        Rarity::Epic,
        Rarity::Legendary,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Rarity::Common => "⚪ Common",
            Rarity::Uncommon => "🟢 Uncommon",
            Rarity::Rare => "🔵 Rare",
            Rarity::Epic => "🟣 Epic",
            Rarity::Legendary => "🟡 Legendary",
        }
    }

    /// Rare and above get the rod bonus and count for `fish_rare` quests.
    pub fn is_rare_plus(&self) -> bool {
        *self >= Rarity::Rare
    }
}

#[derive(Debug, PartialEq)]
pub struct Fish {
    pub name: &'static str,
    pub emoji: &'static str,
    pub base_price: i64,
    pub weight: f64,
    pub rarity: Rarity,
}

const fn fish(name: &'static str, emoji: &'static str, base_price: i64, weight: f64, rarity: Rarity) -> Fish {
    Fish {
        name,
        emoji,
        base_price,
        weight,
        rarity,
    }
}

pub const FISH: &[Fish] = &[
    fish("Ikan Teri", "🐟", 50, 40.0, Rarity::Common),
    fish("Ikan Bandeng", "🐠", 100, 30.0, Rarity::Common),
    fish("Ikan Nila", "🐡", 150, 20.0, Rarity::Common),
    fish("Ikan Lele", "🎣", 120, 25.0, Rarity::Common),
    fish("Ikan Kakap", "🐟", 300, 15.0, Rarity::Uncommon),
    fish("Ikan Tongkol", "🐠", 400, 12.0, Rarity::Uncommon),
    fish("Ikan Kembung", "🐡", 350, 13.0, Rarity::Uncommon),
    fish("Ikan Tuna", "🐟", 800, 7.0, Rarity::Rare),
    fish("Ikan Salmon", "🐠", 1_000, 5.0, Rarity::Rare),
    fish("Ikan Barakuda", "🦈", 900, 6.0, Rarity::Rare),
    fish("Ikan Marlin", "🐟", 2_000, 3.0, Rarity::Epic),
    fish("Ikan Hiu", "🦈", 3_000, 2.0, Rarity::Epic),
    fish("Ikan Paus", "🐋", 10_000, 0.5, Rarity::Legendary),
    fish("Ikan Naga", "🐉", 50_000, 0.1, Rarity::Legendary),
];

pub fn find_fish(name: &str) -> Option<&'static Fish> {
    FISH.iter().find(|f| f.name == name)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpgradeKind {
    Rod,
    Robot,
    Net,
}

impl UpgradeKind {
    pub const ALL: [UpgradeKind; 3] = [UpgradeKind::Rod, UpgradeKind::Robot, UpgradeKind::Net];

    /// `fishing_upgrades.upgrade_type` value.
    pub fn key(&self) -> &'static str {
        match self {
            UpgradeKind::Rod => "fishing_rod",
            UpgradeKind::Robot => "fishing_robot",
            UpgradeKind::Net => "fishing_net",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            UpgradeKind::Rod => "Fishing Rod",
            UpgradeKind::Robot => "Fishing Robot",
            UpgradeKind::Net => "Fishing Net",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            UpgradeKind::Rod => "🎣",
            UpgradeKind::Robot => "🤖",
            UpgradeKind::Net => "🕸️",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            UpgradeKind::Rod => "More fish per cast and better odds for rare species",
            UpgradeKind::Robot => "Passive fish collected with `fishdaily`",
            UpgradeKind::Net => "Extra haul while you sit in a voice channel",
        }
    }

    pub fn max_level(&self) -> i64 {
        match self {
            UpgradeKind::Rod => 100,
            UpgradeKind::Robot => 50,
            UpgradeKind::Net => 150,
        }
    }

    fn base_cost(&self) -> f64 {
        match self {
            UpgradeKind::Rod => 200.0,
            UpgradeKind::Robot => 5_000.0,
            UpgradeKind::Net => 15_000.0,
        }
    }

    fn multiplier(&self) -> f64 {
        match self {
            UpgradeKind::Rod => 1.18,
            UpgradeKind::Robot => 1.20,
            UpgradeKind::Net => 1.15,
        }
    }

    pub fn bonus_per_level(&self) -> f64 {
        match self {
            UpgradeKind::Rod => 0.5,
            UpgradeKind::Robot => 10.0,
            UpgradeKind::Net => 5.0,
        }
    }

    /// Price of going from `current_level` to the next one.
    pub fn cost(&self, current_level: i64) -> i64 {
        (self.base_cost() * self.multiplier().powi(current_level as i32)).floor() as i64
    }
}

impl FromStr for UpgradeKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.to_lowercase();
        if s.contains("rod") {
            Ok(UpgradeKind::Rod)
        } else if s.contains("robot") || s.contains("bot") {
            Ok(UpgradeKind::Robot)
        } else if s.contains("net") {
            Ok(UpgradeKind::Net)
        } else {
            Err(())
        }
    }
}
