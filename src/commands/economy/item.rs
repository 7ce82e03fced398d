//! XP booster items: the five multiplier tiers stored as counters on the user row.

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoosterItem {
    X2,
    X4,
    X8,
    X10,
    X20,
}

impl BoosterItem {
    pub const ALL: [BoosterItem; 5] = [
        BoosterItem::X2,
        BoosterItem::X4,
        BoosterItem::X8,
        BoosterItem::X10,
        BoosterItem::X20,
    ];

    /// The `users` column holding this item's count.
    pub fn column(&self) -> &'static str {
        match self {
            BoosterItem::X2 => "xp_2x",
            BoosterItem::X4 => "xp_4x",
            BoosterItem::X8 => "xp_8x",
            BoosterItem::X10 => "xp_10x",
            BoosterItem::X20 => "xp_20x",
        }
    }

    pub fn multiplier(&self) -> f64 {
        match self {
            BoosterItem::X2 => 2.0,
            BoosterItem::X4 => 4.0,
            BoosterItem::X8 => 8.0,
            BoosterItem::X10 => 10.0,
            BoosterItem::X20 => 20.0,
        }
    }

    pub fn short(&self) -> &'static str {
        match self {
            BoosterItem::X2 => "2x",
            BoosterItem::X4 => "4x",
            BoosterItem::X8 => "8x",
            BoosterItem::X10 => "10x",
            BoosterItem::X20 => "20x",
        }
    }

    /// Count of this item on a profile row.
    pub fn count_in(&self, profile: &crate::database::models::Profile) -> i64 {
        match self {
            BoosterItem::X2 => profile.xp_2x,
            BoosterItem::X4 => profile.xp_4x,
            BoosterItem::X8 => profile.xp_8x,
            BoosterItem::X10 => profile.xp_10x,
            BoosterItem::X20 => profile.xp_20x,
        }
    }
}

impl fmt::Display for BoosterItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "XP {}", self.short())
    }
}

impl FromStr for BoosterItem {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().trim_start_matches("xp_").trim_start_matches("xp") {
            "2x" | "2" => Ok(BoosterItem::X2),
            "4x" | "4" => Ok(BoosterItem::X4),
            "8x" | "8" => Ok(BoosterItem::X8),
            "10x" | "10" => Ok(BoosterItem::X10),
            "20x" | "20" => Ok(BoosterItem::X20),
            _ => Err(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_user_spellings() {
        assert_eq!("2x".parse(), Ok(BoosterItem::X2));
        assert_eq!("XP_20X".parse(), Ok(BoosterItem::X20));
        assert_eq!("10".parse(), Ok(BoosterItem::X10));
        assert!("3x".parse::<BoosterItem>().is_err());
    }
}
