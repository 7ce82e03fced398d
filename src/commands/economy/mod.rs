//! This module contains the player-to-player economy: booster items, item trades,
//! transfers and the weekly rank bonus.

pub mod item;
pub mod logic;
pub mod run;
