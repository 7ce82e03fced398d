// src/commands/gacha/mod.rs
// Gacha rolls earned by leveling, with luck shifting weight toward the rare prizes.

pub mod logic;
pub mod run;
