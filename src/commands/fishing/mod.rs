// src/commands/fishing/mod.rs
// Fishing: species data, catch rules, the fish market, upgrades and auto-fishing.

pub mod autofish;
pub mod data;
pub mod logic;
pub mod run;
pub mod ui;
