// src/commands/mod.rs
// One module per game system. Each exposes `run_*` prefix entry points returning `CommandResult`.

pub mod achievements;
pub mod admin;
pub mod common;
pub mod economy;
pub mod fishing;
pub mod gacha;
pub mod help;
pub mod jade;
pub mod leveling;
pub mod quests;
pub mod shop;
pub mod tax;
pub mod trading;
