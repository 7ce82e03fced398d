// src/commands/shop/mod.rs
// The rotating daily shop: catalog, generation at 00:00 WIB, purchases and buffs.

pub mod logic;
pub mod run;
pub mod ui;
