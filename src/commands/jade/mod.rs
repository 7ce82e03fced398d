// src/commands/jade/mod.rs
// Jade cutting: buy a stone, confirm, then cut it for a random multiple of its price.

pub mod logic;
pub mod run;
pub mod ui;
