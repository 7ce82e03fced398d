// src/commands/tax/mod.rs
// Transaction taxes and the weekly 5% income tax.

pub mod logic;
pub mod run;
