// src/commands/trading/mod.rs
// Simulated crypto trading against live CoinGecko prices, plus price alerts.

pub mod alerts;
pub mod logic;
pub mod run;
pub mod ui;
