// src/commands/achievements/mod.rs
// Permanent milestones that grant Rupiah and luck once.

pub mod logic;
pub mod run;
