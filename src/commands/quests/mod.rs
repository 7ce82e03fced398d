//! The command module for the daily global quest: one server-wide objective per WIB day.

pub mod logic;
pub mod run;
pub mod ui;
