//! This module acts as a central hub for all database-related logic.
//! Each submodule owns the SQL for one table family, e.g. `database::fishing::add_fish`.

pub mod achievements;
pub mod fishing;
pub mod init;
pub mod jade;
pub mod kumpul;
pub mod maintenance;
pub mod models;
pub mod quests;
pub mod shop;
pub mod tax;
pub mod trading;
pub mod users;

pub use init::{DbPool, connect, create_schema};
