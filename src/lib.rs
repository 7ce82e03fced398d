// Library entry so integration tests and the maintenance CLI can reference internal modules.
// The binary (`main.rs`) wires these into a serenity client.
pub mod commands;
pub mod config;
pub mod constants;
pub mod database;
pub mod error;
pub mod handler;
pub mod model;
pub mod services;
pub mod ui;
pub mod util;

pub use model::AppState;
