//! Long-lived services shared by the commands: the price client, its cache and the
//! background loops.

pub mod cache;
pub mod prices;
pub mod scheduler;
