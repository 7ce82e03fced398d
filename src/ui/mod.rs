//! Shared embed styling.
pub mod style;
