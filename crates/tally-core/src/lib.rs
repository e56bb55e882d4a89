//! # tally-core
//! Foundation types, configuration and the period calendar for Tally.

pub mod calendar;
pub mod config;
pub mod constants;
pub mod error;
pub mod identity;
pub mod traits;
pub mod types;
