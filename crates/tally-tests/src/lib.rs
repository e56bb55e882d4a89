//! Integration test suite for Tally.
//!
//! Exercises the full path from raw rows through aggregation, tiers and the
//! leaderboard for both deployment presets.

pub mod helpers;
