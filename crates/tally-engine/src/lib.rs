//! # tally-engine
//! Tiers, leaderboard and dashboard evaluation.
//!
//! Consumes the per-worker totals produced by a
//! [`PointsAggregator`](tally_core::traits::PointsAggregator) and derives
//! everything a worker's dashboard shows:
//! - **Tiers** ([`TierEngine`]): pay and multiplier tier lookup, progress to
//!   the next tier, and the earnings figure.
//! - **Leaderboard** ([`leaderboard::rank`]): competition ranking of
//!   current-period scores with a top bracket and a neighbor window.
//! - **Evaluation** ([`Engine`]): one stateless pass from rows, viewer and
//!   "now" to a [`DashboardOutcome`].

pub mod dashboard;
pub mod engine;
pub mod format;
pub mod leaderboard;
pub mod tiers;

pub use dashboard::{Dashboard, DashboardOutcome};
pub use engine::{Engine, FlagEngine, FromScoring, QuantityEngine};
pub use leaderboard::{Leaderboard, LeaderboardEntry};
pub use tiers::TierEngine;
