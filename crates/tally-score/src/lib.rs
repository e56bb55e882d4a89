//! # tally-score
//! Row classification and points aggregation.
//!
//! Two parallel [`PointsAggregator`](tally_core::traits::PointsAggregator)
//! policies share one classifier:
//! - **Quantity** ([`QuantityAggregator`]): one row per task, points are the
//!   category's base points times the row quantity, gated by the
//!   [`QualityCeiling`] over the averaging window.
//! - **Flags** ([`FlagAggregator`]): up to three flagged credits per row, each
//!   with its own timestamp and credited worker, fixed points per credit and
//!   no ceiling.

pub mod aggregate;
pub mod ceiling;
pub mod classify;
pub mod flags;

pub use aggregate::QuantityAggregator;
pub use ceiling::QualityCeiling;
pub use classify::Classifier;
pub use flags::FlagAggregator;
