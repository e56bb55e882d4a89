//! Trait interfaces for Tally.
//!
//! These traits define the seams between crates and collaborators:
//! - [`PointsAggregator`]: turns rows into per-worker totals (tally-score implements)
//! - [`RowSource`]: supplies already-materialized rows (callers implement)

use crate::calendar::PeriodBounds;
use crate::error::SourceError;
use crate::types::Aggregation;

/// One scoring policy: a single pass over rows producing per-worker totals.
///
/// Implementations are pure. They must not read the clock or do I/O, and
/// skipped rows are counted in [`Aggregation::skipped`] rather than reported
/// as errors.
pub trait PointsAggregator {
    /// Row shape this policy consumes.
    type Row;

    /// Short policy name for logs.
    fn policy(&self) -> &'static str;

    /// Aggregate `rows`, in order, against the period `bounds`.
    fn aggregate(&self, rows: &[Self::Row], bounds: &PeriodBounds) -> Aggregation;
}

/// Supplier of rows, e.g. a spreadsheet export or a cached table.
///
/// Retries and size limits belong to the implementation; the engine calls
/// [`fetch_rows`](Self::fetch_rows) once per evaluation.
pub trait RowSource {
    type Row;

    fn fetch_rows(&self) -> Result<Vec<Self::Row>, SourceError>;
}

/// In-memory rows, mostly for tests and embedding.
impl<R: Clone> RowSource for Vec<R> {
    type Row = R;

    fn fetch_rows(&self) -> Result<Vec<R>, SourceError> {
        Ok(self.clone())
    }
}
