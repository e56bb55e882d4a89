//! Quantity aggregation policy.
//!
//! One pass over the rows in input order. For each row:
//!
//! 1. Skip when the identity is blank, the timestamp is missing, the status
//!    is not allowed, the quantity is not finite, or the category does not
//!    classify.
//! 2. `points = base_points(kind) * quantity`; a non-finite error count is 0.
//! 3. Skip rows whose day falls outside the averaging window.
//! 4. Advance the worker's window quantity and error counters.
//! 5. In [`CeilingMode::Incremental`] the points count only if the advanced
//!    counters are still under the ceiling. A rejected row still advances the
//!    counters, so later rows stay excluded until the ratio recovers. The
//!    outcome therefore depends on row order.
//!    In [`CeilingMode::EndOfWindow`] the points always count.
//! 6. Points count towards the window total and, when the row's day is in the
//!    current period, the current total.
//!
//! Final eligibility applies the ceiling to the final counters.

use std::collections::BTreeMap;

use tally_core::calendar::PeriodBounds;
use tally_core::config::{CeilingMode, QuantityScoring};
use tally_core::error::ConfigError;
use tally_core::identity;
use tally_core::traits::PointsAggregator;
use tally_core::types::{ActivityRow, Aggregation, SkipReason, TaskKind};
use tracing::{debug, trace};

use crate::ceiling::QualityCeiling;
use crate::classify::Classifier;

#[derive(Debug, Clone)]
pub struct QuantityAggregator {
    classifier: Classifier,
    base_points: BTreeMap<TaskKind, f64>,
    allowed_statuses: Vec<String>,
    ceiling: QualityCeiling,
    mode: CeilingMode,
}

impl QuantityAggregator {
    /// Build from a validated scoring table.
    pub fn from_config(config: &QuantityScoring) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            classifier: Classifier::new(
                config.categories.iter().map(|c| (c.kind, c.keyword.as_str())),
            ),
            base_points: config.categories.iter().map(|c| (c.kind, c.points)).collect(),
            allowed_statuses: config
                .allowed_statuses
                .iter()
                .map(|s| s.trim().to_string())
                .collect(),
            ceiling: QualityCeiling::from_config(&config.ceiling),
            mode: config.ceiling.mode,
        })
    }

    pub fn ceiling(&self) -> QualityCeiling {
        self.ceiling
    }

    pub fn mode(&self) -> CeilingMode {
        self.mode
    }

    /// Points for `row`, or the reason it contributes nothing. Window
    /// membership is not checked here.
    fn score_row(&self, row: &ActivityRow) -> Result<(String, f64), SkipReason> {
        let worker = identity::normalize(&row.worker_id);
        if worker.is_empty() {
            return Err(SkipReason::MissingIdentity);
        }
        if row.timestamp.is_none() {
            return Err(SkipReason::InvalidTimestamp);
        }
        let status = row.status.trim();
        if !self.allowed_statuses.iter().any(|s| s == status) {
            return Err(SkipReason::DisallowedStatus);
        }
        if !row.quantity.is_finite() {
            return Err(SkipReason::NonFiniteQuantity);
        }
        let kind = self
            .classifier
            .classify(&row.category)
            .ok_or(SkipReason::Unclassified)?;
        let base = self.base_points.get(&kind).copied().unwrap_or(0.0);
        Ok((worker, base * row.quantity))
    }
}

impl PointsAggregator for QuantityAggregator {
    type Row = ActivityRow;

    fn policy(&self) -> &'static str {
        "quantity"
    }

    fn aggregate(&self, rows: &[ActivityRow], bounds: &PeriodBounds) -> Aggregation {
        let mut agg = Aggregation::default();

        for row in rows {
            let (worker, points) = match self.score_row(row) {
                Ok(scored) => scored,
                Err(reason) => {
                    trace!(?reason, worker = %row.worker_id, "aggregate: row skipped");
                    agg.record_skip(reason);
                    continue;
                }
            };
            // score_row rejects rows without a timestamp.
            let Some(ts) = row.timestamp else { continue };
            if !bounds.contains_window(ts) {
                agg.record_skip(SkipReason::OutsideWindow);
                continue;
            }

            let errors = if row.errors.is_finite() { row.errors } else { 0.0 };
            let totals = agg.totals.entry(worker).or_default();
            totals.window_quantity += row.quantity;
            totals.window_errors += errors;

            let counts = match self.mode {
                CeilingMode::Incremental => self
                    .ceiling
                    .permits(totals.window_quantity, totals.window_errors),
                CeilingMode::EndOfWindow => true,
            };
            if !counts {
                trace!(
                    quantity = totals.window_quantity,
                    errors = totals.window_errors,
                    "aggregate: over quality ceiling, points discarded"
                );
                continue;
            }

            totals.window_points += points;
            if bounds.contains_current(ts) {
                totals.current_period_points += points;
            }
            agg.counted += 1;
        }

        for totals in agg.totals.values_mut() {
            totals.quality_eligible = self
                .ceiling
                .permits(totals.window_quantity, totals.window_errors);
        }

        debug!(
            policy = self.policy(),
            rows = rows.len(),
            counted = agg.counted,
            skipped = agg.skipped_total(),
            workers = agg.totals.len(),
            "aggregate: done"
        );
        agg
    }
}
