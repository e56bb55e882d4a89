//! Dashboard evaluation.
//!
//! [`Engine`] binds an [`EngineConfig`] to one aggregation policy and turns
//! `(rows, viewer, now)` into a [`DashboardOutcome`]. It holds no state
//! between evaluations and never reads the clock.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use tally_core::calendar::{PeriodBounds, PeriodCalendar};
use tally_core::config::{EngineConfig, ScoringConfig};
use tally_core::error::{ConfigError, TallyError};
use tally_core::identity;
use tally_core::traits::{PointsAggregator, RowSource};
use tally_core::types::Aggregation;
use tally_score::{FlagAggregator, QuantityAggregator};
use tracing::debug;

use crate::dashboard::{Dashboard, DashboardOutcome};
use crate::leaderboard::{self, Leaderboard};
use crate::tiers::TierEngine;

/// An aggregation policy that can be built from the scoring section of a
/// config.
pub trait FromScoring: PointsAggregator + Sized {
    fn from_scoring(scoring: &ScoringConfig) -> Result<Self, ConfigError>;
}

impl FromScoring for QuantityAggregator {
    fn from_scoring(scoring: &ScoringConfig) -> Result<Self, ConfigError> {
        match scoring {
            ScoringConfig::Quantity(q) => Self::from_config(q),
            other => Err(ConfigError::PolicyMismatch {
                expected: "quantity",
                found: other.policy_name(),
            }),
        }
    }
}

impl FromScoring for FlagAggregator {
    fn from_scoring(scoring: &ScoringConfig) -> Result<Self, ConfigError> {
        match scoring {
            ScoringConfig::Flags(f) => Self::from_config(f),
            other => Err(ConfigError::PolicyMismatch {
                expected: "flags",
                found: other.policy_name(),
            }),
        }
    }
}

pub type QuantityEngine = Engine<QuantityAggregator>;
pub type FlagEngine = Engine<FlagAggregator>;

#[derive(Debug, Clone)]
pub struct Engine<A> {
    calendar: PeriodCalendar,
    aggregator: A,
    tiers: TierEngine,
    /// Normalized, deduplicated.
    roster: Vec<String>,
}

impl<A: PointsAggregator> Engine<A> {
    /// Validate `config` and pair it with `aggregator`.
    pub fn new(config: &EngineConfig, aggregator: A) -> Result<Self, ConfigError> {
        config.validate()?;
        let roster: BTreeSet<String> = config
            .roster
            .iter()
            .map(|w| identity::normalize(w))
            .filter(|w| !w.is_empty())
            .collect();
        Ok(Self {
            calendar: PeriodCalendar::new(config.calendar.clone()),
            aggregator,
            tiers: TierEngine::from_config(&config.tiers)?,
            roster: roster.into_iter().collect(),
        })
    }

    /// Build the aggregator named by the config's scoring section.
    pub fn from_config(config: &EngineConfig) -> Result<Self, ConfigError>
    where
        A: FromScoring,
    {
        Self::new(config, A::from_scoring(&config.scoring)?)
    }

    pub fn tiers(&self) -> &TierEngine {
        &self.tiers
    }

    pub fn bounds(&self, now: DateTime<Utc>) -> Result<PeriodBounds, ConfigError> {
        self.calendar.bounds_at(now)
    }

    pub fn aggregate(
        &self,
        rows: &[A::Row],
        now: DateTime<Utc>,
    ) -> Result<(PeriodBounds, Aggregation), ConfigError> {
        let bounds = self.bounds(now)?;
        let agg = self.aggregator.aggregate(rows, &bounds);
        Ok((bounds, agg))
    }

    /// Current-period points for every aggregated worker, plus zero for
    /// roster workers without rows.
    pub fn standings(&self, agg: &Aggregation) -> Vec<(String, f64)> {
        let mut out: Vec<(String, f64)> = agg
            .totals
            .iter()
            .map(|(worker, t)| (worker.clone(), t.current_period_points))
            .collect();
        out.extend(
            self.roster
                .iter()
                .filter(|w| !agg.totals.contains_key(*w))
                .map(|w| (w.clone(), 0.0)),
        );
        out
    }

    pub fn leaderboard(
        &self,
        rows: &[A::Row],
        viewer: &str,
        now: DateTime<Utc>,
    ) -> Result<Leaderboard, ConfigError> {
        let (_, agg) = self.aggregate(rows, now)?;
        Ok(leaderboard::rank(self.standings(&agg), viewer))
    }

    /// Evaluate the dashboard for `viewer`.
    ///
    /// A blank viewer is [`DashboardOutcome::NoAccess`] whatever the rows;
    /// otherwise an empty row set is [`DashboardOutcome::NoData`].
    pub fn evaluate(
        &self,
        rows: &[A::Row],
        viewer: &str,
        now: DateTime<Utc>,
    ) -> Result<DashboardOutcome, ConfigError> {
        let viewer = identity::normalize(viewer);
        if viewer.is_empty() {
            debug!("evaluate: no viewer identity");
            return Ok(DashboardOutcome::NoAccess);
        }
        if rows.is_empty() {
            debug!(%viewer, "evaluate: no rows");
            return Ok(DashboardOutcome::NoData);
        }

        let (bounds, agg) = self.aggregate(rows, now)?;
        let totals = agg.totals_for(&viewer);

        let average = totals.window_points / f64::from(bounds.periods_in_window);
        let window_average = if average.is_finite() { average.floor() } else { 0.0 };

        let pay = self.tiers.pay_tier(totals.current_period_points);
        let multiplier = self.tiers.multiplier_tier(average);
        let earnings = self.tiers.earnings(&pay, &multiplier, totals.quality_eligible);

        debug!(
            policy = self.aggregator.policy(),
            period = bounds.period_index,
            %viewer,
            current = totals.current_period_points,
            window = totals.window_points,
            eligible = totals.quality_eligible,
            "evaluate: done"
        );

        Ok(DashboardOutcome::Ready(Box::new(Dashboard {
            period_range_label: bounds.range_label(),
            current_period_score: if totals.current_period_points.is_finite() {
                totals.current_period_points.round() as i64
            } else {
                0
            },
            window_average: window_average as i64,
            pay_progress: self.tiers.pay_progress(totals.current_period_points),
            multiplier_progress: self.tiers.multiplier_progress(window_average),
            pay,
            multiplier,
            earnings,
            leaderboard: leaderboard::rank(self.standings(&agg), &viewer),
            worker_id: viewer,
        })))
    }

    /// [`evaluate`](Self::evaluate) with rows fetched from `source`.
    ///
    /// The source is not consulted when the viewer is blank.
    pub fn evaluate_source<S>(
        &self,
        source: &S,
        viewer: &str,
        now: DateTime<Utc>,
    ) -> Result<DashboardOutcome, TallyError>
    where
        S: RowSource<Row = A::Row>,
    {
        if identity::normalize(viewer).is_empty() {
            return Ok(DashboardOutcome::NoAccess);
        }
        let rows = source.fetch_rows()?;
        Ok(self.evaluate(&rows, viewer, now)?)
    }
}
