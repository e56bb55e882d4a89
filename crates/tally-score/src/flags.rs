//! Flag-scenario aggregation policy.
//!
//! Each row describes one reviewed task and carries three credits. A credit
//! scores its category's points for that [`Scenario`] when its flag is set,
//! its timestamp is valid and it names a worker. Credits are independent: one
//! row can credit three different workers on three different days.
//!
//! There is no quantity and no quality ceiling; every worker is eligible.

use std::collections::BTreeMap;

use tally_core::calendar::PeriodBounds;
use tally_core::config::{FlagRule, FlagScoring};
use tally_core::error::ConfigError;
use tally_core::identity;
use tally_core::traits::PointsAggregator;
use tally_core::types::{Aggregation, FlagRow, Scenario, SkipReason, TaskKind};
use tracing::{debug, trace};

use crate::classify::Classifier;

const SCENARIOS: [Scenario; 3] = [Scenario::Primary, Scenario::Secondary, Scenario::Tertiary];

#[derive(Debug, Clone)]
pub struct FlagAggregator {
    classifier: Classifier,
    points: BTreeMap<TaskKind, [f64; 3]>,
}

impl FlagAggregator {
    pub fn from_config(config: &FlagScoring) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            classifier: Classifier::new(
                config.categories.iter().map(|c| (c.kind, c.keyword.as_str())),
            ),
            points: config
                .categories
                .iter()
                .map(|rule: &FlagRule| (rule.kind, [rule.primary, rule.secondary, rule.tertiary]))
                .collect(),
        })
    }

    fn points_for(&self, kind: TaskKind, scenario: Scenario) -> f64 {
        let idx = match scenario {
            Scenario::Primary => 0,
            Scenario::Secondary => 1,
            Scenario::Tertiary => 2,
        };
        self.points.get(&kind).map_or(0.0, |p| p[idx])
    }
}

impl PointsAggregator for FlagAggregator {
    type Row = FlagRow;

    fn policy(&self) -> &'static str {
        "flags"
    }

    fn aggregate(&self, rows: &[FlagRow], bounds: &PeriodBounds) -> Aggregation {
        let mut agg = Aggregation::default();

        for row in rows {
            let Some(kind) = self.classifier.classify(&row.category) else {
                agg.record_skip(SkipReason::Unclassified);
                continue;
            };

            for scenario in SCENARIOS {
                let (credit, timestamp) = row.credit(scenario);
                if !credit.flagged {
                    continue;
                }
                let points = self.points_for(kind, scenario);
                if points == 0.0 {
                    continue;
                }
                let Some(ts) = timestamp else {
                    agg.record_skip(SkipReason::InvalidTimestamp);
                    continue;
                };
                let worker = identity::normalize(&credit.worker_id);
                if worker.is_empty() {
                    agg.record_skip(SkipReason::MissingIdentity);
                    continue;
                }
                if !bounds.contains_window(ts) {
                    agg.record_skip(SkipReason::OutsideWindow);
                    continue;
                }

                trace!(%worker, ?scenario, %kind, points, "flags: credit counted");
                let totals = agg.totals.entry(worker).or_default();
                totals.window_points += points;
                if bounds.contains_current(ts) {
                    totals.current_period_points += points;
                }
                agg.counted += 1;
            }
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
