//! Property tests across crates.

use chrono::Duration;
use proptest::prelude::*;
use tally_core::calendar::PeriodCalendar;
use tally_core::config::{CeilingMode, EngineConfig, ScoringConfig};
use tally_core::types::ActivityRow;
use tally_engine::QuantityEngine;
use tally_tests::helpers::*;

const LABELS: [&str; 5] = ["RSHF", "model evals", "HLRM", "Categories", "other"];

fn arb_row() -> impl Strategy<Value = ActivityRow> {
    (0usize..8, 1u32..=28, 0usize..LABELS.len(), 0u32..10, 0u32..3).prop_map(
        |(worker, day, label, quantity, errors)| {
            task(
                &format!("w{worker}@x.io"),
                LABELS[label],
                at(2, day),
                f64::from(quantity),
                f64::from(errors),
            )
        },
    )
}

fn engine_with(mode: CeilingMode) -> QuantityEngine {
    let mut cfg = EngineConfig::trainer();
    if let ScoringConfig::Quantity(q) = &mut cfg.scoring {
        q.ceiling.mode = mode;
    }
    QuantityEngine::from_config(&cfg).unwrap()
}

proptest! {
    #[test]
    fn evaluation_is_deterministic(rows in prop::collection::vec(arb_row(), 1..80), viewer in 0usize..10) {
        let engine = engine_with(CeilingMode::Incremental);
        let viewer = format!("w{viewer}@x.io");
        let a = engine.evaluate(&rows, &viewer, at(2, 20)).unwrap();
        let b = engine.evaluate(&rows, &viewer, at(2, 20)).unwrap();
        prop_assert_eq!(serde_json::to_string(&a).unwrap(), serde_json::to_string(&b).unwrap());
        prop_assert_eq!(a, b);
    }

    #[test]
    fn current_points_never_exceed_window(rows in prop::collection::vec(arb_row(), 0..80)) {
        let engine = engine_with(CeilingMode::Incremental);
        let (_, agg) = engine.aggregate(&rows, at(2, 20)).unwrap();
        for totals in agg.totals.values() {
            prop_assert!(totals.current_period_points <= totals.window_points);
            prop_assert!(totals.current_period_points >= 0.0);
        }
    }

    #[test]
    fn end_of_window_ignores_row_order(rows in prop::collection::vec(arb_row(), 0..80)) {
        let engine = engine_with(CeilingMode::EndOfWindow);
        let (_, forward) = engine.aggregate(&rows, at(2, 20)).unwrap();
        let reversed: Vec<ActivityRow> = rows.iter().rev().cloned().collect();
        let (_, backward) = engine.aggregate(&reversed, at(2, 20)).unwrap();
        prop_assert_eq!(forward.totals, backward.totals);
    }

    #[test]
    fn every_counted_worker_is_ranked(rows in prop::collection::vec(arb_row(), 0..80)) {
        let engine = engine_with(CeilingMode::Incremental);
        let (_, agg) = engine.aggregate(&rows, at(2, 20)).unwrap();
        let standings = engine.standings(&agg);
        prop_assert_eq!(standings.len(), agg.totals.len());
        for worker in agg.totals.keys() {
            prop_assert!(standings.iter().any(|(w, _)| w == worker));
        }
    }

    #[test]
    fn current_period_contains_today(hours in 0i64..24 * 400) {
        let calendar = PeriodCalendar::new(EngineConfig::trainer().calendar);
        let now = at(1, 31) + Duration::hours(hours);
        let b = calendar.bounds_at(now).unwrap();
        let today = b.day_of(now);
        prop_assert!(b.current_start <= today && today <= b.current_end);
        prop_assert_eq!((b.current_end - b.current_start).num_days(), 8);
        prop_assert_eq!((b.current_end - b.window_start).num_days(), 35);
    }
}
