//! End-to-end tests for Tally.
//!
//! Each test builds an engine from a deployment preset, feeds it rows as a
//! spreadsheet export would, and checks the dashboard a worker would see.

use tally_core::config::{CeilingMode, EngineConfig, ScoringConfig};
use tally_core::constants::{CALL_TO_ACTION, LABEL_INELIGIBLE, LABEL_NO_MULTIPLIER};
use tally_core::types::{ActivityRow, FlagRow};
use tally_engine::{Dashboard, DashboardOutcome, FlagEngine, QuantityEngine};
use tally_tests::helpers::*;

fn ready(outcome: DashboardOutcome) -> Dashboard {
    match outcome {
        DashboardOutcome::Ready(d) => *d,
        other => panic!("expected a dashboard, got {other:?}"),
    }
}

/// Trainer sheet evaluated on 2026-02-12 (period 1, 2/9–2/17).
fn trainer_sheet() -> Vec<ActivityRow> {
    let mut rows = Vec::new();
    rows.extend(rshf_batch("alice.smith@x.io", at(2, 2), 36));
    rows.extend(rshf_batch("alice.smith@x.io", at(2, 10), 24));
    rows.extend(rshf_batch("bob.jones@x.io", at(2, 11), 12));
    rows.push(task("carol.diaz@x.io", "RSHF", at(2, 12), 12.0, 1.0));
    rows.push(task("dan@x.io", "Model Evals", at(2, 9), 3.0, 0.0));
    rows.push(task("dan@x.io", "Model Evals", at(2, 9), 3.0, 0.0));
    rows
}

#[test]
fn trainer_dashboard_end_to_end() {
    let engine = QuantityEngine::from_config(&EngineConfig::trainer()).unwrap();
    let d = ready(engine.evaluate(&trainer_sheet(), "Alice Smith <alice.smith@x.io>", at(2, 12)).unwrap());

    assert_eq!(d.worker_id, "alice.smith@x.io");
    assert_eq!(d.period_range_label, "2/9/2026 - 2/17/2026");
    assert_eq!(d.current_period_score, 1_800_000);
    assert_eq!(d.window_average, 1_125_000);
    assert_eq!(d.pay.label, "Qualified for $70 Additional Earnings");
    assert_eq!(d.pay_progress.label, "900,000 points to $80 Additional Earnings");
    assert_eq!(d.pay_progress.percent, 0);
    assert_eq!(d.multiplier.label, "1x Multiplier Active");
    assert_eq!(d.multiplier_progress.label, "675,000 points till 1.1x multiplier active");
    assert_eq!(d.multiplier_progress.percent, 25);
    assert_eq!(d.earnings.label, "You are earning an incremental $70 this period!");

    let primary = &d.leaderboard.top.primary;
    let summary: Vec<(&str, usize, i64)> = primary
        .iter()
        .map(|e| (e.display_name.as_str(), e.rank, e.score))
        .collect();
    assert_eq!(
        summary,
        [
            ("Alice S.", 1, 1_800_000),
            ("Bob J.", 2, 900_000),
            ("Carol D.", 2, 900_000),
            ("Dan", 4, 120_000),
        ]
    );
    assert!(d.leaderboard.viewer_in_top);
}

#[test]
fn trainer_viewer_without_rows_sees_zero_state() {
    let engine = QuantityEngine::from_config(&EngineConfig::trainer()).unwrap();
    let d = ready(engine.evaluate(&trainer_sheet(), "newcomer@x.io", at(2, 12)).unwrap());

    assert_eq!(d.current_period_score, 0);
    assert_eq!(d.pay.amount, 0.0);
    assert_eq!(d.multiplier.factor, 0.0);
    assert_eq!(d.multiplier.label, LABEL_NO_MULTIPLIER);
    assert_eq!(d.pay_progress.label, "900,000 points to $50 Additional Earnings");
    assert_eq!(d.earnings.amount, 0);
    // Absent from the board: the neighbor window is its head.
    let ranks: Vec<usize> = d.leaderboard.neighbor_window.iter().map(|e| e.rank).collect();
    assert_eq!(ranks, [1, 2, 2]);
}

#[test]
fn quality_ceiling_blocks_earnings() {
    let engine = QuantityEngine::from_config(&EngineConfig::trainer()).unwrap();
    let mut rows = rshf_batch("eve@x.io", at(2, 10), 12);
    rows.push(task("eve@x.io", "HLRM", at(2, 11), 1.0, 5.0));
    let d = ready(engine.evaluate(&rows, "eve@x.io", at(2, 12)).unwrap());

    assert_eq!(d.current_period_score, 900_000);
    assert_eq!(d.pay.amount, 50.0);
    assert_eq!(d.earnings.amount, 0);
    assert_eq!(d.earnings.label, LABEL_INELIGIBLE);
}

#[test]
fn incremental_ceiling_depends_on_row_order() {
    let engine = QuantityEngine::from_config(&EngineConfig::trainer()).unwrap();
    let sloppy = task("f@x.io", "RSHF", at(2, 10), 1.0, 2.0);
    let bulk = task("f@x.io", "RSHF", at(2, 10), 20.0, 0.0);

    let score = |rows: &[ActivityRow]| {
        ready(engine.evaluate(rows, "f@x.io", at(2, 12)).unwrap()).current_period_score
    };
    assert_eq!(score(&[sloppy.clone(), bulk.clone()]), 1_500_000);
    assert_eq!(score(&[bulk, sloppy]), 1_575_000);
}

#[test]
fn end_of_window_ceiling_counts_every_row() {
    let mut cfg = EngineConfig::trainer();
    if let ScoringConfig::Quantity(q) = &mut cfg.scoring {
        q.ceiling.mode = CeilingMode::EndOfWindow;
    }
    let engine = QuantityEngine::from_config(&cfg).unwrap();
    let rows = [
        task("f@x.io", "RSHF", at(2, 10), 1.0, 2.0),
        task("f@x.io", "RSHF", at(2, 10), 20.0, 0.0),
    ];
    let d = ready(engine.evaluate(&rows, "f@x.io", at(2, 12)).unwrap());
    assert_eq!(d.current_period_score, 1_575_000);
}

#[test]
fn neighbor_window_in_a_large_board() {
    let engine = QuantityEngine::from_config(&EngineConfig::trainer()).unwrap();
    let rows: Vec<ActivityRow> = (0..50)
        .map(|i| task(&format!("w{i:02}@x.io"), "HLRM", at(2, 10), f64::from(50 - i), 0.0))
        .collect();
    let d = ready(engine.evaluate(&rows, "w15@x.io", at(2, 12)).unwrap());

    assert!(!d.leaderboard.viewer_in_top);
    let window: Vec<(&str, usize)> = d
        .leaderboard
        .neighbor_window
        .iter()
        .map(|e| (e.worker_id.as_str(), e.rank))
        .collect();
    assert_eq!(window, [("w14@x.io", 15), ("w15@x.io", 16), ("w16@x.io", 17)]);
    assert_eq!(
        d.leaderboard.neighbor_window[1].call_to_action.as_deref(),
        Some(CALL_TO_ACTION)
    );
    assert_eq!(d.leaderboard.top.secondary.len(), 5);
}

#[test]
fn roster_completes_the_board() {
    let mut cfg = EngineConfig::trainer();
    cfg.roster = vec!["Quiet.One@x.io".into(), "bob.jones@x.io".into()];
    let engine = QuantityEngine::from_config(&cfg).unwrap();
    let board = engine.leaderboard(&trainer_sheet(), "quiet.one@x.io", at(2, 12)).unwrap();

    let all: Vec<&str> = board
        .top
        .primary
        .iter()
        .chain(&board.top.secondary)
        .map(|e| e.worker_id.as_str())
        .collect();
    assert_eq!(all.len(), 5);
    assert_eq!(all.last(), Some(&"quiet.one@x.io"));
}

#[test]
fn reviewer_dashboard_end_to_end() {
    let engine = FlagEngine::from_config(&EngineConfig::reviewer()).unwrap();
    let mut rows: Vec<FlagRow> = Vec::new();
    rows.extend((0..20).map(|_| review("HLRM", "dave.lee@x.io", at(3, 10))));
    rows.extend((0..20).map(|_| review("hlrm", "dave.lee@x.io", at(2, 24))));
    rows.push(FlagRow {
        category: "categories".into(),
        primary: credit("gina@x.io", at(3, 10)),
        secondary: credit("dave.lee@x.io", at(3, 11)),
        tertiary: credit("hal@x.io", at(3, 12)),
    });

    let d = ready(engine.evaluate(&rows, "dave.lee@x.io", at(3, 12)).unwrap());
    assert_eq!(d.period_range_label, "3/9/2026 - 3/15/2026");
    assert_eq!(d.current_period_score, 1_210_000);
    // Window grown from the anchor: three periods elapsed.
    assert_eq!(d.window_average, 803_333);
    assert_eq!(d.pay.amount, 75.0);
    assert_eq!(d.multiplier.factor, 0.0);
    assert_eq!(d.earnings.amount, 75);

    let scores: Vec<(&str, i64)> = d
        .leaderboard
        .top
        .primary
        .iter()
        .map(|e| (e.worker_id.as_str(), e.score))
        .collect();
    assert_eq!(
        scores,
        [("dave.lee@x.io", 1_210_000), ("gina@x.io", 20_000), ("hal@x.io", 5_000)]
    );
}

#[test]
fn identity_is_checked_before_data() {
    let engine = QuantityEngine::from_config(&EngineConfig::trainer()).unwrap();
    assert_eq!(engine.evaluate(&[], "", at(2, 12)).unwrap(), DashboardOutcome::NoAccess);
    assert_eq!(engine.evaluate(&[], "a@x.io", at(2, 12)).unwrap(), DashboardOutcome::NoData);
}

#[test]
fn malformed_export_rows_are_ignored() {
    let rows: Vec<ActivityRow> = serde_json::from_str(
        r#"[
            {"timestamp": "2026-02-10T15:00:00Z", "worker_id": "a@x.io", "category": "RSHF",
             "status": "Task Submitted", "quantity": 2},
            {"timestamp": "yesterday", "worker_id": "a@x.io", "category": "RSHF",
             "status": "Task Submitted", "quantity": 5},
            {"timestamp": "2026-02-10 15:00:00", "worker_id": "a@x.io", "category": "RSHF",
             "status": "Draft", "quantity": 5},
            {"timestamp": "2026-02-10 15:00:00", "worker_id": "a@x.io", "category": "RSHF",
             "status": "Revised", "quantity": "many"},
            {"timestamp": "2026-02-10 15:00:00", "worker_id": "", "category": "RSHF",
             "status": "Revised", "quantity": 1},
            {"timestamp": "2026-02-10 15:00:00", "worker_id": "a@x.io", "category": "Survey",
             "status": "Revised", "quantity": 1}
        ]"#,
    )
    .unwrap();

    let engine = QuantityEngine::from_config(&EngineConfig::trainer()).unwrap();
    let (_, agg) = engine.aggregate(&rows, at(2, 12)).unwrap();
    assert_eq!(agg.counted, 1);
    assert_eq!(agg.skipped_total(), 5);
    assert_eq!(agg.totals_for("a@x.io").current_period_points, 150_000.0);
}

#[test]
fn serialized_outcome_is_stable() {
    let engine = QuantityEngine::from_config(&EngineConfig::trainer()).unwrap();
    let rows = trainer_sheet();
    let a = serde_json::to_string(&engine.evaluate(&rows, "bob.jones@x.io", at(2, 12)).unwrap()).unwrap();
    let b = serde_json::to_string(&engine.evaluate(&rows, "bob.jones@x.io", at(2, 12)).unwrap()).unwrap();
    assert_eq!(a, b);
    assert!(a.starts_with(r#"{"status":"ready","workerId":"bob.jones@x.io""#));
}
