//! Shared fixtures for integration tests.

use chrono::{DateTime, TimeZone, Utc};
use tally_core::types::{ActivityRow, FlagCredit, FlagRow};

/// 16:00 UTC on a 2026 date, well inside that day in New York.
pub fn at(month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, month, day, 16, 0, 0).unwrap()
}

/// A submitted trainer row.
pub fn task(worker: &str, category: &str, ts: DateTime<Utc>, quantity: f64, errors: f64) -> ActivityRow {
    ActivityRow {
        timestamp: Some(ts),
        worker_id: worker.to_string(),
        category: category.to_string(),
        status: "Task Submitted".to_string(),
        quantity,
        errors,
    }
}

/// `n` one-quantity RSHF rows for `worker` at `ts`, 75k points each.
pub fn rshf_batch(worker: &str, ts: DateTime<Utc>, n: usize) -> Vec<ActivityRow> {
    (0..n).map(|_| task(worker, "RSHF", ts, 1.0, 0.0)).collect()
}

pub fn credit(worker: &str, ts: DateTime<Utc>) -> FlagCredit {
    FlagCredit {
        flagged: true,
        timestamp: Some(ts),
        worker_id: worker.to_string(),
    }
}

/// A review row crediting only the primary reviewer.
pub fn review(category: &str, worker: &str, ts: DateTime<Utc>) -> FlagRow {
    FlagRow {
        category: category.to_string(),
        primary: credit(worker, ts),
        ..FlagRow::default()
    }
}
