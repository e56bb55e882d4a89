//! Row and total types.
//!
//! Rows arrive from a spreadsheet-like source, so deserialization is lenient:
//! an unparsable timestamp becomes `None`, blank numbers become zero, and
//! text flags are accepted alongside booleans. Whether a row then counts is
//! decided by the aggregators, never by deserialization.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// The closed set of task categories a row can be scored as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    Rshf,
    Eval,
    Hlrm,
    Categories,
}

impl TaskKind {
    pub const ALL: [TaskKind; 4] = [Self::Rshf, Self::Eval, Self::Hlrm, Self::Categories];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rshf => "rshf",
            Self::Eval => "eval",
            Self::Hlrm => "hlrm",
            Self::Categories => "categories",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One task record in quantity-scoring mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityRow {
    /// `None` when the source cell was empty or not a valid instant.
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub worker_id: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub status: String,
    /// Multiplier on the category's base points. May be non-finite after
    /// coercion, in which case the row is skipped.
    #[serde(default, deserialize_with = "lenient_number")]
    pub quantity: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    pub errors: f64,
}

/// One scenario credit of a [`FlagRow`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlagCredit {
    #[serde(default, deserialize_with = "lenient_flag")]
    pub flagged: bool,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub worker_id: String,
}

/// Which credit of a flag row is being scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Scenario {
    Primary,
    Secondary,
    Tertiary,
}

/// One reviewed task in flag-scenario mode: three independently flagged,
/// timestamped and attributed credits.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlagRow {
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub primary: FlagCredit,
    #[serde(default)]
    pub secondary: FlagCredit,
    #[serde(default)]
    pub tertiary: FlagCredit,
}

impl FlagRow {
    /// The credit for `scenario` with its effective timestamp.
    ///
    /// The tertiary credit has no timestamp of its own in older sheets, so it
    /// falls back to the primary credit's timestamp.
    pub fn credit(&self, scenario: Scenario) -> (&FlagCredit, Option<DateTime<Utc>>) {
        match scenario {
            Scenario::Primary => (&self.primary, self.primary.timestamp),
            Scenario::Secondary => (&self.secondary, self.secondary.timestamp),
            Scenario::Tertiary => (
                &self.tertiary,
                self.tertiary.timestamp.or(self.primary.timestamp),
            ),
        }
    }
}

/// Per-worker accumulation for one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WorkerTotals {
    pub current_period_points: f64,
    pub window_points: f64,
    pub window_quantity: f64,
    pub window_errors: f64,
    pub quality_eligible: bool,
}

impl Default for WorkerTotals {
    /// All zeros. Zero quantity with zero errors is under any ceiling.
    fn default() -> Self {
        Self {
            current_period_points: 0.0,
            window_points: 0.0,
            window_quantity: 0.0,
            window_errors: 0.0,
            quality_eligible: true,
        }
    }
}

/// Why a row (or a flag credit) contributed nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    MissingIdentity,
    InvalidTimestamp,
    DisallowedStatus,
    NonFiniteQuantity,
    Unclassified,
    OutsideWindow,
}

/// Output of a [`PointsAggregator`](crate::traits::PointsAggregator) pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Aggregation {
    /// Keyed by normalized worker identity.
    pub totals: BTreeMap<String, WorkerTotals>,
    pub skipped: BTreeMap<SkipReason, usize>,
    /// Rows (or credits) that reached a worker's totals.
    pub counted: usize,
}

impl Aggregation {
    /// Totals for `worker`, all-zero when the worker has no rows.
    pub fn totals_for(&self, worker: &str) -> WorkerTotals {
        self.totals.get(worker).copied().unwrap_or_default()
    }

    pub fn record_skip(&mut self, reason: SkipReason) {
        *self.skipped.entry(reason).or_insert(0) += 1;
    }

    pub fn skipped_total(&self) -> usize {
        self.skipped.values().sum()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Cell {
    Bool(bool),
    Number(f64),
    Text(String),
}

/// Accepts RFC 3339, or a naive `YYYY-MM-DD HH:MM:SS` / `YYYY-MM-DDTHH:MM:SS`
/// taken as UTC. Anything else becomes `None`.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let cell = Option::<Cell>::deserialize(deserializer)?;
    Ok(match cell {
        Some(Cell::Text(text)) => parse_timestamp(&text),
        _ => None,
    })
}

pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Blank or missing cells are 0; booleans are 1/0; unparsable text is NaN.
fn lenient_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let cell = Option::<Cell>::deserialize(deserializer)?;
    Ok(match cell {
        None => 0.0,
        Some(Cell::Bool(b)) => f64::from(u8::from(b)),
        Some(Cell::Number(n)) => n,
        Some(Cell::Text(text)) => {
            let text = text.trim();
            if text.is_empty() {
                0.0
            } else {
                text.parse().unwrap_or(f64::NAN)
            }
        }
    })
}

/// `true` or the text `TRUE` in any case; everything else is unflagged.
fn lenient_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let cell = Option::<Cell>::deserialize(deserializer)?;
    Ok(match cell {
        Some(Cell::Bool(b)) => b,
        Some(Cell::Text(text)) => text.trim().eq_ignore_ascii_case("true"),
        _ => false,
    })
}
