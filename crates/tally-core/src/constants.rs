//! Deployment constants: point values, tier tables, ceiling defaults and the
//! fixed texts shown on the dashboard.
//!
//! Two deployments exist. The *trainer* deployment scores one row per task by
//! category and quantity, over 9-day periods. The *reviewer* deployment scores
//! up to three flagged review credits per row, over 7-day periods. The presets
//! in [`EngineConfig`](crate::config::EngineConfig) are built from these.

use chrono_tz::Tz;

/// Time zone used to decide which calendar day a timestamp belongs to.
pub const DEFAULT_TIME_ZONE: Tz = chrono_tz::America::New_York;

// --- Quality ceiling ---

/// Above [`CEILING_VOLUME_FLOOR`], errors may not exceed this share of quantity.
pub const CEILING_RATIO: f64 = 0.125;
/// Quantity at or below which the flat [`CEILING_ERROR_ALLOWANCE`] applies.
pub const CEILING_VOLUME_FLOOR: f64 = 8.0;
/// Errors tolerated while quantity is at or below the volume floor.
pub const CEILING_ERROR_ALLOWANCE: f64 = 1.0;

// --- Trainer deployment ---

/// 2026-01-31 as `(year, month, day)`.
pub const TRAINER_ANCHOR: (i32, u32, u32) = (2026, 1, 31);
pub const TRAINER_PERIOD_DAYS: u32 = 9;
pub const TRAINER_WINDOW_PERIODS: u32 = 4;
pub const TRAINER_ALLOWED_STATUSES: &[&str] = &["Task Submitted", "Revised"];

pub const TRAINER_POINTS_RSHF: f64 = 75_000.0;
pub const TRAINER_POINTS_EVALS: f64 = 20_000.0;
pub const TRAINER_POINTS_HLRM: f64 = 50_000.0;
pub const TRAINER_POINTS_CATEGORIES: f64 = 30_000.0;

/// `(minimum period points, dollar amount)`.
pub const TRAINER_PAY_TIERS: &[(f64, f64)] = &[
    (900_000.0, 50.0),
    (1_800_000.0, 70.0),
    (2_700_000.0, 80.0),
];

/// `(minimum window average, factor, badge label)`.
pub const TRAINER_MULTIPLIER_TIERS: &[(f64, f64, &str)] = &[
    (900_000.0, 1.0, "1x Multiplier Active"),
    (1_800_000.0, 1.1, "1.1x Multiplier Active"),
    (2_700_000.0, 1.25, "1.25x Multiplier Active"),
];

// --- Reviewer deployment ---

/// 2026-02-23 as `(year, month, day)`.
pub const REVIEWER_ANCHOR: (i32, u32, u32) = (2026, 2, 23);
pub const REVIEWER_PERIOD_DAYS: u32 = 7;
pub const REVIEWER_WINDOW_PERIODS: u32 = 4;

/// `(primary, secondary, tertiary)` credit points per category.
pub const REVIEWER_POINTS_EVAL: (f64, f64, f64) = (20_000.0, 5_000.0, 0.0);
pub const REVIEWER_POINTS_RSHF: (f64, f64, f64) = (30_000.0, 15_000.0, 10_000.0);
pub const REVIEWER_POINTS_HLRM: (f64, f64, f64) = (60_000.0, 20_000.0, 60_000.0);
pub const REVIEWER_POINTS_CATEGORIES: (f64, f64, f64) = (20_000.0, 10_000.0, 5_000.0);

pub const REVIEWER_PAY_TIERS: &[(f64, f64)] = &[
    (1_200_000.0, 75.0),
    (1_550_000.0, 90.0),
    (1_900_000.0, 100.0),
];

pub const REVIEWER_MULTIPLIER_TIERS: &[(f64, f64, &str)] = &[
    (1_200_000.0, 1.0, "1.0x Multiplier Active"),
    (1_550_000.0, 1.1, "1.1x Multiplier Active"),
    (1_900_000.0, 1.25, "1.25x Multiplier Active"),
];

// --- Leaderboard ---

/// Entries shown in the top bracket.
pub const TOP_BRACKET_SIZE: usize = 10;
/// The top bracket is displayed as two blocks of this size.
pub const PRIMARY_BLOCK_SIZE: usize = 5;
/// Width of the "your position" slice around a viewer outside the top bracket.
pub const NEIGHBOR_WINDOW_WIDTH: usize = 3;

// --- Dashboard texts ---

pub const LABEL_NO_MULTIPLIER: &str = "No badge available right now";
pub const LABEL_PAY_TERMINAL: &str = "Keep up the great work!";
pub const LABEL_MULTIPLIER_TERMINAL: &str = "Top multiplier active";
pub const LABEL_INELIGIBLE: &str =
    "You are not eligible for the additional earnings due to quality issues.";
pub const CALL_TO_ACTION: &str = "\u{2191} Complete more tasks to move up!";
