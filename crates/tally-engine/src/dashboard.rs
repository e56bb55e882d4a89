//! Dashboard response types.

use serde::Serialize;

use crate::leaderboard::Leaderboard;
use crate::tiers::{Earnings, MultiplierStatus, PayStatus, ProgressStatus};

/// Everything one worker's dashboard shows for the current period.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub worker_id: String,
    /// `M/D/YYYY - M/D/YYYY`.
    pub period_range_label: String,
    /// Current-period points, rounded.
    pub current_period_score: i64,
    /// Window points over the periods in the window, floored.
    pub window_average: i64,
    pub pay: PayStatus,
    pub pay_progress: ProgressStatus,
    pub multiplier: MultiplierStatus,
    pub multiplier_progress: ProgressStatus,
    pub earnings: Earnings,
    pub leaderboard: Leaderboard,
}

/// Result of one evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DashboardOutcome {
    Ready(Box<Dashboard>),
    /// No viewer identity could be resolved.
    NoAccess,
    /// The row source returned no rows.
    NoData,
}

impl DashboardOutcome {
    pub fn dashboard(&self) -> Option<&Dashboard> {
        match self {
            Self::Ready(d) => Some(d),
            _ => None,
        }
    }
}
