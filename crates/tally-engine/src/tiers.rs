//! Pay and multiplier tiers.
//!
//! Both tables are step functions over a score: pay over current-period
//! points, the multiplier over the window average. A value reaches a tier when
//! it is at or above the tier's trigger; the highest reached tier wins.
//! Reaching no tier yields the zero tier (amount or factor 0).

use serde::Serialize;
use tally_core::config::{MissingMultiplier, MultiplierThreshold, PayThreshold, TierConfig};
use tally_core::constants::{
    LABEL_INELIGIBLE, LABEL_MULTIPLIER_TERMINAL, LABEL_NO_MULTIPLIER, LABEL_PAY_TERMINAL,
};
use tally_core::error::ConfigError;
use tracing::trace;

use crate::format::{dollars, thousands};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PayStatus {
    pub amount: f64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MultiplierStatus {
    pub factor: f64,
    pub label: String,
    /// Whether any multiplier tier was reached.
    #[serde(skip)]
    pub earned: bool,
}

/// Position between the last reached trigger and the next one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    /// 0–100. Always 100 once the top trigger is reached.
    pub percent: u8,
    /// Points still needed for the next trigger, never negative.
    pub remaining: f64,
    /// Index of the next trigger in the ascending table; `None` at the top.
    pub next: Option<usize>,
}

/// Progress as shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressStatus {
    pub percent: u8,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Earnings {
    pub amount: i64,
    pub label: String,
}

/// Progress of `value` through ascending `triggers`.
///
/// The previous trigger of the first tier is 0. A non-finite value counts as
/// 0 and a zero-width step reports 0 percent.
pub fn progress(value: f64, triggers: &[f64]) -> Progress {
    let value = if value.is_finite() { value } else { 0.0 };
    let Some(i) = triggers.iter().position(|&t| value < t) else {
        return Progress {
            percent: 100,
            remaining: 0.0,
            next: None,
        };
    };

    let next = triggers[i];
    let prev = if i == 0 { 0.0 } else { triggers[i - 1] };
    let span = next - prev;
    let percent = if span > 0.0 {
        ((value - prev) / span * 100.0).round().clamp(0.0, 100.0) as u8
    } else {
        0
    };
    Progress {
        percent,
        remaining: (next - value).max(0.0),
        next: Some(i),
    }
}

/// Tier tables sorted ascending by trigger.
#[derive(Debug, Clone)]
pub struct TierEngine {
    pay: Vec<PayThreshold>,
    multiplier: Vec<MultiplierThreshold>,
    missing_multiplier: MissingMultiplier,
}

impl TierEngine {
    pub fn from_config(config: &TierConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut pay = config.pay.clone();
        pay.sort_by(|a, b| a.min_points.total_cmp(&b.min_points));
        let mut multiplier = config.multiplier.clone();
        multiplier.sort_by(|a, b| a.min_average.total_cmp(&b.min_average));
        Ok(Self {
            pay,
            multiplier,
            missing_multiplier: config.missing_multiplier,
        })
    }

    pub fn pay_tier(&self, points: f64) -> PayStatus {
        let amount = self
            .pay
            .iter()
            .rev()
            .find(|t| points >= t.min_points)
            .map_or(0.0, |t| t.amount);
        PayStatus {
            amount,
            label: format!("Qualified for {} Additional Earnings", dollars(amount)),
        }
    }

    pub fn multiplier_tier(&self, window_average: f64) -> MultiplierStatus {
        match self.multiplier.iter().rev().find(|t| window_average >= t.min_average) {
            Some(t) => MultiplierStatus {
                factor: t.factor,
                label: t.label.clone(),
                earned: true,
            },
            None => MultiplierStatus {
                factor: 0.0,
                label: LABEL_NO_MULTIPLIER.to_string(),
                earned: false,
            },
        }
    }

    pub fn pay_progress(&self, points: f64) -> ProgressStatus {
        let triggers: Vec<f64> = self.pay.iter().map(|t| t.min_points).collect();
        let p = progress(points, &triggers);
        let label = match p.next {
            Some(i) => format!(
                "{} points to {} Additional Earnings",
                thousands(p.remaining.round() as i64),
                dollars(self.pay[i].amount)
            ),
            None => LABEL_PAY_TERMINAL.to_string(),
        };
        ProgressStatus {
            percent: p.percent,
            label,
        }
    }

    pub fn multiplier_progress(&self, window_average: f64) -> ProgressStatus {
        let triggers: Vec<f64> = self.multiplier.iter().map(|t| t.min_average).collect();
        let p = progress(window_average, &triggers);
        let label = match p.next {
            Some(i) => format!(
                "{} points till {}",
                thousands(p.remaining.round() as i64),
                self.multiplier[i].label.to_lowercase()
            ),
            None => LABEL_MULTIPLIER_TERMINAL.to_string(),
        };
        ProgressStatus {
            percent: p.percent,
            label,
        }
    }

    /// Pay scaled by the multiplier, or zero when the worker fails the
    /// quality ceiling.
    ///
    /// A reached tier with a stored factor of 0 passes pay through. When no
    /// tier is reached the configured [`MissingMultiplier`] applies.
    pub fn earnings(&self, pay: &PayStatus, multiplier: &MultiplierStatus, eligible: bool) -> Earnings {
        if !eligible {
            return Earnings {
                amount: 0,
                label: LABEL_INELIGIBLE.to_string(),
            };
        }

        let amount = if pay.amount > 0.0 {
            let factor = match (multiplier.earned, multiplier.factor) {
                (true, f) if f == 0.0 => 1.0,
                (true, f) => f,
                (false, _) => self.missing_multiplier.factor(),
            };
            (pay.amount * factor).round() as i64
        } else {
            0
        };
        trace!(pay = pay.amount, factor = multiplier.factor, amount, "tiers: earnings");

        Earnings {
            amount,
            label: format!("You are earning an incremental ${amount} this period!"),
        }
    }
}
