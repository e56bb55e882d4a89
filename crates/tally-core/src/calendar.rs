//! Period calendar.
//!
//! Periods are fixed-length, inclusive calendar-date ranges that tile forward
//! from an anchor date with no gaps:
//!
//! - Period 0: `[anchor, anchor + L - 1]`
//! - Period 1: `[anchor + L, anchor + 2L - 1]`
//! - …
//!
//! "Now" and row timestamps are reduced to calendar days in the configured
//! time zone before any comparison, so a timestamp at any time of day on a
//! boundary date belongs to that date's period. All arithmetic is on
//! [`NaiveDate`]s, which keeps daylight-saving transitions out of the picture.
//!
//! The averaging window is the current period plus the `N - 1` periods before
//! it ([`WindowMode::Trailing`]). In [`WindowMode::GrowFromAnchor`] the window
//! starts at the anchor until `N` periods have elapsed, and the average is
//! taken over the periods actually elapsed.

use chrono::{DateTime, Datelike, Days, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::config::CalendarConfig;
use crate::error::ConfigError;

/// How the averaging window behaves during the first periods after the anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowMode {
    /// Always the current period plus the `N - 1` preceding ones, even if
    /// those precede the anchor.
    #[default]
    Trailing,
    /// Start at the anchor until `N` periods have elapsed.
    GrowFromAnchor,
}

/// Date ranges for one evaluation. All ranges are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PeriodBounds {
    pub period_index: u64,
    pub current_start: NaiveDate,
    pub current_end: NaiveDate,
    pub window_start: NaiveDate,
    pub window_end: NaiveDate,
    /// Divisor for the window average.
    pub periods_in_window: u32,
    pub time_zone: Tz,
}

impl PeriodBounds {
    /// Calendar day of `ts` in the bounds' time zone.
    pub fn day_of(&self, ts: DateTime<Utc>) -> NaiveDate {
        ts.with_timezone(&self.time_zone).date_naive()
    }

    pub fn contains_current(&self, ts: DateTime<Utc>) -> bool {
        let day = self.day_of(ts);
        self.current_start <= day && day <= self.current_end
    }

    pub fn contains_window(&self, ts: DateTime<Utc>) -> bool {
        let day = self.day_of(ts);
        self.window_start <= day && day <= self.window_end
    }

    /// `M/D/YYYY - M/D/YYYY` for the current period.
    pub fn range_label(&self) -> String {
        format!(
            "{} - {}",
            short_date(self.current_start),
            short_date(self.current_end)
        )
    }
}

fn short_date(date: NaiveDate) -> String {
    format!("{}/{}/{}", date.month(), date.day(), date.year())
}

/// Compute the current period and averaging window containing `now`.
///
/// `now` before the anchor clamps to period 0.
pub fn compute_bounds(
    anchor: NaiveDate,
    period_length_days: u32,
    window_period_count: u32,
    now: DateTime<Utc>,
    time_zone: Tz,
    mode: WindowMode,
) -> Result<PeriodBounds, ConfigError> {
    if period_length_days == 0 {
        return Err(ConfigError::ZeroPeriodLength);
    }
    if window_period_count == 0 {
        return Err(ConfigError::ZeroWindowPeriods);
    }

    let length = u64::from(period_length_days);
    let today = now.with_timezone(&time_zone).date_naive();
    let days_since_anchor = (today - anchor).num_days().max(0) as u64;
    let period_index = days_since_anchor / length;

    let (current_start, current_end) = period_range(anchor, period_length_days, period_index)?;

    let lookback = u64::from(window_period_count - 1);
    let (window_start, periods_in_window) = match mode {
        WindowMode::GrowFromAnchor if period_index < lookback => {
            // period_index < lookback < u32::MAX
            (anchor, period_index as u32 + 1)
        }
        _ => {
            let start = current_start
                .checked_sub_days(Days::new(lookback * length))
                .ok_or(ConfigError::DateOutOfRange)?;
            (start, window_period_count)
        }
    };

    Ok(PeriodBounds {
        period_index,
        current_start,
        current_end,
        window_start,
        window_end: current_end,
        periods_in_window,
        time_zone,
    })
}

/// Inclusive `[start, end]` of period `index`.
pub fn period_range(
    anchor: NaiveDate,
    period_length_days: u32,
    index: u64,
) -> Result<(NaiveDate, NaiveDate), ConfigError> {
    if period_length_days == 0 {
        return Err(ConfigError::ZeroPeriodLength);
    }
    let length = u64::from(period_length_days);
    let offset = index.checked_mul(length).ok_or(ConfigError::DateOutOfRange)?;
    let start = anchor
        .checked_add_days(Days::new(offset))
        .ok_or(ConfigError::DateOutOfRange)?;
    let end = start
        .checked_add_days(Days::new(length - 1))
        .ok_or(ConfigError::DateOutOfRange)?;
    Ok((start, end))
}

/// [`compute_bounds`] bound to a [`CalendarConfig`].
#[derive(Debug, Clone)]
pub struct PeriodCalendar {
    config: CalendarConfig,
}

impl PeriodCalendar {
    pub fn new(config: CalendarConfig) -> Self {
        Self { config }
    }

    pub fn bounds_at(&self, now: DateTime<Utc>) -> Result<PeriodBounds, ConfigError> {
        compute_bounds(
            self.config.anchor,
            self.config.period_length_days,
            self.config.window_period_count,
            now,
            self.config.time_zone,
            self.config.window_mode,
        )
    }

    pub fn period(&self, index: u64) -> Result<(NaiveDate, NaiveDate), ConfigError> {
        period_range(self.config.anchor, self.config.period_length_days, index)
    }
}
