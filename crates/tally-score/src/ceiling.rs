//! Quality ceiling.
//!
//! A worker is under the ceiling when, over the averaging window,
//!
//! - `quantity > volume_floor` and `errors <= ratio * quantity`, or
//! - `quantity <= volume_floor` and `errors <= error_allowance`.
//!
//! With the default constants (8, 0.125, 1) a worker may have one error in
//! their first eight units of work and one error per eight units after that.

use tally_core::config::CeilingConfig;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QualityCeiling {
    pub ratio: f64,
    pub volume_floor: f64,
    pub error_allowance: f64,
}

impl QualityCeiling {
    pub fn from_config(config: &CeilingConfig) -> Self {
        Self {
            ratio: config.ratio,
            volume_floor: config.volume_floor,
            error_allowance: config.error_allowance,
        }
    }

    /// Whether `errors` are tolerated for `quantity` units of work.
    pub fn permits(&self, quantity: f64, errors: f64) -> bool {
        if quantity > self.volume_floor {
            errors <= self.ratio * quantity
        } else {
            errors <= self.error_allowance
        }
    }
}

impl Default for QualityCeiling {
    fn default() -> Self {
        Self::from_config(&CeilingConfig::default())
    }
}
