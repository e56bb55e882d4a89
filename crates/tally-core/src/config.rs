//! Engine configuration.
//!
//! One [`EngineConfig`] value carries everything a deployment varies: the
//! calendar, the scoring policy and its tables, the tier tables and the
//! roster. It is passed into each evaluation; nothing is global.
//!
//! Tables are taken as unsorted input. [`EngineConfig::validate`] rejects
//! configurations the engine cannot evaluate meaningfully.

use chrono::NaiveDate;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::calendar::WindowMode;
use crate::constants::*;
use crate::error::ConfigError;
use crate::types::TaskKind;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub calendar: CalendarConfig,
    pub scoring: ScoringConfig,
    pub tiers: TierConfig,
    /// Workers listed here appear on the leaderboard even without rows.
    #[serde(default)]
    pub roster: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarConfig {
    /// First day of period 0.
    pub anchor: NaiveDate,
    pub period_length_days: u32,
    /// Periods averaged for the multiplier, current period included.
    pub window_period_count: u32,
    #[serde(default)]
    pub window_mode: WindowMode,
    #[serde(default = "default_time_zone")]
    pub time_zone: Tz,
}

fn default_time_zone() -> Tz {
    DEFAULT_TIME_ZONE
}

/// Which aggregation policy scores the rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum ScoringConfig {
    /// One row per task, points = category base × quantity, gated by the
    /// quality ceiling.
    Quantity(QuantityScoring),
    /// Up to three flagged credits per row, fixed points each, no ceiling.
    Flags(FlagScoring),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuantityScoring {
    /// Exact (trimmed) status labels that count. Empty means nothing counts.
    pub allowed_statuses: Vec<String>,
    pub categories: Vec<CategoryRule>,
    #[serde(default)]
    pub ceiling: CeilingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub kind: TaskKind,
    /// Matched case-insensitively as a substring of the row's category label.
    pub keyword: String,
    pub points: f64,
}

/// When the quality ceiling is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CeilingMode {
    /// Checked after every row against the running window counters; a row
    /// that leaves the worker over the ceiling contributes no points.
    #[default]
    Incremental,
    /// All points count; eligibility is decided once from final counters.
    EndOfWindow,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CeilingConfig {
    #[serde(default)]
    pub mode: CeilingMode,
    pub ratio: f64,
    pub volume_floor: f64,
    pub error_allowance: f64,
}

impl Default for CeilingConfig {
    fn default() -> Self {
        Self {
            mode: CeilingMode::default(),
            ratio: CEILING_RATIO,
            volume_floor: CEILING_VOLUME_FLOOR,
            error_allowance: CEILING_ERROR_ALLOWANCE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlagScoring {
    pub categories: Vec<FlagRule>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlagRule {
    pub kind: TaskKind,
    pub keyword: String,
    pub primary: f64,
    pub secondary: f64,
    /// Zero when the category has no tertiary credit.
    #[serde(default)]
    pub tertiary: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierConfig {
    pub pay: Vec<PayThreshold>,
    pub multiplier: Vec<MultiplierThreshold>,
    #[serde(default)]
    pub missing_multiplier: MissingMultiplier,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayThreshold {
    pub min_points: f64,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiplierThreshold {
    pub min_average: f64,
    pub factor: f64,
    pub label: String,
}

/// Factor applied to pay when the window average reaches no multiplier tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingMultiplier {
    /// Pay is passed through unchanged.
    #[default]
    PassThrough,
    /// Pay is zeroed.
    Zero,
}

impl MissingMultiplier {
    pub fn factor(&self) -> f64 {
        match self {
            Self::PassThrough => 1.0,
            Self::Zero => 0.0,
        }
    }
}

impl EngineConfig {
    /// Quantity scoring over 9-day periods with a trailing 4-period window.
    pub fn trainer() -> Self {
        let (y, m, d) = TRAINER_ANCHOR;
        Self {
            calendar: CalendarConfig {
                anchor: preset_date(y, m, d),
                period_length_days: TRAINER_PERIOD_DAYS,
                window_period_count: TRAINER_WINDOW_PERIODS,
                window_mode: WindowMode::Trailing,
                time_zone: DEFAULT_TIME_ZONE,
            },
            scoring: ScoringConfig::Quantity(QuantityScoring {
                allowed_statuses: TRAINER_ALLOWED_STATUSES.iter().map(|s| s.to_string()).collect(),
                categories: vec![
                    category(TaskKind::Rshf, "rshf", TRAINER_POINTS_RSHF),
                    category(TaskKind::Eval, "evals", TRAINER_POINTS_EVALS),
                    category(TaskKind::Hlrm, "hlrm", TRAINER_POINTS_HLRM),
                    category(TaskKind::Categories, "categories", TRAINER_POINTS_CATEGORIES),
                ],
                ceiling: CeilingConfig::default(),
            }),
            tiers: tiers(TRAINER_PAY_TIERS, TRAINER_MULTIPLIER_TIERS),
            roster: Vec::new(),
        }
    }

    /// Flag scoring over 7-day periods, window growing from the anchor.
    pub fn reviewer() -> Self {
        let (y, m, d) = REVIEWER_ANCHOR;
        Self {
            calendar: CalendarConfig {
                anchor: preset_date(y, m, d),
                period_length_days: REVIEWER_PERIOD_DAYS,
                window_period_count: REVIEWER_WINDOW_PERIODS,
                window_mode: WindowMode::GrowFromAnchor,
                time_zone: DEFAULT_TIME_ZONE,
            },
            scoring: ScoringConfig::Flags(FlagScoring {
                categories: vec![
                    flag_rule(TaskKind::Eval, "eval", REVIEWER_POINTS_EVAL),
                    flag_rule(TaskKind::Rshf, "rshf", REVIEWER_POINTS_RSHF),
                    flag_rule(TaskKind::Hlrm, "hlrm", REVIEWER_POINTS_HLRM),
                    flag_rule(TaskKind::Categories, "categories", REVIEWER_POINTS_CATEGORIES),
                ],
            }),
            tiers: tiers(REVIEWER_PAY_TIERS, REVIEWER_MULTIPLIER_TIERS),
            roster: Vec::new(),
        }
    }

    /// Reject configurations that cannot be evaluated.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let result = self.check();
        if let Err(e) = &result {
            warn!(error = %e, "config: rejected");
        }
        result
    }

    fn check(&self) -> Result<(), ConfigError> {
        if self.calendar.period_length_days == 0 {
            return Err(ConfigError::ZeroPeriodLength);
        }
        if self.calendar.window_period_count == 0 {
            return Err(ConfigError::ZeroWindowPeriods);
        }
        self.scoring.validate()?;
        self.tiers.validate()
    }
}

impl ScoringConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self {
            Self::Quantity(q) => q.validate(),
            Self::Flags(f) => f.validate(),
        }
    }

    pub fn policy_name(&self) -> &'static str {
        match self {
            Self::Quantity(_) => "quantity",
            Self::Flags(_) => "flags",
        }
    }
}

impl QuantityScoring {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.allowed_statuses.is_empty() {
            warn!("config: empty status allow-list, no row will count");
        }
        validate_keywords(self.categories.iter().map(|c| (c.kind, c.keyword.as_str())))?;
        for rule in &self.categories {
            finite("category points", rule.points)?;
        }
        self.ceiling.validate()
    }
}

impl CeilingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("ratio", self.ratio),
            ("volume_floor", self.volume_floor),
            ("error_allowance", self.error_allowance),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidCeiling(format!("{name} = {value}")));
            }
        }
        Ok(())
    }
}

impl FlagScoring {
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_keywords(self.categories.iter().map(|c| (c.kind, c.keyword.as_str())))?;
        for rule in &self.categories {
            finite("flag points", rule.primary)?;
            finite("flag points", rule.secondary)?;
            finite("flag points", rule.tertiary)?;
        }
        Ok(())
    }
}

impl TierConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pay.is_empty() {
            return Err(ConfigError::EmptyTierTable("pay"));
        }
        if self.multiplier.is_empty() {
            return Err(ConfigError::EmptyTierTable("multiplier"));
        }
        for t in &self.pay {
            finite("pay tiers", t.min_points)?;
            finite("pay tiers", t.amount)?;
        }
        for t in &self.multiplier {
            finite("multiplier tiers", t.min_average)?;
            finite("multiplier tiers", t.factor)?;
        }
        Ok(())
    }
}

/// Keywords must be non-empty, one per kind, and no keyword may contain
/// another. With that, a label can only match several kinds when it
/// literally names several of them.
fn validate_keywords<'a>(
    rules: impl Iterator<Item = (TaskKind, &'a str)>,
) -> Result<(), ConfigError> {
    let rules: Vec<(TaskKind, String)> = rules
        .map(|(kind, keyword)| (kind, keyword.trim().to_lowercase()))
        .collect();
    if rules.is_empty() {
        return Err(ConfigError::EmptyCategoryTable);
    }
    if let Some((kind, _)) = rules.iter().find(|(_, keyword)| keyword.is_empty()) {
        return Err(ConfigError::EmptyKeyword(*kind));
    }
    for (i, (kind, keyword)) in rules.iter().enumerate() {
        for (other_kind, other) in &rules[i + 1..] {
            if other_kind == kind {
                return Err(ConfigError::DuplicateKind(*kind));
            }
            if keyword.contains(other.as_str()) || other.contains(keyword.as_str()) {
                return Err(ConfigError::OverlappingKeywords {
                    first: keyword.clone(),
                    second: other.clone(),
                });
            }
        }
    }
    Ok(())
}

fn finite(table: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonFinite { table, value })
    }
}

fn preset_date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

fn category(kind: TaskKind, keyword: &str, points: f64) -> CategoryRule {
    CategoryRule {
        kind,
        keyword: keyword.to_string(),
        points,
    }
}

fn flag_rule(kind: TaskKind, keyword: &str, (primary, secondary, tertiary): (f64, f64, f64)) -> FlagRule {
    FlagRule {
        kind,
        keyword: keyword.to_string(),
        primary,
        secondary,
        tertiary,
    }
}

fn tiers(pay: &[(f64, f64)], multiplier: &[(f64, f64, &str)]) -> TierConfig {
    TierConfig {
        pay: pay
            .iter()
            .map(|&(min_points, amount)| PayThreshold { min_points, amount })
            .collect(),
        multiplier: multiplier
            .iter()
            .map(|&(min_average, factor, label)| MultiplierThreshold {
                min_average,
                factor,
                label: label.to_string(),
            })
            .collect(),
        missing_multiplier: MissingMultiplier::PassThrough,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_validate() {
        EngineConfig::trainer().validate().unwrap();
        EngineConfig::reviewer().validate().unwrap();
    }

    #[test]
    fn trainer_preset_values() {
        let cfg = EngineConfig::trainer();
        assert_eq!(cfg.calendar.anchor, NaiveDate::from_ymd_opt(2026, 1, 31).unwrap());
        assert_eq!(cfg.calendar.period_length_days, 9);
        assert_eq!(cfg.calendar.window_mode, WindowMode::Trailing);
        assert_eq!(cfg.tiers.pay.len(), 3);
        assert_eq!(cfg.scoring.policy_name(), "quantity");
    }

    #[test]
    fn reviewer_preset_grows_from_anchor() {
        let cfg = EngineConfig::reviewer();
        assert_eq!(cfg.calendar.anchor, NaiveDate::from_ymd_opt(2026, 2, 23).unwrap());
        assert_eq!(cfg.calendar.window_mode, WindowMode::GrowFromAnchor);
        assert_eq!(cfg.scoring.policy_name(), "flags");
    }

    #[test]
    fn zero_period_length_rejected() {
        let mut cfg = EngineConfig::trainer();
        cfg.calendar.period_length_days = 0;
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroPeriodLength));
    }

    #[test]
    fn empty_tier_tables_rejected() {
        let mut cfg = EngineConfig::trainer();
        cfg.tiers.multiplier.clear();
        assert_eq!(cfg.validate(), Err(ConfigError::EmptyTierTable("multiplier")));
        cfg.tiers.pay.clear();
        assert_eq!(cfg.validate(), Err(ConfigError::EmptyTierTable("pay")));
    }

    #[test]
    fn non_finite_threshold_rejected() {
        let mut cfg = EngineConfig::trainer();
        cfg.tiers.pay[1].min_points = f64::NAN;
        assert!(matches!(cfg.validate(), Err(ConfigError::NonFinite { table: "pay tiers", .. })));
    }

    #[test]
    fn overlapping_keywords_rejected() {
        let mut cfg = EngineConfig::reviewer();
        if let ScoringConfig::Flags(f) = &mut cfg.scoring {
            f.categories[1].keyword = "evals".into();
        }
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::OverlappingKeywords {
                first: "eval".into(),
                second: "evals".into()
            })
        );
    }

    #[test]
    fn duplicate_kind_and_empty_keyword_rejected() {
        let mut cfg = EngineConfig::trainer();
        if let ScoringConfig::Quantity(q) = &mut cfg.scoring {
            q.categories[1].kind = TaskKind::Rshf;
        }
        assert_eq!(cfg.validate(), Err(ConfigError::DuplicateKind(TaskKind::Rshf)));

        let mut cfg = EngineConfig::trainer();
        if let ScoringConfig::Quantity(q) = &mut cfg.scoring {
            q.categories[2].keyword = "  ".into();
        }
        assert_eq!(cfg.validate(), Err(ConfigError::EmptyKeyword(TaskKind::Hlrm)));
    }

    #[test]
    fn empty_category_table_rejected() {
        let mut cfg = EngineConfig::trainer();
        if let ScoringConfig::Quantity(q) = &mut cfg.scoring {
            q.categories.clear();
        }
        assert_eq!(cfg.validate(), Err(ConfigError::EmptyCategoryTable));
    }

    #[test]
    fn negative_ceiling_rejected() {
        let mut cfg = EngineConfig::trainer();
        if let ScoringConfig::Quantity(q) = &mut cfg.scoring {
            q.ceiling.ratio = -0.5;
        }
        assert!(matches!(cfg.validate(), Err(ConfigError::InvalidCeiling(_))));
    }

    #[test]
    fn deserializes_tagged_policy_with_defaults() {
        let cfg: EngineConfig = serde_json::from_str(
            r#"{
                "calendar": {"anchor": "2026-01-31", "period_length_days": 9, "window_period_count": 4},
                "scoring": {
                    "policy": "quantity",
                    "allowed_statuses": ["Task Submitted"],
                    "categories": [{"kind": "rshf", "keyword": "rshf", "points": 75000}]
                },
                "tiers": {
                    "pay": [{"min_points": 900000, "amount": 50}],
                    "multiplier": [{"min_average": 900000, "factor": 1.0, "label": "1x"}],
                    "missing_multiplier": "zero"
                }
            }"#,
        )
        .unwrap();
        assert_eq!(cfg.calendar.time_zone, DEFAULT_TIME_ZONE);
        assert_eq!(cfg.calendar.window_mode, WindowMode::Trailing);
        assert_eq!(cfg.tiers.missing_multiplier, MissingMultiplier::Zero);
        assert!(cfg.roster.is_empty());
        match cfg.scoring {
            ScoringConfig::Quantity(q) => assert_eq!(q.ceiling, CeilingConfig::default()),
            other => panic!("unexpected policy {}", other.policy_name()),
        }
    }

    #[test]
    fn missing_multiplier_factors() {
        assert_eq!(MissingMultiplier::PassThrough.factor(), 1.0);
        assert_eq!(MissingMultiplier::Zero.factor(), 0.0);
    }
}
