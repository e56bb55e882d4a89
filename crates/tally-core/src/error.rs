//! Error types for Tally.
//!
//! Malformed rows are never errors: they are skipped and counted (see
//! [`SkipReason`](crate::types::SkipReason)). Only configuration problems and
//! row-source failures surface here.
use thiserror::Error;

use crate::types::TaskKind;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("period length must be at least one day")] ZeroPeriodLength,
    #[error("averaging window must span at least one period")] ZeroWindowPeriods,
    #[error("empty {0} tier table")] EmptyTierTable(&'static str),
    #[error("empty category table")] EmptyCategoryTable,
    #[error("non-finite value in {table}: {value}")] NonFinite { table: &'static str, value: f64 },
    #[error("duplicate rule for task kind {0}")] DuplicateKind(TaskKind),
    #[error("empty keyword for task kind {0}")] EmptyKeyword(TaskKind),
    #[error("keywords overlap: {first:?} and {second:?}")] OverlappingKeywords { first: String, second: String },
    #[error("invalid quality ceiling: {0}")] InvalidCeiling(String),
    #[error("date arithmetic out of range")] DateOutOfRange,
    #[error("scoring policy is {found}, expected {expected}")] PolicyMismatch { expected: &'static str, found: &'static str },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    #[error("io: {0}")] Io(String),
    #[error("malformed rows: {0}")] Malformed(String),
}

#[derive(Error, Debug)]
pub enum TallyError {
    #[error(transparent)] Config(#[from] ConfigError),
    #[error(transparent)] Source(#[from] SourceError),
}
