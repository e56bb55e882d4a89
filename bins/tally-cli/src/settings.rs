//! Engine configuration for the `tally` binary.
//!
//! Either a built-in deployment preset, or a TOML file layered with
//! `TALLY__SECTION__KEY` environment overrides
//! (e.g. `TALLY__CALENDAR__PERIOD_LENGTH_DAYS=7`).

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::ValueEnum;
use config::{Config, Environment, File, FileFormat};
use tally_core::config::EngineConfig;
use tracing::debug;

pub const ENV_PREFIX: &str = "TALLY";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Preset {
    /// Quantity scoring, 9-day periods.
    Trainer,
    /// Flag scoring, 7-day periods.
    Reviewer,
}

impl Preset {
    pub fn config(self) -> EngineConfig {
        match self {
            Self::Trainer => EngineConfig::trainer(),
            Self::Reviewer => EngineConfig::reviewer(),
        }
    }
}

/// `<config dir>/tally/config.toml`, falling back to the working directory.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tally")
        .join("config.toml")
}

/// Resolve and validate the engine configuration.
pub fn load(path: Option<&Path>, preset: Option<Preset>) -> Result<EngineConfig> {
    let config = match preset {
        Some(preset) => {
            debug!(?preset, "settings: using preset");
            preset.config()
        }
        None => {
            let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
            from_file(&path)?
        }
    };
    config.validate().context("invalid configuration")?;
    Ok(config)
}

/// Read `path` as TOML with environment overrides. Does not validate.
pub fn from_file(path: &Path) -> Result<EngineConfig> {
    debug!(path = %path.display(), "settings: loading config file");
    let settings = Config::builder()
        .add_source(File::from(path).format(FileFormat::Toml))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .with_context(|| format!("failed to read config {}", path.display()))?;
    settings
        .try_deserialize()
        .with_context(|| format!("malformed config {}", path.display()))
}
