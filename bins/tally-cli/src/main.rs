//! Tally command-line interface.
//!
//! Loads an engine configuration, reads rows from a JSON file and prints a
//! worker's dashboard, the leaderboard, or the current period bounds. This is
//! the only place the wall clock is read; `--now` overrides it.

mod render;
mod settings;
mod source;

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use serde::de::DeserializeOwned;
use tally_core::calendar::PeriodCalendar;
use tally_core::config::{EngineConfig, ScoringConfig};
use tally_core::traits::RowSource;
use tally_core::types::parse_timestamp;
use tally_engine::{Engine, FromScoring};
use tally_score::{FlagAggregator, QuantityAggregator};
use tracing::{debug, info};

use crate::render::OutputFormat;
use crate::settings::Preset;
use crate::source::JsonRowSource;

#[derive(Parser, Debug)]
#[command(name = "tally", version, about = "Period-based activity scoring, pay tiers and leaderboards")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (default: <config dir>/tally/config.toml).
    #[arg(long, global = true, conflicts_with = "preset")]
    config: Option<PathBuf>,

    /// Use a built-in deployment instead of a config file.
    #[arg(long, global = true, value_enum)]
    preset: Option<Preset>,

    /// Evaluation instant, RFC 3339 or `YYYY-MM-DD HH:MM:SS` (UTC). Defaults to now.
    #[arg(long, global = true)]
    now: Option<String>,

    /// Output format.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Log output format ("text" or "json")
    #[arg(long, global = true, default_value = "text")]
    log_format: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Evaluate one worker's dashboard.
    Dashboard(DashboardArgs),
    /// Print the ranked leaderboard.
    Leaderboard(LeaderboardArgs),
    /// Print the current period and averaging window.
    Bounds,
    /// Validate the configuration and print a summary.
    CheckConfig,
}

#[derive(Args, Debug)]
struct DashboardArgs {
    /// Row file (.json array or .jsonl).
    #[arg(long)]
    rows: PathBuf,

    /// Worker identity whose dashboard to show.
    #[arg(long)]
    worker: String,
}

#[derive(Args, Debug)]
struct LeaderboardArgs {
    /// Row file (.json array or .jsonl).
    #[arg(long)]
    rows: PathBuf,

    /// Highlight this worker and show their neighbor window.
    #[arg(long, default_value = "")]
    worker: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level, &cli.log_format);

    let config = settings::load(cli.config.as_deref(), cli.preset)?;
    let now = resolve_now(cli.now.as_deref())?;
    info!(policy = config.scoring.policy_name(), %now, "tally: configuration loaded");

    let output = run(&cli, &config, now)?;
    println!("{output}");
    Ok(())
}

fn run(cli: &Cli, config: &EngineConfig, now: DateTime<Utc>) -> Result<String> {
    match &cli.command {
        Commands::Bounds => {
            let bounds = PeriodCalendar::new(config.calendar.clone()).bounds_at(now)?;
            render::bounds(&bounds, cli.format)
        }
        Commands::CheckConfig => render::config_summary(config, cli.format),
        Commands::Dashboard(args) => match config.scoring {
            ScoringConfig::Quantity(_) => dashboard::<QuantityAggregator>(config, args, now, cli.format),
            ScoringConfig::Flags(_) => dashboard::<FlagAggregator>(config, args, now, cli.format),
        },
        Commands::Leaderboard(args) => match config.scoring {
            ScoringConfig::Quantity(_) => leaderboard::<QuantityAggregator>(config, args, now, cli.format),
            ScoringConfig::Flags(_) => leaderboard::<FlagAggregator>(config, args, now, cli.format),
        },
    }
}

fn dashboard<A>(
    config: &EngineConfig,
    args: &DashboardArgs,
    now: DateTime<Utc>,
    format: OutputFormat,
) -> Result<String>
where
    A: FromScoring,
    A::Row: DeserializeOwned,
{
    let engine = Engine::<A>::from_config(config)?;
    let source = JsonRowSource::<A::Row>::new(&args.rows);
    let outcome = engine
        .evaluate_source(&source, &args.worker, now)
        .with_context(|| format!("failed to evaluate rows from {}", source.path().display()))?;
    render::dashboard(&outcome, format)
}

fn leaderboard<A>(
    config: &EngineConfig,
    args: &LeaderboardArgs,
    now: DateTime<Utc>,
    format: OutputFormat,
) -> Result<String>
where
    A: FromScoring,
    A::Row: DeserializeOwned,
{
    let engine = Engine::<A>::from_config(config)?;
    let source = JsonRowSource::<A::Row>::new(&args.rows);
    let rows = source
        .fetch_rows()
        .with_context(|| format!("failed to read rows from {}", source.path().display()))?;
    let board = engine.leaderboard(&rows, &args.worker, now)?;
    render::leaderboard(&board, format)
}

fn resolve_now(text: Option<&str>) -> Result<DateTime<Utc>> {
    match text {
        Some(text) => parse_timestamp(text).with_context(|| format!("invalid --now value {text:?}")),
        None => {
            let now = Utc::now();
            debug!(%now, "tally: using wall clock");
            Ok(now)
        }
    }
}

fn init_logging(level_str: &str, format: &str) {
    use tracing_subscriber::filter::EnvFilter;
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level_str));

    // Logs go to stderr so stdout stays parseable with --format json.
    if format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_level(true).with_writer(std::io::stderr))
            .init();
    }
}
