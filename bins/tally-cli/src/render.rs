//! Output rendering: plain text for people, pretty JSON for machines.

use std::fmt::Write as _;

use anyhow::Result;
use clap::ValueEnum;
use serde::Serialize;
use tally_core::calendar::PeriodBounds;
use tally_core::config::{EngineConfig, ScoringConfig};
use tally_engine::format::thousands;
use tally_engine::{Dashboard, DashboardOutcome, Leaderboard, LeaderboardEntry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

fn json<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

pub fn dashboard(outcome: &DashboardOutcome, format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        return json(outcome);
    }
    Ok(match outcome {
        DashboardOutcome::Ready(d) => dashboard_text(d),
        DashboardOutcome::NoAccess => "No access: no worker identity given.".to_string(),
        DashboardOutcome::NoData => "No data: the row source is empty.".to_string(),
    })
}

fn dashboard_text(d: &Dashboard) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Worker:      {}", d.worker_id);
    let _ = writeln!(out, "Period:      {}", d.period_range_label);
    let _ = writeln!(out, "Score:       {}", thousands(d.current_period_score));
    let _ = writeln!(out, "Average:     {}", thousands(d.window_average));
    let _ = writeln!(out, "Pay:         {}", d.pay.label);
    let _ = writeln!(out, "             {:>3}%  {}", d.pay_progress.percent, d.pay_progress.label);
    let _ = writeln!(out, "Multiplier:  {}", d.multiplier.label);
    let _ = writeln!(
        out,
        "             {:>3}%  {}",
        d.multiplier_progress.percent, d.multiplier_progress.label
    );
    let _ = writeln!(out, "Earnings:    {}", d.earnings.label);
    out.push('\n');
    out.push_str(&leaderboard_text(&d.leaderboard));
    out
}

pub fn leaderboard(board: &Leaderboard, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => json(board),
        OutputFormat::Text => Ok(leaderboard_text(board)),
    }
}

fn entry_line(out: &mut String, e: &LeaderboardEntry) {
    let marker = if e.is_viewer { "*" } else { " " };
    let _ = write!(out, "{marker} {:>4}  {:<20} {:>12}", e.rank, e.display_name, thousands(e.score));
    if let Some(cta) = &e.call_to_action {
        let _ = write!(out, "  {cta}");
    }
    out.push('\n');
}

fn leaderboard_text(board: &Leaderboard) -> String {
    let mut out = String::from("Leaderboard\n");
    if board.top.primary.is_empty() {
        out.push_str("  (empty)\n");
    }
    for e in board.top.primary.iter().chain(&board.top.secondary) {
        entry_line(&mut out, e);
    }
    if !board.neighbor_window.is_empty() {
        out.push_str("\nYour position\n");
        for e in &board.neighbor_window {
            entry_line(&mut out, e);
        }
    }
    out
}

pub fn bounds(b: &PeriodBounds, format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        return json(b);
    }
    Ok(format!(
        "Period {}:  {} .. {}\nWindow:     {} .. {} ({} periods)\nTime zone:  {}\n",
        b.period_index,
        b.current_start,
        b.current_end,
        b.window_start,
        b.window_end,
        b.periods_in_window,
        b.time_zone.name()
    ))
}

pub fn config_summary(config: &EngineConfig, format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        return json(config);
    }
    let cal = &config.calendar;
    let categories = match &config.scoring {
        ScoringConfig::Quantity(q) => q.categories.len(),
        ScoringConfig::Flags(f) => f.categories.len(),
    };
    Ok(format!(
        "Configuration OK\n\
         Policy:      {}\n\
         Anchor:      {}\n\
         Period:      {} days, window of {} ({:?})\n\
         Time zone:   {}\n\
         Categories:  {}\n\
         Tiers:       {} pay, {} multiplier (missing multiplier: {:?})\n\
         Roster:      {} workers\n",
        config.scoring.policy_name(),
        cal.anchor,
        cal.period_length_days,
        cal.window_period_count,
        cal.window_mode,
        cal.time_zone.name(),
        categories,
        config.tiers.pay.len(),
        config.tiers.multiplier.len(),
        config.tiers.missing_multiplier,
        config.roster.len(),
    ))
}
