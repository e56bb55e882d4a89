//! Leaderboard ranking.
//!
//! Scores are rounded to whole points and sorted by score descending, then by
//! worker identity ascending, which makes the order total and the output
//! deterministic. Ranks follow competition ranking: tied scores share a rank
//! and the next distinct score takes its 1-based position
//! (`[100, 90, 90, 80]` → `[1, 2, 2, 4]`).
//!
//! The first [`TOP_BRACKET_SIZE`] entries form the top bracket, displayed as
//! two blocks. A viewer outside the top bracket gets a neighbor window of
//! [`NEIGHBOR_WINDOW_WIDTH`] entries centred on their own row.

use std::ops::Range;

use serde::Serialize;
use tally_core::constants::{
    CALL_TO_ACTION, NEIGHBOR_WINDOW_WIDTH, PRIMARY_BLOCK_SIZE, TOP_BRACKET_SIZE,
};
use tally_core::identity;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub worker_id: String,
    pub display_name: String,
    pub rank: usize,
    pub score: i64,
    pub is_viewer: bool,
    /// Only ever set on the viewer's own row in the neighbor window.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub call_to_action: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TopBracket {
    pub primary: Vec<LeaderboardEntry>,
    pub secondary: Vec<LeaderboardEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Leaderboard {
    pub top: TopBracket,
    /// Empty when the viewer is in the top bracket.
    pub neighbor_window: Vec<LeaderboardEntry>,
    pub viewer_in_top: bool,
}

fn round_score(score: f64) -> i64 {
    if score.is_finite() { score.round() as i64 } else { 0 }
}

/// Rank `(worker, score)` pairs. Identities are expected to be normalized and
/// unique.
pub fn ranked(scores: impl IntoIterator<Item = (String, f64)>, viewer: &str) -> Vec<LeaderboardEntry> {
    let mut scored: Vec<(String, i64)> = scores
        .into_iter()
        .map(|(worker, score)| (worker, round_score(score)))
        .collect();
    scored.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    let mut rank = 0;
    let mut prev = None;
    scored
        .into_iter()
        .enumerate()
        .map(|(idx, (worker_id, score))| {
            if prev != Some(score) {
                rank = idx + 1;
                prev = Some(score);
            }
            LeaderboardEntry {
                display_name: identity::display_name(&worker_id),
                is_viewer: !viewer.is_empty() && worker_id == viewer,
                worker_id,
                rank,
                score,
                call_to_action: None,
            }
        })
        .collect()
}

/// Index range of the neighbor window in a list of `len` entries.
///
/// Centred on `viewer` and shifted inward at either end so it keeps its full
/// width; shorter only when the list is. Without a viewer it is the first
/// entries of the list.
pub fn neighbor_range(len: usize, viewer: Option<usize>) -> Range<usize> {
    let width = NEIGHBOR_WINDOW_WIDTH.min(len);
    let Some(i) = viewer.filter(|&i| i < len) else {
        return 0..width;
    };
    let start = i.saturating_sub(width / 2).min(len - width);
    start..start + width
}

/// Build the leaderboard for `viewer` from `(worker, score)` pairs.
pub fn rank(scores: impl IntoIterator<Item = (String, f64)>, viewer: &str) -> Leaderboard {
    let viewer = identity::normalize(viewer);
    let entries = ranked(scores, &viewer);

    let top_len = TOP_BRACKET_SIZE.min(entries.len());
    let viewer_in_top = entries[..top_len].iter().any(|e| e.is_viewer);

    let neighbor_window = if viewer_in_top {
        Vec::new()
    } else {
        let me = entries.iter().position(|e| e.is_viewer);
        entries[neighbor_range(entries.len(), me)]
            .iter()
            .cloned()
            .map(|mut e| {
                if e.is_viewer {
                    e.call_to_action = Some(CALL_TO_ACTION.to_string());
                }
                e
            })
            .collect()
    };

    let mut primary: Vec<LeaderboardEntry> = entries.into_iter().take(TOP_BRACKET_SIZE).collect();
    let secondary = primary.split_off(PRIMARY_BLOCK_SIZE.min(primary.len()));

    Leaderboard {
        top: TopBracket { primary, secondary },
        neighbor_window,
        viewer_in_top,
    }
}
