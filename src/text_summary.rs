//! Text summary builder for CLI output.
//!
//! Formats human-readable lines for text mode and for the TUI result panel.

use crate::model::{Leaderboard, Outcome, RunResult};
use std::time::Duration;

/// Longest array rendered inline before it is elided.
const MAX_INLINE_VALUES: usize = 30;

/// Pre-formatted lines for text output.
pub(crate) struct TextSummary {
    pub lines: Vec<String>,
}

pub(crate) fn fmt_ms(d: Duration) -> String {
    format!("{} ms", d.as_millis())
}

pub(crate) fn fmt_values(values: &[i64]) -> String {
    let shown: Vec<String> = values
        .iter()
        .take(MAX_INLINE_VALUES)
        .map(|v| v.to_string())
        .collect();
    if values.len() > MAX_INLINE_VALUES {
        format!("[{}, … +{} more]", shown.join(", "), values.len() - MAX_INLINE_VALUES)
    } else {
        format!("[{}]", shown.join(", "))
    }
}

pub(crate) fn single_lines(result: &RunResult) -> Vec<String> {
    vec![
        format!("{} took: {}", result.algorithm, fmt_ms(result.duration)),
        format!("Frames: {}", result.frames),
        format!("Sorted: {}", fmt_values(&result.sorted)),
    ]
}

pub(crate) fn leaderboard_lines(board: &Leaderboard) -> Vec<String> {
    let mut lines = Vec::with_capacity(board.len() + 1);
    lines.push("Leaderboard:".to_string());
    if board.is_empty() {
        lines.push("  (no finishers)".to_string());
    }
    for e in &board.entries {
        lines.push(format!("{}. {} - {}", e.rank, e.algorithm, fmt_ms(e.duration)));
    }
    lines
}

/// Build a text summary for a finished session.
pub(crate) fn build_text_summary(input: &[i64], outcome: &Outcome) -> TextSummary {
    let mut lines = vec![format!("Input ({}): {}", input.len(), fmt_values(input))];
    match outcome {
        Outcome::Single(result) => lines.extend(single_lines(result)),
        Outcome::Race(board) => lines.extend(leaderboard_lines(board)),
    }
    TextSummary { lines }
}
