use crate::model::{AlgorithmKind, Leaderboard, Mode, RunResult, Selection, SessionConfig};
use crate::orchestrator::{LaneView, RunStatus};
use ratatui::{
    style::Color,
    style::Style,
    text::{Line, Span},
};
use std::time::{Duration, Instant};

pub struct UiState {
    pub tab: usize,
    pub info: String,

    /// Id of the session whose events are applied; 0 while waiting for a restart.
    pub session: u64,
    pub mode: Mode,
    pub lanes: Vec<LaneView>,
    pub input_len: usize,
    pub session_start: Instant,
    pub step_delay: Duration,

    /// Applied on the next restart.
    pub selection: Selection,

    pub single_result: Option<RunResult>,
    pub leaderboard: Option<Leaderboard>,
}

impl UiState {
    pub fn new(cfg: &SessionConfig) -> Self {
        Self {
            tab: 0,
            info: String::new(),
            session: 0,
            mode: cfg.selection.mode,
            lanes: Vec::new(),
            input_len: 0,
            session_start: Instant::now(),
            step_delay: cfg.step_delay,
            selection: cfg.selection,
            single_result: None,
            leaderboard: None,
        }
    }

    pub fn start_session(&mut self, session: u64, mode: Mode, input_len: usize, lanes: Vec<LaneView>) {
        self.session = session;
        self.mode = mode;
        self.input_len = input_len;
        self.lanes = lanes;
        self.session_start = Instant::now();
        self.single_result = None;
        self.leaderboard = None;
    }

    /// Forget the current session so late events from it are ignored.
    pub fn begin_restart(&mut self) {
        self.session = 0;
        self.single_result = None;
        self.leaderboard = None;
        self.info = "Restart requested…".into();
    }

    pub fn is_finished(&self) -> bool {
        self.single_result.is_some() || self.leaderboard.is_some()
    }

    pub fn toggle_mode(&mut self) {
        self.selection.mode = self.selection.mode.toggled();
        if self.selection.mode == Mode::Single && self.selection.algorithm.is_none() {
            self.selection.algorithm = Some(AlgorithmKind::Bubble);
        }
        self.info = format!("Next run: {} (press r to start)", self.selection_label());
    }

    /// Pick the single-mode algorithm by its 0-based position in [`AlgorithmKind::ALL`].
    pub fn select_algorithm(&mut self, idx: usize) {
        let Some(kind) = AlgorithmKind::ALL.get(idx).copied() else {
            return;
        };
        self.selection = Selection {
            mode: Mode::Single,
            algorithm: Some(kind),
        };
        self.info = format!("Next run: {} (press r to start)", self.selection_label());
    }

    pub fn selection_label(&self) -> String {
        match (self.selection.mode, self.selection.algorithm) {
            (Mode::Race, _) => "Race (all five)".to_string(),
            (Mode::Single, Some(k)) => format!("Single / {k}"),
            (Mode::Single, None) => "Single / (no algorithm)".to_string(),
        }
    }

    /// Lanes still sorting, for the status panel.
    pub fn running_lanes(&self) -> usize {
        self.lanes
            .iter()
            .filter(|l| l.status() == RunStatus::Running)
            .count()
    }
}

pub fn push_wrapped_status_kv(
    out: &mut Vec<Line<'static>>,
    label: &str,
    value: &str,
    status_area_width: u16,
) {
    let value = value.trim();
    if value.is_empty() {
        return;
    }

    // Account for borders (2 chars on each side)
    let usable_width = status_area_width.saturating_sub(4).max(1);
    let label_text = format!("{label}:");
    let label_width = label_text.chars().count() as u16;

    let value_chars: Vec<char> = value.chars().collect();
    let mut remaining = value_chars.as_slice();
    let mut first = true;

    while !remaining.is_empty() {
        let line_width = if first {
            usable_width.saturating_sub(label_width + 1).max(1)
        } else {
            usable_width.saturating_sub(2).max(1)
        };

        let chars_to_take = (remaining.len() as u16).min(line_width) as usize;
        let (line_chars, rest) = remaining.split_at(chars_to_take);
        let line_text: String = line_chars.iter().collect();

        if first {
            out.push(Line::from(vec![
                Span::styled(label_text.clone(), Style::default().fg(Color::Gray)),
                Span::raw(" "),
                Span::raw(line_text),
            ]));
            first = false;
        } else {
            out.push(Line::from(vec![Span::raw("  "), Span::raw(line_text)]));
        }

        remaining = rest;
    }
}
