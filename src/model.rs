use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Configuration problems detected before any sort thread is started.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("unknown algorithm '{0}' (expected one of: bubble, insertion, selection, merge, quick)")]
    UnknownAlgorithm(String),
    #[error("single mode requires an algorithm selection")]
    MissingAlgorithm,
    #[error("race requires at least one algorithm")]
    NoAlgorithms,
    #[error("{0} appears more than once in the race roster")]
    DuplicateAlgorithm(AlgorithmKind),
    #[error("{0} controller was already started")]
    AlreadyStarted(AlgorithmKind),
}

/// The closed set of sorting procedures. Declaration order doubles as the
/// leaderboard tie-break order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AlgorithmKind {
    Bubble,
    Insertion,
    Selection,
    Merge,
    Quick,
}

impl AlgorithmKind {
    pub const ALL: [AlgorithmKind; 5] = [
        AlgorithmKind::Bubble,
        AlgorithmKind::Insertion,
        AlgorithmKind::Selection,
        AlgorithmKind::Merge,
        AlgorithmKind::Quick,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            AlgorithmKind::Bubble => "Bubble Sort",
            AlgorithmKind::Insertion => "Insertion Sort",
            AlgorithmKind::Selection => "Selection Sort",
            AlgorithmKind::Merge => "Merge Sort",
            AlgorithmKind::Quick => "Quick Sort",
        }
    }

    /// Short lowercase name, used for thread names and CLI values.
    pub fn slug(self) -> &'static str {
        match self {
            AlgorithmKind::Bubble => "bubble",
            AlgorithmKind::Insertion => "insertion",
            AlgorithmKind::Selection => "selection",
            AlgorithmKind::Merge => "merge",
            AlgorithmKind::Quick => "quick",
        }
    }
}

impl fmt::Display for AlgorithmKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for AlgorithmKind {
    type Err = ConfigError;

    /// Accepts `bubble`, `bubble-sort`, `bubble_sort` and `Bubble Sort`, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .collect::<String>()
            .to_ascii_lowercase();
        let stem = norm.strip_suffix("sort").unwrap_or(&norm);
        AlgorithmKind::ALL
            .into_iter()
            .find(|k| k.slug() == stem)
            .ok_or_else(|| ConfigError::UnknownAlgorithm(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
pub enum Mode {
    Single,
    Race,
}

impl Mode {
    pub fn toggled(self) -> Self {
        match self {
            Mode::Single => Mode::Race,
            Mode::Race => Mode::Single,
        }
    }
}

/// Immutable snapshot of one lane: array contents plus the highlighted index.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Frame {
    pub values: Vec<i64>,
    pub highlight: Option<usize>,
}

impl Frame {
    pub fn new(values: Vec<i64>, highlight: Option<usize>) -> Self {
        Self { values, highlight }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunResult {
    pub algorithm: AlgorithmKind,
    #[serde(with = "humantime_serde")]
    pub duration: Duration,
    pub frames: u64,
    pub sorted: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub algorithm: AlgorithmKind,
    #[serde(with = "humantime_serde")]
    pub duration: Duration,
    pub frames: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Leaderboard {
    pub entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    /// Rank results ascending by duration; exact ties fall back to declaration order.
    pub fn from_results(mut results: Vec<RunResult>) -> Self {
        results.sort_by_key(|r| (r.duration, r.algorithm));
        let entries = results
            .into_iter()
            .enumerate()
            .map(|(i, r)| LeaderboardEntry {
                rank: i + 1,
                algorithm: r.algorithm,
                duration: r.duration,
                frames: r.frames,
            })
            .collect();
        Self { entries }
    }

    pub fn winner(&self) -> Option<&LeaderboardEntry> {
        self.entries.first()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Where a session's array comes from. Random sources are re-drawn on every restart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArraySource {
    Explicit(Vec<i64>),
    Random {
        size: usize,
        max_value: i64,
        seed: Option<u64>,
    },
}

/// Mode plus algorithm, as chosen by the user for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub mode: Mode,
    pub algorithm: Option<AlgorithmKind>,
}

impl Selection {
    /// Resolve the roster of algorithms this selection runs.
    pub fn roster(&self) -> Result<Vec<AlgorithmKind>, ConfigError> {
        match self.mode {
            Mode::Single => self
                .algorithm
                .map(|k| vec![k])
                .ok_or(ConfigError::MissingAlgorithm),
            Mode::Race => Ok(AlgorithmKind::ALL.to_vec()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub source: ArraySource,
    pub selection: Selection,
    #[serde(with = "humantime_serde")]
    pub step_delay: Duration,
    #[serde(with = "humantime_serde")]
    pub poll_interval: Duration,
}

/// Final outcome of a session, as reported to the headless output modes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Outcome {
    Single(RunResult),
    Race(Leaderboard),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionReport {
    pub timestamp_utc: String,
    pub mode: Mode,
    pub input: Vec<i64>,
    #[serde(with = "humantime_serde")]
    pub step_delay: Duration,
    pub outcome: Outcome,
}

/// Structured info events emitted by the controller and consumed by UI/CLI layers.
#[derive(Debug, Clone)]
pub enum InfoEvent {
    SessionStarted { mode: Mode, len: usize },
    Cancelled,
}

impl InfoEvent {
    /// Render a human-readable message for UI/CLI layers.
    pub fn to_message(&self) -> String {
        match self {
            InfoEvent::SessionStarted { mode, len } => {
                format!("Started {mode:?} session on {len} element(s)")
            }
            InfoEvent::Cancelled => "Cancelled".to_string(),
        }
    }
}
