//! Race coordinator: every algorithm on its own copy of the same array.

use super::run::{LaneView, RunController, RunStatus, MIN_POLL_INTERVAL};
use crate::model::{AlgorithmKind, ConfigError, Leaderboard};
use anyhow::Result;
use std::collections::HashSet;
use std::time::Duration;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RaceStatus {
    Idle,
    Running,
    Complete,
    Cancelled,
}

pub struct RaceCoordinator {
    lanes: Vec<RunController>,
    started: bool,
    reported: bool,
    cancelled: bool,
}

impl RaceCoordinator {
    /// Prepare one idle controller per kind, each on its own clone of `source`.
    pub fn new(source: &[i64], kinds: &[AlgorithmKind]) -> Result<Self, ConfigError> {
        if kinds.is_empty() {
            return Err(ConfigError::NoAlgorithms);
        }
        let mut seen = HashSet::new();
        if let Some(dup) = kinds.iter().find(|k| !seen.insert(**k)) {
            return Err(ConfigError::DuplicateAlgorithm(*dup));
        }

        let lanes = kinds
            .iter()
            .map(|&kind| RunController::new(kind, source.to_vec()))
            .collect();
        Ok(Self {
            lanes,
            started: false,
            reported: false,
            cancelled: false,
        })
    }

    /// Validate, then start every lane.
    pub fn launch(source: &[i64], kinds: &[AlgorithmKind], step_delay: Duration) -> Result<Self> {
        let mut race = Self::new(source, kinds)?;
        race.start(step_delay)?;
        Ok(race)
    }

    pub fn start(&mut self, step_delay: Duration) -> Result<()> {
        for lane in &mut self.lanes {
            // On a spawn failure the already-running lanes are cancelled when `self` drops.
            lane.start(step_delay)?;
        }
        self.started = true;
        info!(lanes = self.lanes.len(), ?step_delay, "race started");
        Ok(())
    }

    pub fn views(&self) -> Vec<LaneView> {
        self.lanes.iter().map(RunController::view).collect()
    }

    pub fn status(&self) -> RaceStatus {
        if self.cancelled {
            RaceStatus::Cancelled
        } else if !self.started {
            RaceStatus::Idle
        } else if self
            .lanes
            .iter()
            .all(|l| l.status() == RunStatus::Complete)
        {
            RaceStatus::Complete
        } else {
            RaceStatus::Running
        }
    }

    /// Non-blocking check. Yields the leaderboard exactly once, when every lane
    /// has recorded its duration.
    pub fn poll(&mut self) -> Option<Leaderboard> {
        if self.reported || self.cancelled || !self.started {
            return None;
        }
        if !self.lanes.iter().all(|l| l.status() == RunStatus::Complete) {
            return None;
        }
        let results = self
            .lanes
            .iter_mut()
            .map(|l| l.poll().cloned())
            .collect::<Option<Vec<_>>>()?;
        self.reported = true;

        let board = Leaderboard::from_results(results);
        if let Some(w) = board.winner() {
            info!(winner = %w.algorithm, duration = ?w.duration, "race complete");
        }
        Some(board)
    }

    /// Poll on a fixed interval until the leaderboard is ready. A lane whose
    /// thread dies without finishing keeps this waiting.
    pub async fn wait(&mut self, poll_interval: Duration) -> Option<Leaderboard> {
        let mut ticker = tokio::time::interval(poll_interval.max(MIN_POLL_INTERVAL));
        loop {
            ticker.tick().await;
            if let Some(board) = self.poll() {
                return Some(board);
            }
            if self.reported || matches!(self.status(), RaceStatus::Idle | RaceStatus::Cancelled) {
                return None;
            }
        }
    }

    pub fn cancel(&mut self) {
        if self.status() != RaceStatus::Complete {
            self.cancelled = true;
        }
        for lane in &mut self.lanes {
            lane.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const POLL: Duration = Duration::from_millis(1);

    #[tokio::test]
    async fn leaderboard_has_every_kind_once_in_order() {
        let source = vec![9, 4, 7, 1, 8, 2, 6, 3, 5, 0];
        let mut race = RaceCoordinator::launch(&source, &AlgorithmKind::ALL, Duration::ZERO).unwrap();
        let board = race.wait(POLL).await.expect("race completes");

        assert_eq!(board.len(), 5);
        let mut kinds: Vec<_> = board.entries.iter().map(|e| e.algorithm).collect();
        kinds.sort();
        assert_eq!(kinds, AlgorithmKind::ALL.to_vec());
        assert!(board
            .entries
            .windows(2)
            .all(|w| w[0].duration <= w[1].duration));
        assert_eq!(race.status(), RaceStatus::Complete);
    }

    #[tokio::test]
    async fn leaderboard_is_reported_once() {
        let mut race =
            RaceCoordinator::launch(&[3, 1, 2], &AlgorithmKind::ALL, Duration::ZERO).unwrap();
        assert!(race.wait(POLL).await.is_some());
        assert!(race.poll().is_none());
        assert!(race.wait(POLL).await.is_none());
    }

    #[test]
    fn poll_waits_for_the_last_lane() {
        let source: Vec<i64> = (0..12).rev().collect();
        let mut race =
            RaceCoordinator::launch(&source, &AlgorithmKind::ALL, Duration::from_millis(3)).unwrap();

        let mut saw_partial = false;
        let board = loop {
            let complete = |race: &RaceCoordinator| {
                race.views()
                    .iter()
                    .filter(|v| v.status() == RunStatus::Complete)
                    .count()
            };
            let before = complete(&race);
            match race.poll() {
                Some(board) => {
                    assert_eq!(complete(&race), AlgorithmKind::ALL.len());
                    break board;
                }
                None if before > 0 => saw_partial = true,
                None => {}
            }
            std::thread::sleep(Duration::from_millis(1));
        };

        // merge sort needs far fewer frames on reversed input and finishes first
        assert!(saw_partial);
        assert_eq!(board.len(), 5);
        assert!(board.entries.iter().all(|e| e.frames > 0));
    }

    #[tokio::test]
    async fn lanes_sort_independent_copies() {
        let source = vec![5, 3, 4, 1, 2];
        let mut race = RaceCoordinator::launch(&source, &AlgorithmKind::ALL, Duration::ZERO).unwrap();
        race.wait(POLL).await.unwrap();
        for view in race.views() {
            assert_eq!(view.frame().values, vec![1, 2, 3, 4, 5], "{}", view.kind());
        }
        assert_eq!(source, vec![5, 3, 4, 1, 2]);
    }

    #[test]
    fn roster_is_validated_before_start() {
        assert_eq!(
            RaceCoordinator::new(&[1], &[]).err(),
            Some(ConfigError::NoAlgorithms)
        );
        assert_eq!(
            RaceCoordinator::new(&[1], &[AlgorithmKind::Quick, AlgorithmKind::Quick]).err(),
            Some(ConfigError::DuplicateAlgorithm(AlgorithmKind::Quick))
        );
        let race = RaceCoordinator::new(&[1], &AlgorithmKind::ALL).unwrap();
        assert_eq!(race.status(), RaceStatus::Idle);
    }

    #[test]
    fn cancel_stops_all_lanes() {
        let source: Vec<i64> = (0..300).rev().collect();
        let mut race =
            RaceCoordinator::launch(&source, &AlgorithmKind::ALL, Duration::from_millis(25)).unwrap();
        assert_eq!(race.status(), RaceStatus::Running);
        std::thread::sleep(Duration::from_millis(40));
        race.cancel();

        assert_eq!(race.status(), RaceStatus::Cancelled);
        assert!(race.poll().is_none());
        let counts: Vec<_> = race.views().iter().map(LaneView::frames).collect();
        std::thread::sleep(Duration::from_millis(60));
        let after: Vec<_> = race.views().iter().map(LaneView::frames).collect();
        assert_eq!(counts, after);
        assert!(race.views().iter().all(|v| v.duration().is_none()));
    }
}
