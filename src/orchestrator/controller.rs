//! Session lifecycle controller.
//!
//! Owns start/restart/quit orchestration and emits events for presentation layers.

use super::race::RaceCoordinator;
use super::run::{LaneView, RunController};
use crate::input;
use crate::model::{
    InfoEvent, Leaderboard, Mode, Outcome, RunResult, Selection, SessionConfig,
};
use anyhow::Result;
use std::time::Duration;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tracing::{info, warn};

/// Commands emitted by UI layers to control the session.
#[derive(Debug, Clone)]
pub(crate) enum UiCommand {
    /// Tear down the active session and start a new one with this selection.
    Restart(Selection),
    Quit,
}

/// Events emitted by the controller, consumed by UI/CLI layers.
#[derive(Debug, Clone)]
pub(crate) enum SessionEvent {
    Started {
        session: u64,
        mode: Mode,
        input: Vec<i64>,
        lanes: Vec<LaneView>,
    },
    /// The session could not be started; the controller stays idle until the next restart.
    StartFailed {
        session: u64,
        error: String,
    },
    Info(InfoEvent),
    SingleCompleted {
        session: u64,
        result: Box<RunResult>,
    },
    RaceCompleted {
        session: u64,
        leaderboard: Leaderboard,
    },
}

enum Active {
    Single(RunController),
    Race(RaceCoordinator),
}

impl Active {
    fn launch(values: &[i64], selection: Selection, cfg: &SessionConfig) -> Result<Self> {
        let roster = selection.roster()?;
        match selection.mode {
            Mode::Single => {
                let mut ctl = RunController::new(roster[0], values.to_vec());
                ctl.start(cfg.step_delay)?;
                Ok(Active::Single(ctl))
            }
            Mode::Race => Ok(Active::Race(RaceCoordinator::launch(
                values,
                &roster,
                cfg.step_delay,
            )?)),
        }
    }

    fn views(&self) -> Vec<LaneView> {
        match self {
            Active::Single(ctl) => vec![ctl.view()],
            Active::Race(race) => race.views(),
        }
    }

    /// Resolves with the outcome, or `None` if the session can no longer produce one.
    async fn wait(&mut self, poll_interval: Duration) -> Option<Outcome> {
        match self {
            Active::Single(ctl) => ctl.wait(poll_interval).await.map(Outcome::Single),
            Active::Race(race) => race.wait(poll_interval).await.map(Outcome::Race),
        }
    }
}

/// Internal handle for a running session.
struct SessionCtx {
    id: u64,
    active: Active,
    reported: bool,
}

/// Build a fresh array and start a session. Nothing is shared with earlier sessions.
fn start_session(
    cfg: &SessionConfig,
    selection: Selection,
    id: u64,
    event_tx: &UnboundedSender<SessionEvent>,
) -> Result<SessionCtx> {
    let values = input::materialize(&cfg.source)?;
    let active = Active::launch(&values, selection, cfg)?;
    info!(session = id, mode = ?selection.mode, len = values.len(), "session started");

    let _ = event_tx.send(SessionEvent::Started {
        session: id,
        mode: selection.mode,
        input: values.clone(),
        lanes: active.views(),
    });
    let _ = event_tx.send(SessionEvent::Info(InfoEvent::SessionStarted {
        mode: selection.mode,
        len: values.len(),
    }));
    Ok(SessionCtx {
        id,
        active,
        reported: false,
    })
}

/// Start a session, reporting configuration problems to the UI instead of failing.
fn launch_or_report(
    cfg: &SessionConfig,
    selection: Selection,
    next_id: &mut u64,
    event_tx: &UnboundedSender<SessionEvent>,
) -> Option<SessionCtx> {
    let id = *next_id;
    *next_id += 1;
    match start_session(cfg, selection, id, event_tx) {
        Ok(ctx) => Some(ctx),
        Err(e) => {
            warn!(session = id, "session failed to start: {e:#}");
            let _ = event_tx.send(SessionEvent::StartFailed {
                session: id,
                error: format!("{e:#}"),
            });
            None
        }
    }
}

/// Cancel and join the session's sort threads off the async runtime.
async fn teardown(ctx: SessionCtx, event_tx: &UnboundedSender<SessionEvent>) {
    let was_running = !ctx.reported;
    let id = ctx.id;
    let _ = tokio::task::spawn_blocking(move || drop(ctx)).await;
    if was_running {
        info!(session = id, "session cancelled");
        let _ = event_tx.send(SessionEvent::Info(InfoEvent::Cancelled));
    }
}

/// Orchestrate sessions based on UI commands and emit events back to presentation layers.
pub(crate) async fn run_controller(
    cfg: &SessionConfig,
    event_tx: UnboundedSender<SessionEvent>,
    mut cmd_rx: UnboundedReceiver<UiCommand>,
) -> Result<()> {
    let mut next_id = 1;
    let mut ctx = launch_or_report(cfg, cfg.selection, &mut next_id, &event_tx);

    loop {
        tokio::select! {
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(UiCommand::Restart(selection)) => {
                        // Restart is serialized: the old threads are joined before new ones start.
                        if let Some(old) = ctx.take() {
                            teardown(old, &event_tx).await;
                        }
                        ctx = launch_or_report(cfg, selection, &mut next_id, &event_tx);
                    }
                    Some(UiCommand::Quit) | None => {
                        if let Some(old) = ctx.take() {
                            teardown(old, &event_tx).await;
                        }
                        break Ok(());
                    }
                }
            }
            // Rebuilt every iteration so it always waits on the current `ctx`.
            done = async {
                match ctx.as_mut() {
                    Some(c) if !c.reported => c.active.wait(cfg.poll_interval).await,
                    _ => futures::future::pending().await,
                }
            } => {
                let Some(c) = ctx.as_mut() else { continue };
                c.reported = true;
                if let Some(outcome) = done {
                    let ev = match outcome {
                        Outcome::Single(result) => SessionEvent::SingleCompleted {
                            session: c.id,
                            result: Box::new(result),
                        },
                        Outcome::Race(leaderboard) => SessionEvent::RaceCompleted {
                            session: c.id,
                            leaderboard,
                        },
                    };
                    let _ = event_tx.send(ev);
                }
            }
        }
    }
}
