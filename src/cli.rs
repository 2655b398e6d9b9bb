use crate::input;
use crate::model::{
    AlgorithmKind, ArraySource, InfoEvent, Mode, Outcome, Selection, SessionConfig,
    SessionReport,
};
use crate::orchestrator::{self, LaneView, RunStatus, SessionEvent, UiCommand};
use anyhow::{Context, Result};
use clap::Parser;
use std::io::Write;
use std::time::Duration;
use tokio::sync::mpsc;

/// Output line routing for stdout/stderr writer.
enum OutputLine {
    Stdout(String),
    Stderr(String),
}

/// Spawn a blocking writer for stdout/stderr to avoid blocking async tasks.
fn spawn_output_writer() -> (
    mpsc::UnboundedSender<OutputLine>,
    tokio::task::JoinHandle<()>,
) {
    let (tx, mut rx) = mpsc::unbounded_channel::<OutputLine>();
    let handle = tokio::task::spawn_blocking(move || {
        let stdout = std::io::stdout();
        let stderr = std::io::stderr();
        let mut out = std::io::LineWriter::new(stdout.lock());
        let mut err = std::io::LineWriter::new(stderr.lock());

        while let Some(line) = rx.blocking_recv() {
            match line {
                OutputLine::Stdout(msg) => {
                    let _ = writeln!(out, "{}", msg);
                }
                OutputLine::Stderr(msg) => {
                    let _ = writeln!(err, "{}", msg);
                }
            }
        }

        let _ = out.flush();
        let _ = err.flush();
    });
    (tx, handle)
}

#[derive(Debug, Parser, Clone)]
#[command(
    name = "sort-race-cli",
    version,
    about = "Animate classic sorting algorithms, alone or racing side by side"
)]
pub struct Cli {
    /// Comma-separated integers to sort (e.g. "5,3,4,1,2"); random if omitted
    #[arg(long)]
    pub array: Option<String>,

    /// Size of the random array
    #[arg(long, default_value_t = 50)]
    pub size: usize,

    /// Random values are drawn from 1..=MAX_VALUE
    #[arg(long, default_value_t = input::DEFAULT_MAX_VALUE)]
    pub max_value: i64,

    /// Seed for random array generation
    #[arg(long)]
    pub seed: Option<u64>,

    /// Run one algorithm or race all five
    #[arg(long, value_enum, default_value_t = Mode::Race)]
    pub mode: Mode,

    /// Algorithm for single mode: bubble, insertion, selection, merge, quick
    #[arg(long)]
    pub algorithm: Option<AlgorithmKind>,

    /// Delay after every animation step
    #[arg(long, default_value = "150ms")]
    pub step_delay: humantime::Duration,

    /// Interval between completion checks
    #[arg(long, default_value = "100ms")]
    pub poll_interval: humantime::Duration,

    /// Print JSON report and exit (no TUI)
    #[arg(long, conflicts_with = "text")]
    pub json: bool,

    /// Print text progress and results and exit (no TUI)
    #[arg(long)]
    pub text: bool,
}

pub async fn run(args: Cli) -> Result<()> {
    let cfg = build_config(&args)?;

    if !args.json && !args.text {
        #[cfg(feature = "tui")]
        {
            return crate::tui::run(cfg).await;
        }
        #[cfg(not(feature = "tui"))]
        {
            // Fallback when built without TUI support.
            init_tracing();
            return run_text(cfg).await;
        }
    }

    init_tracing();
    if args.json {
        return run_json(cfg).await;
    }

    run_text(cfg).await
}

/// Install a stderr subscriber for headless modes. The TUI owns the terminal and skips this.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("sort_race_cli=warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Build a `SessionConfig` from CLI arguments, rejecting bad input before any sort starts.
pub fn build_config(args: &Cli) -> Result<SessionConfig> {
    let source = match args.array.as_deref() {
        Some(list) => ArraySource::Explicit(input::parse_array(list).context("invalid --array")?),
        None => {
            if args.size == 0 || args.max_value < 1 {
                anyhow::bail!("--size and --max-value must both be at least 1");
            }
            ArraySource::Random {
                size: args.size,
                max_value: args.max_value,
                seed: args.seed,
            }
        }
    };
    let selection = Selection {
        mode: args.mode,
        algorithm: args.algorithm,
    };
    selection.roster()?;

    Ok(SessionConfig {
        source,
        selection,
        step_delay: Duration::from(args.step_delay),
        poll_interval: Duration::from(args.poll_interval),
    })
}

/// One line per lane that completed since the last sweep.
fn sweep_finished(lanes: &[LaneView], announced: &mut [bool]) -> Vec<String> {
    let mut lines = Vec::new();
    for (lane, done) in lanes.iter().zip(announced.iter_mut()) {
        if *done || lane.status() != RunStatus::Complete {
            continue;
        }
        *done = true;
        if let Some(d) = lane.duration() {
            lines.push(format!(
                "{} finished in {} ({} frames)",
                lane.kind(),
                crate::text_summary::fmt_ms(d),
                lane.frames()
            ));
        }
    }
    lines
}

/// Drive one session to its result. Progress goes to `out` when given.
async fn run_session(
    cfg: SessionConfig,
    out: Option<&mpsc::UnboundedSender<OutputLine>>,
) -> Result<(Vec<i64>, Outcome)> {
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<SessionEvent>();
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<UiCommand>();
    let poll_interval = cfg.poll_interval.max(Duration::from_millis(1));
    let handle =
        tokio::spawn(async move { orchestrator::run_controller(&cfg, event_tx, cmd_rx).await });

    let say = |msg: String| {
        if let Some(tx) = out {
            let _ = tx.send(OutputLine::Stderr(msg));
        }
    };

    let mut input = Vec::new();
    let mut lanes: Vec<LaneView> = Vec::new();
    let mut announced: Vec<bool> = Vec::new();
    let mut ticker = tokio::time::interval(poll_interval);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let outcome = loop {
        tokio::select! {
            ev = event_rx.recv() => match ev {
                Some(SessionEvent::Started { mode, input: values, lanes: views, .. }) => {
                    say(format!("== {mode:?} on {} element(s) ==", values.len()));
                    input = values;
                    announced = vec![false; views.len()];
                    lanes = views;
                }
                Some(SessionEvent::StartFailed { error, .. }) => {
                    break Err(anyhow::anyhow!(error));
                }
                Some(SessionEvent::Info(InfoEvent::SessionStarted { .. })) => {}
                Some(SessionEvent::Info(info)) => say(info.to_message()),
                Some(SessionEvent::SingleCompleted { result, .. }) => {
                    sweep_finished(&lanes, &mut announced).into_iter().for_each(&say);
                    break Ok(Outcome::Single(*result));
                }
                Some(SessionEvent::RaceCompleted { leaderboard, .. }) => {
                    sweep_finished(&lanes, &mut announced).into_iter().for_each(&say);
                    break Ok(Outcome::Race(leaderboard));
                }
                None => break Err(anyhow::anyhow!("session controller stopped before a result")),
            },
            // Quitting below cancels every sort still sleeping between steps.
            _ = &mut ctrl_c => {
                say("Interrupted".into());
                break Err(anyhow::anyhow!("interrupted"));
            }
            // Lanes are pulled, not pushed: report each one as it finishes.
            _ = ticker.tick() => {
                sweep_finished(&lanes, &mut announced).into_iter().for_each(&say);
            }
        }
    };

    let _ = cmd_tx.send(UiCommand::Quit);
    handle.await.context("session controller task failed")??;
    Ok((input, outcome?))
}

async fn run_json(cfg: SessionConfig) -> Result<()> {
    let (out_tx, out_handle) = spawn_output_writer();
    let mode = cfg.selection.mode;
    let step_delay = cfg.step_delay;
    let (input, outcome) = run_session(cfg, None).await.context("sort session failed")?;

    let report = SessionReport {
        timestamp_utc: time::OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Rfc3339)
            .unwrap_or_else(|_| "now".into()),
        mode,
        input,
        step_delay,
        outcome,
    };
    let out = serde_json::to_string_pretty(&report)?;
    let _ = out_tx.send(OutputLine::Stdout(out));

    drop(out_tx);
    let _ = out_handle.await;
    Ok(())
}

async fn run_text(cfg: SessionConfig) -> Result<()> {
    let (out_tx, out_handle) = spawn_output_writer();
    let res = run_session(cfg, Some(&out_tx)).await;

    if let Ok((input, outcome)) = res.as_ref() {
        let summary = crate::text_summary::build_text_summary(input, outcome);
        for line in summary.lines {
            let _ = out_tx.send(OutputLine::Stdout(line));
        }
    }
    drop(out_tx);
    let _ = out_handle.await;
    res.map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ConfigError;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("sort-race-cli").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn defaults_race_on_random_array() {
        let cfg = build_config(&parse(&[])).unwrap();
        assert_eq!(cfg.selection.mode, Mode::Race);
        assert_eq!(cfg.step_delay, Duration::from_millis(150));
        assert_eq!(cfg.poll_interval, Duration::from_millis(100));
        assert!(matches!(
            cfg.source,
            ArraySource::Random { size: 50, max_value: 100, seed: None }
        ));
    }

    #[test]
    fn explicit_array_and_single_algorithm() {
        let cfg = build_config(&parse(&[
            "--array",
            "5,3,4,1,2",
            "--mode",
            "single",
            "--algorithm",
            "merge-sort",
            "--step-delay",
            "0s",
        ]))
        .unwrap();
        assert_eq!(cfg.source, ArraySource::Explicit(vec![5, 3, 4, 1, 2]));
        assert_eq!(cfg.selection.algorithm, Some(AlgorithmKind::Merge));
        assert_eq!(cfg.step_delay, Duration::ZERO);
    }

    #[test]
    fn single_without_algorithm_is_rejected() {
        let err = build_config(&parse(&["--mode", "single"])).unwrap_err();
        assert_eq!(
            err.downcast_ref::<ConfigError>(),
            Some(&ConfigError::MissingAlgorithm)
        );
    }

    #[test]
    fn unknown_algorithm_fails_to_parse() {
        let res = Cli::try_parse_from(["sort-race-cli", "--algorithm", "bogo"]);
        assert!(res.is_err());
    }

    #[test]
    fn malformed_array_is_rejected() {
        assert!(build_config(&parse(&["--array", "1,x"])).is_err());
        assert!(build_config(&parse(&["--size", "0"])).is_err());
    }

    #[tokio::test]
    async fn headless_race_runs_to_leaderboard() {
        let cfg = build_config(&parse(&["--array", "4,2,3,1", "--step-delay", "0s", "--poll-interval", "1ms"]))
            .unwrap();
        let (input, outcome) = run_session(cfg, None).await.unwrap();
        assert_eq!(input, vec![4, 2, 3, 1]);
        match outcome {
            Outcome::Race(board) => assert_eq!(board.len(), 5),
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[tokio::test]
    async fn text_progress_names_every_finished_lane() {
        for _ in 0..10 {
            let cfg = build_config(&parse(&[
                "--array",
                "4,2,3,1,9,8",
                "--step-delay",
                "2ms",
                "--poll-interval",
                "5ms",
            ]))
            .unwrap();
            let (tx, mut rx) = mpsc::unbounded_channel();
            run_session(cfg, Some(&tx)).await.unwrap();
            drop(tx);

            let mut finished = Vec::new();
            while let Some(line) = rx.recv().await {
                if let OutputLine::Stderr(msg) = line {
                    if msg.contains("finished in") {
                        finished.push(msg);
                    }
                }
            }
            assert_eq!(finished.len(), 5, "{finished:?}");
            for kind in AlgorithmKind::ALL {
                assert!(
                    finished.iter().any(|l| l.starts_with(kind.display_name())),
                    "{kind} missing from {finished:?}"
                );
            }
        }
    }
}
