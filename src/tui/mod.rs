mod bars;
mod help;
mod state;

use crate::model::{InfoEvent, Mode, SessionConfig};
use crate::orchestrator::{self, SessionEvent, UiCommand};
use crate::text_summary::{fmt_ms, fmt_values, leaderboard_lines, single_lines};
use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::Color,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs, Wrap},
    Terminal,
};
use state::{push_wrapped_status_kv, UiState};
use std::{io, time::Duration, time::Instant};
use tokio::sync::mpsc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

pub async fn run(cfg: SessionConfig) -> Result<()> {
    let (event_tx, event_rx) = mpsc::unbounded_channel::<SessionEvent>();
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<UiCommand>();

    // TUI runs in a dedicated thread to keep all blocking I/O out of the Tokio runtime.
    let ui_cfg = cfg.clone();
    let ui_handle = std::thread::Builder::new()
        .name("tui".into())
        .spawn(move || run_threaded(ui_cfg, event_rx, cmd_tx))
        .context("spawn TUI thread")?;

    let res = orchestrator::run_controller(&cfg, event_tx, cmd_rx).await;

    let join_res = tokio::task::spawn_blocking(move || ui_handle.join()).await;
    if let Ok(joined) = join_res {
        match joined {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(e),
            Err(_) => return Err(anyhow::anyhow!("TUI thread panicked")),
        }
    }

    res
}

/// Run the TUI loop on a dedicated thread.
pub fn run_threaded(
    cfg: SessionConfig,
    mut event_rx: UnboundedReceiver<SessionEvent>,
    cmd_tx: UnboundedSender<UiCommand>,
) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).ok();

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;
    terminal.clear().ok();

    let mut state = UiState::new(&cfg);

    // Frames are pulled from the lanes at this rate, independent of the step delay.
    let tick_rate = Duration::from_millis(100);
    let mut last_tick = Instant::now();

    let res = loop {
        while let Ok(ev) = event_rx.try_recv() {
            apply_event(&mut state, ev);
        }

        if last_tick.elapsed() >= tick_rate {
            terminal.draw(|f| draw(f.area(), f, &state)).ok();
            last_tick = Instant::now();
        }

        if event::poll(Duration::from_millis(10)).unwrap_or(false) {
            if let Ok(Event::Key(k)) = event::read() {
                if k.kind != KeyEventKind::Press {
                    continue;
                }
                match (k.modifiers, k.code) {
                    (_, KeyCode::Char('q')) | (KeyModifiers::CONTROL, KeyCode::Char('c')) => {
                        let _ = cmd_tx.send(UiCommand::Quit);
                        break Ok(());
                    }
                    (_, KeyCode::Char('r')) => {
                        state.begin_restart();
                        let _ = cmd_tx.send(UiCommand::Restart(state.selection));
                    }
                    (_, KeyCode::Char('m')) => state.toggle_mode(),
                    (_, KeyCode::Char(c @ '1'..='5')) => {
                        state.select_algorithm(c as usize - '1' as usize);
                    }
                    (_, KeyCode::Tab) => {
                        state.tab = (state.tab + 1) % 2;
                    }
                    (_, KeyCode::Char('?')) => {
                        state.tab = 1;
                    }
                    _ => {}
                }
            }
        }
    };

    disable_raw_mode().ok();
    let mut stdout = io::stdout();
    execute!(stdout, LeaveAlternateScreen).ok();
    res
}

fn apply_event(state: &mut UiState, ev: SessionEvent) {
    match ev {
        SessionEvent::Started {
            session,
            mode,
            input,
            lanes,
        } => {
            state.start_session(session, mode, input.len(), lanes);
        }
        SessionEvent::StartFailed { error, .. } => {
            state.lanes.clear();
            state.info = format!("Could not start: {error}");
        }
        SessionEvent::Info(InfoEvent::SessionStarted { mode, len }) => {
            state.info = format!("{} on {len} element(s)", mode_label(mode));
        }
        SessionEvent::Info(info) => {
            state.info = info.to_message();
        }
        SessionEvent::SingleCompleted { session, result } => {
            if session != state.session {
                return;
            }
            state.info = format!(
                "{} took: {}. Press r to run again",
                result.algorithm,
                fmt_ms(result.duration)
            );
            state.single_result = Some(*result);
        }
        SessionEvent::RaceCompleted {
            session,
            leaderboard,
        } => {
            if session != state.session {
                return;
            }
            state.info = match leaderboard.winner() {
                Some(w) => format!(
                    "{} wins in {}. Press r to race again",
                    w.algorithm,
                    fmt_ms(w.duration)
                ),
                None => "Race finished".into(),
            };
            state.leaderboard = Some(leaderboard);
        }
    }
}

fn mode_label(mode: Mode) -> &'static str {
    match mode {
        Mode::Single => "Single run",
        Mode::Race => "Race",
    }
}

fn draw(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)].as_ref())
        .split(area);

    let tabs = Tabs::new(vec![Line::from("Visualizer"), Line::from("Help")])
        .select(state.tab)
        .block(Block::default().borders(Borders::ALL).title("sort-race-cli"))
        .highlight_style(Style::default().fg(Color::Yellow));
    f.render_widget(tabs, chunks[0]);

    match state.tab {
        0 => draw_visualizer(chunks[1], f, state),
        _ => help::draw_help(chunks[1], f),
    }
}

fn draw_visualizer(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(6), Constraint::Length(9)].as_ref())
        .split(area);

    draw_lanes(rows[0], f, state);

    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)].as_ref())
        .split(rows[1]);
    draw_status(bottom[0], f, state);
    draw_results(bottom[1], f, state);
}

fn draw_lanes(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    if state.lanes.is_empty() {
        let p = Paragraph::new("No session running. Press r to start.")
            .block(Block::default().borders(Borders::ALL).title("Lanes"));
        f.render_widget(p, area);
        return;
    }

    let n = state.lanes.len() as u32;
    // Side by side while each lane keeps a usable width, stacked otherwise.
    let direction = if area.width / n as u16 >= 24 {
        Direction::Horizontal
    } else {
        Direction::Vertical
    };
    let constraints: Vec<Constraint> = (0..n).map(|_| Constraint::Ratio(1, n)).collect();
    let cells = Layout::default()
        .direction(direction)
        .constraints(constraints)
        .split(area);

    for (lane, cell) in state.lanes.iter().zip(cells.iter()) {
        bars::draw_lane(f, *cell, lane);
    }
}

fn draw_status(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let mut lines = vec![
        Line::from(vec![
            Span::styled("Mode: ", Style::default().fg(Color::Gray)),
            Span::styled(mode_label(state.mode), Style::default().fg(Color::Cyan)),
        ]),
        Line::from(vec![
            Span::styled("Next: ", Style::default().fg(Color::Gray)),
            Span::raw(state.selection_label()),
        ]),
        Line::from(vec![
            Span::styled("Elements: ", Style::default().fg(Color::Gray)),
            Span::raw(state.input_len.to_string()),
            Span::styled("  Step delay: ", Style::default().fg(Color::Gray)),
            Span::raw(fmt_ms(state.step_delay)),
        ]),
    ];
    if state.session != 0 && !state.is_finished() {
        lines.push(Line::from(vec![
            Span::styled("Elapsed: ", Style::default().fg(Color::Gray)),
            Span::raw(format!("{:.1}s", state.session_start.elapsed().as_secs_f64())),
            Span::styled("  Running: ", Style::default().fg(Color::Gray)),
            Span::raw(format!("{}/{}", state.running_lanes(), state.lanes.len())),
        ]));
    }
    push_wrapped_status_kv(&mut lines, "Info", &state.info, area.width);

    let p = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Status"));
    f.render_widget(p, area);
}

fn draw_results(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let lines: Vec<Line> = if let Some(board) = state.leaderboard.as_ref() {
        leaderboard_lines(board)
            .into_iter()
            .enumerate()
            .map(|(i, l)| {
                // Line 0 is the heading, line 1 the winner.
                let style = match i {
                    0 => Style::default().fg(Color::Gray),
                    1 => Style::default().fg(Color::Green),
                    _ => Style::default(),
                };
                Line::from(Span::styled(l, style))
            })
            .collect()
    } else if let Some(result) = state.single_result.as_ref() {
        single_lines(result).into_iter().map(Line::from).collect()
    } else {
        state
            .lanes
            .iter()
            .map(|lane| {
                let frame = lane.frame();
                Line::from(vec![
                    Span::styled(
                        format!("{:<15}", lane.kind().display_name()),
                        Style::default().fg(Color::Yellow),
                    ),
                    Span::raw(fmt_values(&frame.values)),
                ])
            })
            .collect()
    };

    let p = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title("Results"));
    f.render_widget(p, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        AlgorithmKind, ArraySource, Leaderboard, RunResult, Selection,
    };

    fn state() -> UiState {
        UiState::new(&SessionConfig {
            source: ArraySource::Explicit(vec![2, 1]),
            selection: Selection {
                mode: Mode::Single,
                algorithm: Some(AlgorithmKind::Bubble),
            },
            step_delay: Duration::from_millis(150),
            poll_interval: Duration::from_millis(100),
        })
    }

    fn result(kind: AlgorithmKind) -> RunResult {
        RunResult {
            algorithm: kind,
            duration: Duration::from_millis(300),
            frames: 2,
            sorted: vec![1, 2],
        }
    }

    #[test]
    fn completion_for_current_session_is_shown() {
        let mut s = state();
        apply_event(
            &mut s,
            SessionEvent::Started {
                session: 1,
                mode: Mode::Single,
                input: vec![2, 1],
                lanes: Vec::new(),
            },
        );
        apply_event(
            &mut s,
            SessionEvent::SingleCompleted {
                session: 1,
                result: Box::new(result(AlgorithmKind::Bubble)),
            },
        );
        assert_eq!(s.input_len, 2);
        assert!(s.single_result.is_some());
        assert!(s.info.contains("Bubble Sort took: 300 ms"), "{}", s.info);
    }

    #[test]
    fn completion_after_restart_request_is_ignored() {
        let mut s = state();
        apply_event(
            &mut s,
            SessionEvent::Started {
                session: 1,
                mode: Mode::Race,
                input: vec![2, 1],
                lanes: Vec::new(),
            },
        );
        s.begin_restart();
        apply_event(
            &mut s,
            SessionEvent::RaceCompleted {
                session: 1,
                leaderboard: Leaderboard::from_results(vec![result(AlgorithmKind::Quick)]),
            },
        );
        assert!(s.leaderboard.is_none());
    }

    #[test]
    fn start_failure_clears_lanes_and_reports() {
        let mut s = state();
        apply_event(
            &mut s,
            SessionEvent::StartFailed {
                session: 2,
                error: "bad array".into(),
            },
        );
        assert!(s.lanes.is_empty());
        assert_eq!(s.info, "Could not start: bad array");
    }
}
