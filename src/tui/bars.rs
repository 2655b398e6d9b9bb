use crate::orchestrator::{LaneView, RunStatus};
use crate::text_summary::fmt_ms;
use ratatui::{
    layout::{Alignment, Rect},
    style::Color,
    style::Style,
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Paragraph},
    Frame,
};

/// Bar width and gap that fit `n` bars into `width` columns. Gaps are dropped
/// first when space is tight; bars never go below one column.
pub fn bar_geometry(width: u16, n: usize) -> (u16, u16) {
    let n = u16::try_from(n.max(1)).unwrap_or(u16::MAX);
    let per_bar_with_gap = width.saturating_add(1) / n;
    if per_bar_with_gap >= 3 {
        (per_bar_with_gap - 1, 1)
    } else {
        ((width / n).max(1), 0)
    }
}

/// Bar height for `v`, shifted so the smallest value still shows one unit.
pub fn bar_height(v: i64, min: i64) -> u64 {
    let offset = if min < 1 { 1 - i128::from(min) } else { 0 };
    u64::try_from(i128::from(v) + offset).unwrap_or(u64::MAX)
}

fn lane_title(lane: &LaneView) -> Line<'static> {
    let (status, color) = match lane.status() {
        RunStatus::Complete => (
            lane.duration().map(fmt_ms).unwrap_or_default(),
            Color::Green,
        ),
        RunStatus::Running => (format!("step {}", lane.frames()), Color::Cyan),
        RunStatus::Cancelled => ("cancelled".to_string(), Color::Red),
        RunStatus::Idle => ("idle".to_string(), Color::Gray),
    };
    Line::from(vec![
        Span::styled(
            lane.kind().display_name(),
            Style::default().fg(Color::Yellow),
        ),
        Span::raw(" · "),
        Span::styled(status, Style::default().fg(color)),
    ])
}

/// Draw one lane's current frame as a bar chart.
pub fn draw_lane(f: &mut Frame, area: Rect, lane: &LaneView) {
    let block = Block::default().borders(Borders::ALL).title(lane_title(lane));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let frame = lane.frame();
    if frame.values.is_empty() {
        f.render_widget(
            Paragraph::new("(empty array)").alignment(Alignment::Center),
            inner,
        );
        return;
    }

    let min = frame.values.iter().copied().min().unwrap_or(0);
    let (bar_width, bar_gap) = bar_geometry(inner.width, frame.values.len());
    let done = lane.status() == RunStatus::Complete;

    let bars: Vec<Bar> = frame
        .values
        .iter()
        .enumerate()
        .map(|(i, &v)| {
            let color = if frame.highlight == Some(i) {
                Color::Yellow
            } else if done {
                Color::Green
            } else {
                Color::Gray
            };
            let label = if bar_width >= 3 { v.to_string() } else { String::new() };
            Bar::default()
                .value(bar_height(v, min))
                .text_value(label)
                .style(Style::default().fg(color))
                .value_style(Style::default().fg(Color::Black).bg(color))
        })
        .collect();

    let max = frame
        .values
        .iter()
        .map(|&v| bar_height(v, min))
        .max()
        .unwrap_or(1);

    let chart = BarChart::default()
        .data(BarGroup::default().bars(&bars))
        .bar_width(bar_width)
        .bar_gap(bar_gap)
        .max(max);
    f.render_widget(chart, inner);
}
