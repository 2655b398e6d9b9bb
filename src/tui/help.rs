use ratatui::{
    layout::Rect,
    style::Color,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

fn key_line(key: &'static str, pad: usize, what: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::raw("  "),
        Span::styled(key, Style::default().fg(Color::Magenta)),
        Span::raw(" ".repeat(pad)),
        Span::raw(what),
    ])
}

pub fn draw_help(area: Rect, f: &mut Frame) {
    let p = Paragraph::new(vec![
        Line::from("Keybinds:"),
        Line::from(vec![
            Span::raw("  "),
            Span::styled("q", Style::default().fg(Color::Magenta)),
            Span::raw(" / "),
            Span::styled("Ctrl-C", Style::default().fg(Color::Magenta)),
            Span::raw("  Quit (stops every running sort)"),
        ]),
        key_line("r", 11, "Restart with the selected mode and algorithm"),
        key_line("m", 11, "Toggle single / race mode"),
        key_line("1-5", 9, "Pick Bubble, Insertion, Selection, Merge or Quick Sort"),
        key_line("tab", 9, "Switch tabs"),
        key_line("?", 11, "Show this help"),
        Line::from(""),
        Line::from("Bars:"),
        Line::from(vec![
            Span::raw("  "),
            Span::styled("yellow", Style::default().fg(Color::Yellow)),
            Span::raw("      Position touched by the last step"),
        ]),
        Line::from(vec![
            Span::raw("  "),
            Span::styled("green", Style::default().fg(Color::Green)),
            Span::raw("       Lane finished"),
        ]),
        Line::from(""),
        Line::from("Selection changes apply on the next restart. A restart always"),
        Line::from("generates a new array unless --array or --seed was given."),
    ])
    .block(Block::default().borders(Borders::ALL).title("Help"));
    f.render_widget(p, area);
}
