//! The command output pane and the input line with its time field.

use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Widget};

use crate::app::TuiApp;

/// Renders the command output pane.
pub fn render_output(app: &TuiApp, area: Rect, buf: &mut Buffer) {
    if area.height == 0 {
        return;
    }
    let style = if app.state.output.starts_with("ERROR:") {
        Style::default().fg(Color::Red)
    } else {
        Style::default()
    };
    Paragraph::new(app.state.output.as_str())
        .style(style)
        .render(area, buf);
}

/// Renders the input line with the right-aligned time indicator.
pub fn render_input(app: &TuiApp, area: Rect, buf: &mut Buffer) {
    if area.height == 0 {
        return;
    }
    let time_field = app.time_field();
    let time_width = (time_field.len() as u16 + 2).min(area.width);
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(10), Constraint::Length(time_width)])
        .split(area);

    let prompt = Line::from(vec![
        Span::styled("> ", Style::default().fg(Color::Green)),
        Span::raw(app.state.input.as_str()),
        Span::styled("█", Style::default().fg(Color::Green)),
    ]);
    Paragraph::new(prompt).render(chunks[0], buf);

    Paragraph::new(time_field)
        .style(Style::default().fg(Color::White).bg(Color::Magenta))
        .render(chunks[1], buf);
}
