pub mod canvas;
pub mod tabs;

use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::app::{App, Tab};

pub fn render(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Tab bar
            Constraint::Min(0),    // Canvas
            Constraint::Length(1), // Status
            Constraint::Length(1), // Help
        ])
        .split(frame.area());

    tabs::render_tabs(frame, app, chunks[0]);
    render_canvas(frame, app, chunks[1]);
    render_status(frame, app, chunks[2]);
    render_help(frame, app, chunks[3]);
}

fn render_canvas(frame: &mut Frame, app: &mut App, area: Rect) {
    let (title, accent) = match app.current_tab() {
        Tab::Game(kind) => {
            let score = app.selector.score().unwrap_or(0);
            (format!("{}· {} ", kind.title(), score), Color::Rgb(106, 169, 255))
        }
        Tab::Stop => (" Idle ".to_string(), Color::Rgb(60, 60, 80)),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(accent))
        .title(title)
        .title_style(Style::default().fg(accent).add_modifier(Modifier::BOLD));

    let inner = block.inner(area);
    frame.render_widget(block, area);
    app.canvas_area = inner;

    let lines = canvas::render_canvas(
        &app.selector.host().canvas,
        inner.width as usize,
        inner.height as usize,
    );
    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_status(frame: &mut Frame, app: &App, area: Rect) {
    let status = Line::from(vec![
        Span::styled(" ▶ ", Style::default().fg(Color::Rgb(255, 220, 80))),
        Span::styled(
            app.selector.host().status.clone(),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ),
    ]);
    frame.render_widget(Paragraph::new(status), area);
}

fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let key = Style::default().fg(Color::Rgb(80, 200, 255));
    let sep = Style::default().fg(Color::Rgb(60, 60, 60));
    let text = Style::default().fg(Color::DarkGray);

    let mut spans = vec![
        Span::styled(" 1/2/3 ", key),
        Span::styled("Play ", text),
        Span::styled("│ ", sep),
        Span::styled("Tab ", key),
        Span::styled("Next ", text),
        Span::styled("│ ", sep),
        Span::styled("Esc ", key),
        Span::styled("Stop ", text),
        Span::styled("│ ", sep),
    ];
    if app.selector.is_running() {
        spans.push(Span::styled("Ctrl+C ", key));
    } else {
        spans.push(Span::styled("Q ", key));
    }
    spans.push(Span::styled("Quit", text));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
