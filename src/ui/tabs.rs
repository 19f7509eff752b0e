use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::app::{App, Tab};

const PLAYING: Color = Color::Rgb(255, 220, 80);
const FINISHED: Color = Color::Rgb(255, 160, 80);
const IDLE_GAME: Color = Color::Rgb(120, 120, 140);
const STOP: Color = Color::Rgb(255, 90, 90);
const STOP_DIM: Color = Color::Rgb(120, 60, 60);

/// Style of one tab label. A selected game that already ended is shown in a
/// different colour from one still running.
fn tab_style(tab: Tab, current: Tab, running: bool) -> Style {
    let selected = tab == current;
    match tab {
        Tab::Game(_) if selected && running => {
            Style::default().fg(PLAYING).add_modifier(Modifier::BOLD)
        }
        Tab::Game(_) if selected => Style::default().fg(FINISHED).add_modifier(Modifier::BOLD),
        Tab::Game(_) => Style::default().fg(IDLE_GAME),
        Tab::Stop if selected => Style::default().fg(STOP).add_modifier(Modifier::BOLD),
        Tab::Stop => Style::default().fg(STOP_DIM),
    }
}

fn tab_label(tab: Tab, position: usize) -> String {
    match tab {
        Tab::Game(_) => format!("[{}]{}", position + 1, tab.title()),
        Tab::Stop => format!("[Esc]{}", tab.title()),
    }
}

pub fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let current = app.current_tab();
    let running = app.selector.is_running();

    let titles: Vec<Line> = Tab::all()
        .into_iter()
        .enumerate()
        .map(|(i, t)| {
            Line::from(Span::styled(
                tab_label(t, i),
                tab_style(t, current, running),
            ))
        })
        .collect();

    let border = match current {
        Tab::Game(_) => Color::Rgb(60, 150, 200),
        Tab::Stop => STOP_DIM,
    };

    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border))
                .border_type(BorderType::Rounded)
                .title(" 🕹 minicade ")
                .title_style(
                    Style::default()
                        .fg(Color::Rgb(200, 120, 255))
                        .add_modifier(Modifier::BOLD),
                ),
        )
        .select(current.index())
        .highlight_style(tab_style(current, current, running))
        .divider(Span::styled(" │ ", Style::default().fg(Color::Rgb(60, 60, 80))));

    frame.render_widget(tabs, area);
}
