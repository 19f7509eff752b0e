use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use strum::IntoEnumIterator;

use crate::config::Config;
use crate::games::GameKind;
use crate::selector::Selector;

/// One trigger in the tab bar.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Tab {
    Game(GameKind),
    Stop,
}

impl Tab {
    pub fn all() -> Vec<Tab> {
        GameKind::iter()
            .map(Tab::Game)
            .chain(std::iter::once(Tab::Stop))
            .collect()
    }

    pub fn title(&self) -> &'static str {
        match self {
            Tab::Game(kind) => kind.title(),
            Tab::Stop => " Stop ",
        }
    }

    pub fn index(&self) -> usize {
        Tab::all().iter().position(|t| t == self).unwrap_or(0)
    }
}

pub struct App {
    pub should_quit: bool,
    pub selector: Selector,
    /// Terminal area the canvas was last drawn into, for pointer mapping.
    pub canvas_area: Rect,
}

impl App {
    pub fn new(config: Config) -> Self {
        Self {
            should_quit: false,
            selector: Selector::new(config),
            canvas_area: Rect::default(),
        }
    }

    pub fn current_tab(&self) -> Tab {
        match self.selector.active() {
            Some(kind) => Tab::Game(kind),
            None => Tab::Stop,
        }
    }

    pub fn on_tick(&mut self, elapsed: Duration) {
        self.selector.tick(elapsed);
    }

    pub fn on_key(&mut self, key: KeyEvent) {
        // Ctrl+C always quits
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        // Global keys
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') if !self.selector.is_running() => {
                self.should_quit = true;
                return;
            }
            KeyCode::Char('1') => {
                self.selector.start(GameKind::Snake);
                return;
            }
            KeyCode::Char('2') => {
                self.selector.start(GameKind::Breakout);
                return;
            }
            KeyCode::Char('3') => {
                self.selector.start(GameKind::Game2048);
                return;
            }
            KeyCode::Char('0') | KeyCode::Esc => {
                self.selector.stop();
                return;
            }
            KeyCode::Tab => {
                if key.modifiers.contains(KeyModifiers::SHIFT) {
                    self.prev_game();
                } else {
                    self.next_game();
                }
                return;
            }
            KeyCode::BackTab => {
                self.prev_game();
                return;
            }
            _ => {}
        }

        // Forward to active game
        self.selector.key(key);
    }

    pub fn on_mouse(&mut self, mouse: MouseEvent) {
        if !matches!(
            mouse.kind,
            MouseEventKind::Moved | MouseEventKind::Drag(_) | MouseEventKind::Down(_)
        ) {
            return;
        }
        if let Some(x) = self.canvas_x(mouse.column, mouse.row) {
            self.selector.pointer(x);
        }
    }

    /// Map a terminal cell to a canvas x coordinate, using the cell centre.
    fn canvas_x(&self, column: u16, row: u16) -> Option<f32> {
        let area = self.canvas_area;
        if area.width == 0 || row < area.y || row >= area.y + area.height {
            return None;
        }
        let col = column.clamp(area.x, area.x + area.width - 1) - area.x;
        let width = self.selector.host().canvas.width();
        Some((col as f32 + 0.5) / area.width as f32 * width)
    }

    fn next_game(&mut self) {
        let kinds: Vec<GameKind> = GameKind::iter().collect();
        let next = match self.selector.active() {
            Some(kind) => {
                let idx = kinds.iter().position(|k| *k == kind).unwrap_or(0);
                kinds[(idx + 1) % kinds.len()]
            }
            None => kinds[0],
        };
        self.selector.start(next);
    }

    fn prev_game(&mut self) {
        let kinds: Vec<GameKind> = GameKind::iter().collect();
        let prev = match self.selector.active() {
            Some(kind) => {
                let idx = kinds.iter().position(|k| *k == kind).unwrap_or(0);
                kinds[(idx + kinds.len() - 1) % kinds.len()]
            }
            None => kinds[kinds.len() - 1],
        };
        self.selector.start(prev);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(app: &mut App, code: KeyCode) {
        app.on_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn app() -> App {
        App::new(Config {
            seed: Some(5),
            ..Config::default()
        })
    }

    #[test]
    fn number_keys_start_games() {
        let mut app = app();
        assert_eq!(app.current_tab(), Tab::Stop);
        press(&mut app, KeyCode::Char('2'));
        assert_eq!(app.current_tab(), Tab::Game(GameKind::Breakout));
        press(&mut app, KeyCode::Char('3'));
        assert_eq!(app.current_tab(), Tab::Game(GameKind::Game2048));
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.current_tab(), Tab::Stop);
        assert!(!app.should_quit);
    }

    #[test]
    fn tab_cycles_through_games() {
        let mut app = app();
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.selector.active(), Some(GameKind::Snake));
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.selector.active(), Some(GameKind::Breakout));
        press(&mut app, KeyCode::BackTab);
        assert_eq!(app.selector.active(), Some(GameKind::Snake));
        press(&mut app, KeyCode::BackTab);
        assert_eq!(app.selector.active(), Some(GameKind::Game2048));
    }

    #[test]
    fn q_only_quits_when_idle() {
        let mut app = app();
        press(&mut app, KeyCode::Char('1'));
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.should_quit);
        press(&mut app, KeyCode::Char('0'));
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }

    #[test]
    fn ctrl_c_quits_anywhere() {
        let mut app = app();
        press(&mut app, KeyCode::Char('1'));
        app.on_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit);
    }

    #[test]
    fn pointer_maps_into_canvas_units() {
        let mut app = app();
        app.canvas_area = Rect::new(10, 5, 96, 20);
        let width = app.selector.host().canvas.width();

        let x = app.canvas_x(10, 6).unwrap();
        assert!((x - 0.5 / 96.0 * width).abs() < 1e-3);
        let x = app.canvas_x(105, 6).unwrap();
        assert!((x - 95.5 / 96.0 * width).abs() < 1e-3);
        // Left of the area clamps to the first column.
        assert_eq!(app.canvas_x(0, 6), app.canvas_x(10, 6));
        assert_eq!(app.canvas_x(20, 4), None);
        assert_eq!(app.canvas_x(20, 25), None);
    }

    #[test]
    fn tabs_list_games_then_stop() {
        let titles: Vec<&str> = Tab::all().iter().map(|t| t.title()).collect();
        assert_eq!(titles, [" Snake ", " Breakout ", " 2048 ", " Stop "]);
        assert_eq!(Tab::Stop.index(), 3);
    }
}
