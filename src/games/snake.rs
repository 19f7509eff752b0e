use std::collections::VecDeque;
use std::time::Duration;

use crossterm::event::KeyEvent;
use rand::rngs::StdRng;
use rand::Rng;
use ratatui::style::Color;

use crate::config::SnakeConfig;
use crate::games::grid::{Direction, GridPos};
use crate::games::{Game, GameKind};
use crate::host::Host;
use crate::scheduler::{Input, ListenerId, TaskId};

const START_BODY: [GridPos; 3] = [GridPos::new(5, 5), GridPos::new(4, 5), GridPos::new(3, 5)];

const GRID_COLOR: Color = Color::Rgb(40, 44, 60);
const FOOD_COLOR: Color = Color::Rgb(255, 106, 162);
const BODY_COLOR: Color = Color::Rgb(106, 169, 255);
const HEAD_COLOR: Color = Color::Rgb(160, 200, 255);

/// Result of one movement step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Moved,
    Ate,
    /// Hit a wall or its own body; nothing was mutated.
    Crashed,
    /// Ate the last free cell.
    Filled,
}

/// Per-session snake state.
#[derive(Debug, Clone)]
struct Field {
    cols: i32,
    rows: i32,
    // Head first
    body: VecDeque<GridPos>,
    heading: Direction,
    queued: Direction,
    food: GridPos,
    score: u32,
}

impl Field {
    fn new(cols: i32, rows: i32, rng: &mut StdRng) -> Self {
        let mut field = Self {
            cols,
            rows,
            body: START_BODY.into_iter().collect(),
            heading: Direction::Right,
            queued: Direction::Right,
            food: GridPos::new(0, 0),
            score: 0,
        };
        field.food = field.sample_food(rng);
        field
    }

    fn head(&self) -> GridPos {
        self.body[0]
    }

    fn in_bounds(&self, p: GridPos) -> bool {
        p.col >= 0 && p.row >= 0 && p.col < self.cols && p.row < self.rows
    }

    fn free_cells(&self) -> usize {
        (self.cols * self.rows) as usize - self.body.len()
    }

    /// Queue the heading for the next step. Turning straight back onto the
    /// neck is rejected; the check is against the heading of the last move so
    /// two quick presses inside one tick cannot reverse either.
    fn steer(&mut self, dir: Direction) -> bool {
        if dir == self.heading.opposite() {
            return false;
        }
        self.queued = dir;
        true
    }

    /// Uniform over cells not covered by the body. Caller guarantees at least
    /// one free cell.
    fn sample_food(&self, rng: &mut StdRng) -> GridPos {
        loop {
            let p = GridPos::new(rng.gen_range(0..self.cols), rng.gen_range(0..self.rows));
            if !self.body.contains(&p) {
                return p;
            }
        }
    }

    fn step(&mut self, rng: &mut StdRng) -> Step {
        self.heading = self.queued;
        let next = self.head().step(self.heading);

        if !self.in_bounds(next) || self.body.contains(&next) {
            return Step::Crashed;
        }

        self.body.push_front(next);

        if next == self.food {
            self.score += 1;
            if self.free_cells() == 0 {
                return Step::Filled;
            }
            self.food = self.sample_food(rng);
            Step::Ate
        } else {
            self.body.pop_back();
            Step::Moved
        }
    }
}

pub struct Snake {
    cell: f32,
    tick: Duration,
    rng: StdRng,
    field: Option<Field>,
    score: u32,
    timer: Option<TaskId>,
    keys: Option<ListenerId>,
}

impl Snake {
    pub fn new(config: &SnakeConfig, rng: StdRng) -> Self {
        Self {
            cell: config.cell,
            tick: config.tick(),
            rng,
            field: None,
            score: 0,
            timer: None,
            keys: None,
        }
    }

    fn on_tick(&mut self, host: &mut Host) {
        let Some(field) = self.field.as_mut() else {
            return;
        };

        let step = field.step(&mut self.rng);
        self.score = field.score;
        match step {
            Step::Crashed => {
                log::info!("snake crashed with score {}", self.score);
                host.set_status(format!(
                    "Game over! Score: {} (pick a game to play again)",
                    self.score
                ));
                self.stop(host);
            }
            Step::Filled => {
                log::info!("snake filled the board with score {}", self.score);
                host.set_status(format!(
                    "Board filled, you win! Score: {} (pick a game to play again)",
                    self.score
                ));
                self.stop(host);
            }
            Step::Moved | Step::Ate => self.draw(host),
        }
    }

    fn draw(&self, host: &mut Host) {
        let Some(field) = self.field.as_ref() else {
            return;
        };
        let canvas = &mut host.canvas;
        let c = self.cell;

        canvas.clear();
        canvas.grid(c, GRID_COLOR);
        canvas.fill_rect(field.food.col as f32 * c, field.food.row as f32 * c, c, c, FOOD_COLOR);
        for (i, seg) in field.body.iter().enumerate() {
            let color = if i == 0 { HEAD_COLOR } else { BODY_COLOR };
            canvas.fill_rect(seg.col as f32 * c, seg.row as f32 * c, c, c, color);
        }

        host.set_status(format!(
            "Snake: arrow keys / WASD to steer. Score: {}",
            field.score
        ));
    }
}

impl Game for Snake {
    fn kind(&self) -> GameKind {
        GameKind::Snake
    }

    fn start(&mut self, host: &mut Host) {
        self.stop(host);

        let cols = (host.canvas.width() / self.cell).floor() as i32;
        let rows = (host.canvas.height() / self.cell).floor() as i32;
        self.field = Some(Field::new(cols, rows, &mut self.rng));
        self.score = 0;

        self.keys = Some(host.scheduler.listen(Input::Key));
        self.timer = Some(host.scheduler.every(self.tick));
        log::debug!("snake started on a {cols}x{rows} grid");

        self.draw(host);
    }

    fn stop(&mut self, host: &mut Host) {
        if let Some(timer) = self.timer.take() {
            host.scheduler.cancel(timer);
        }
        if let Some(keys) = self.keys.take() {
            host.scheduler.unlisten(keys);
        }
        self.field = None;
        host.canvas.clear();
    }

    fn wake(&mut self, task: TaskId, host: &mut Host) {
        if self.timer == Some(task) {
            self.on_tick(host);
        }
    }

    fn handle_input(&mut self, key: KeyEvent, _host: &mut Host) {
        let Some(field) = self.field.as_mut() else {
            return;
        };
        if let Some(dir) = Direction::from_key(&key) {
            field.steer(dir);
        }
    }

    fn get_score(&self) -> u32 {
        self.score
    }

    fn is_running(&self) -> bool {
        self.field.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Shape;
    use crate::games::seeded_rng;
    use crossterm::event::{KeyCode, KeyModifiers};

    fn field(cols: i32, rows: i32, body: &[(i32, i32)], heading: Direction, food: (i32, i32)) -> Field {
        Field {
            cols,
            rows,
            body: body.iter().map(|&(c, r)| GridPos::new(c, r)).collect(),
            heading,
            queued: heading,
            food: GridPos::new(food.0, food.1),
            score: 0,
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn plain_move_keeps_length() {
        let mut rng = seeded_rng(Some(1));
        let mut f = field(10, 10, &[(5, 5), (4, 5), (3, 5)], Direction::Right, (0, 0));
        assert_eq!(f.step(&mut rng), Step::Moved);
        assert_eq!(f.body.len(), 3);
        assert_eq!(f.head(), GridPos::new(6, 5));
        assert_eq!(f.score, 0);
    }

    #[test]
    fn eating_grows_by_one() {
        let mut rng = seeded_rng(Some(2));
        let mut f = field(10, 10, &[(5, 5), (4, 5), (3, 5)], Direction::Right, (6, 5));
        assert_eq!(f.step(&mut rng), Step::Ate);
        assert_eq!(f.body.len(), 4);
        assert_eq!(f.score, 1);
        assert_eq!(*f.body.back().unwrap(), GridPos::new(3, 5));
        assert!(!f.body.contains(&f.food));
    }

    #[test]
    fn length_invariant_over_many_moves() {
        let mut rng = seeded_rng(Some(3));
        let mut f = Field::new(20, 20, &mut rng);
        // Walk a rectangle that never crosses itself.
        let route = [Direction::Down, Direction::Right, Direction::Up, Direction::Right];
        let mut len = f.body.len();
        let mut score = 0;
        for i in 0..40 {
            f.steer(route[(i / 3) % route.len()]);
            match f.step(&mut rng) {
                Step::Moved => assert_eq!(f.body.len(), len),
                Step::Ate => {
                    assert_eq!(f.body.len(), len + 1);
                    assert_eq!(f.score, score + 1);
                }
                Step::Crashed | Step::Filled => break,
            }
            len = f.body.len();
            score = f.score;
        }
    }

    #[test]
    fn wall_collision() {
        let mut rng = seeded_rng(Some(4));
        let mut f = field(10, 10, &[(9, 2), (8, 2), (7, 2)], Direction::Right, (0, 0));
        let before = f.body.clone();
        assert_eq!(f.step(&mut rng), Step::Crashed);
        assert_eq!(f.body, before);

        let mut f = field(10, 10, &[(4, 0), (4, 1), (4, 2)], Direction::Up, (0, 0));
        assert_eq!(f.step(&mut rng), Step::Crashed);
    }

    #[test]
    fn self_collision() {
        let mut rng = seeded_rng(Some(5));
        // Head at (5,5) turning down into (5,6) which is part of the body.
        let body = [(5, 5), (6, 5), (6, 6), (5, 6), (4, 6)];
        let mut f = field(10, 10, &body, Direction::Left, (0, 0));
        assert!(f.steer(Direction::Down));
        assert_eq!(f.step(&mut rng), Step::Crashed);
    }

    #[test]
    fn moving_into_the_tail_cell_is_a_collision() {
        let mut rng = seeded_rng(Some(6));
        // A 2x2 loop: next head is the current tail.
        let body = [(5, 5), (5, 6), (4, 6), (4, 5)];
        let mut f = field(10, 10, &body, Direction::Up, (0, 0));
        assert!(f.steer(Direction::Left));
        assert_eq!(f.step(&mut rng), Step::Crashed);
    }

    #[test]
    fn no_reversal() {
        let mut rng = seeded_rng(Some(7));
        let mut f = field(10, 10, &[(5, 5), (4, 5), (3, 5)], Direction::Right, (0, 0));
        assert!(!f.steer(Direction::Left));
        // Up then Left within one tick must not reverse either.
        assert!(f.steer(Direction::Up));
        assert!(!f.steer(Direction::Left));
        assert_eq!(f.step(&mut rng), Step::Moved);
        assert_eq!(f.head(), GridPos::new(5, 4));
        assert!(f.steer(Direction::Left));
    }

    #[test]
    fn food_never_spawns_on_body() {
        let mut rng = seeded_rng(Some(8));
        // 3x3 grid with a single free cell at (2,2).
        let body = [(0, 0), (1, 0), (2, 0), (2, 1), (1, 1), (0, 1), (0, 2), (1, 2)];
        let f = field(3, 3, &body, Direction::Down, (2, 2));
        for _ in 0..50 {
            assert_eq!(f.sample_food(&mut rng), GridPos::new(2, 2));
        }

        let mut rng = seeded_rng(Some(9));
        for _ in 0..50 {
            let f = Field::new(8, 8, &mut rng);
            assert!(!f.body.contains(&f.food));
        }
    }

    #[test]
    fn eating_the_last_cell_fills_the_board() {
        let mut rng = seeded_rng(Some(10));
        let body = [(1, 2), (0, 2), (0, 1), (1, 1), (2, 1), (2, 0), (1, 0), (0, 0)];
        let mut f = field(3, 3, &body, Direction::Right, (2, 2));
        assert_eq!(f.step(&mut rng), Step::Filled);
        assert_eq!(f.body.len(), 9);
        assert_eq!(f.score, 1);
    }

    #[test]
    fn lifecycle_registers_and_releases_tokens() {
        let mut host = Host::new(200.0, 200.0);
        let mut snake = Snake::new(&SnakeConfig::default(), seeded_rng(Some(11)));

        snake.start(&mut host);
        assert!(snake.is_running());
        assert_eq!(host.scheduler.task_count(), 1);
        assert!(host.scheduler.is_listening(Input::Key));
        assert!(host
            .canvas
            .shapes()
            .iter()
            .any(|s| matches!(s, Shape::Grid { .. })));

        snake.stop(&mut host);
        assert!(!snake.is_running());
        assert_eq!(host.scheduler.task_count(), 0);
        assert_eq!(host.scheduler.listener_count(), 0);
        assert!(host.canvas.is_blank());
    }

    #[test]
    fn ticks_until_the_wall() {
        let config = SnakeConfig::default();
        let mut host = Host::new(200.0, 200.0);
        let mut snake = Snake::new(&config, seeded_rng(Some(12)));
        snake.start(&mut host);
        snake.handle_input(key(KeyCode::Up), &mut host);

        // Head starts on row 5 heading up: five steps to row 0, the sixth crashes.
        for _ in 0..20 {
            for task in host.scheduler.advance(config.tick()) {
                if host.scheduler.claim(task) {
                    snake.wake(task, &mut host);
                }
            }
            if !snake.is_running() {
                break;
            }
        }
        assert!(!snake.is_running());
        assert!(host.status.starts_with("Game over!"));
        assert_eq!(host.scheduler.task_count(), 0);
        assert!(host.canvas.is_blank());
    }
}
