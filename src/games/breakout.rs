use crossterm::event::{KeyCode, KeyEvent};
use ratatui::style::Color;

use crate::config::BreakoutConfig;
use crate::games::{Game, GameKind};
use crate::host::Host;
use crate::scheduler::{Input, ListenerId, TaskId};

const BRICK_ROWS: usize = 5;
const BRICKS_PER_ROW: usize = 10;
const BRICK_WIDTH: f32 = 78.0;
const BRICK_HEIGHT: f32 = 18.0;
const BRICK_PAD: f32 = 10.0;
const BRICK_TOP: f32 = 50.0;

const PADDLE_WIDTH: f32 = 120.0;
const PADDLE_HEIGHT: f32 = 14.0;
// Distance from the bottom edge to the paddle top
const PADDLE_LIFT: f32 = 28.0;
const PADDLE_STEP: f32 = 40.0;

const BALL_RADIUS: f32 = 8.0;
const BALL_SPEED: f32 = 4.0;
const BALL_LIFT: f32 = 60.0;
// Horizontal speed when the ball hits the very edge of the paddle
const MAX_BOUNCE_DX: f32 = 6.0;

const BRICK_COLORS: [Color; BRICK_ROWS] = [
    Color::Rgb(220, 50, 50),
    Color::Rgb(220, 130, 30),
    Color::Rgb(220, 200, 30),
    Color::Rgb(50, 200, 50),
    Color::Rgb(50, 130, 220),
];
const PADDLE_COLOR: Color = Color::Rgb(180, 200, 255);
const BALL_COLOR: Color = Color::Rgb(255, 159, 210);

#[derive(Debug, Clone)]
struct Brick {
    x: f32,
    y: f32,
    alive: bool,
    color: Color,
}

#[derive(Debug, Clone)]
struct Paddle {
    x: f32,
    y: f32,
    w: f32,
    h: f32,
}

#[derive(Debug, Clone)]
struct Ball {
    x: f32,
    y: f32,
    r: f32,
    dx: f32,
    dy: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Playing,
    BallLost,
    GameOver,
    Cleared,
}

/// Per-session Breakout state.
#[derive(Debug, Clone)]
struct Field {
    width: f32,
    height: f32,
    paddle: Paddle,
    ball: Ball,
    bricks: Vec<Brick>,
    score: u32,
    lives: u32,
}

impl Field {
    fn new(width: f32, height: f32, lives: u32) -> Self {
        let mut f = Self {
            width,
            height,
            paddle: Paddle {
                x: (width - PADDLE_WIDTH) / 2.0,
                y: height - PADDLE_LIFT,
                w: PADDLE_WIDTH,
                h: PADDLE_HEIGHT,
            },
            ball: Self::serve(width, height),
            bricks: Vec::new(),
            score: 0,
            lives,
        };
        f.init_bricks();
        f
    }

    fn serve(width: f32, height: f32) -> Ball {
        Ball {
            x: width / 2.0,
            y: height - BALL_LIFT,
            r: BALL_RADIUS,
            dx: BALL_SPEED,
            dy: -BALL_SPEED,
        }
    }

    fn init_bricks(&mut self) {
        self.bricks.clear();
        let wall = BRICKS_PER_ROW as f32 * (BRICK_WIDTH + BRICK_PAD) - BRICK_PAD;
        let left = ((self.width - wall) / 2.0).max(0.0);

        for row in 0..BRICK_ROWS {
            for col in 0..BRICKS_PER_ROW {
                self.bricks.push(Brick {
                    x: left + col as f32 * (BRICK_WIDTH + BRICK_PAD),
                    y: BRICK_TOP + row as f32 * (BRICK_HEIGHT + BRICK_PAD),
                    alive: true,
                    color: BRICK_COLORS[row % BRICK_COLORS.len()],
                });
            }
        }
    }

    fn bricks_left(&self) -> usize {
        self.bricks.iter().filter(|b| b.alive).count()
    }

    /// Centre the paddle on `x`, keeping it fully on the canvas.
    fn move_paddle_to(&mut self, x: f32) {
        let max_x = self.width - self.paddle.w;
        self.paddle.x = (x - self.paddle.w / 2.0).clamp(0.0, max_x);
    }

    fn nudge_paddle(&mut self, dx: f32) {
        let centre = self.paddle.x + self.paddle.w / 2.0;
        self.move_paddle_to(centre + dx);
    }

    fn update(&mut self) -> Outcome {
        let b = &mut self.ball;
        b.x += b.dx;
        b.y += b.dy;

        // Walls
        if b.x - b.r < 0.0 {
            b.dx = b.dx.abs();
        } else if b.x + b.r > self.width {
            b.dx = -b.dx.abs();
        }
        if b.y - b.r < 0.0 {
            b.dy = b.dy.abs();
        }

        // Paddle
        let p = &self.paddle;
        if b.y + b.r >= p.y && b.y + b.r <= p.y + p.h && b.x >= p.x && b.x <= p.x + p.w {
            b.dy = -b.dy.abs();
            let hit = (b.x - (p.x + p.w / 2.0)) / (p.w / 2.0);
            b.dx = hit * MAX_BOUNCE_DX;
        }

        // Bricks: the ball centre must be inside the brick's horizontal span,
        // vertically the ball's extent is used. At most one brick per frame.
        let hit = self.bricks.iter().position(|br| {
            br.alive
                && b.x > br.x
                && b.x < br.x + BRICK_WIDTH
                && b.y - b.r < br.y + BRICK_HEIGHT
                && b.y + b.r > br.y
        });
        if let Some(idx) = hit {
            self.bricks[idx].alive = false;
            b.dy = -b.dy;
            self.score += 1;
        }

        // Fell off the bottom
        if b.y - b.r > self.height {
            self.lives = self.lives.saturating_sub(1);
            if self.lives == 0 {
                return Outcome::GameOver;
            }
            self.ball = Self::serve(self.width, self.height);
            return Outcome::BallLost;
        }

        if self.bricks.iter().all(|br| !br.alive) {
            return Outcome::Cleared;
        }

        Outcome::Playing
    }
}

pub struct Breakout {
    lives: u32,
    field: Option<Field>,
    score: u32,
    frame: Option<TaskId>,
    keys: Option<ListenerId>,
    pointer: Option<ListenerId>,
}

impl Breakout {
    pub fn new(config: &BreakoutConfig) -> Self {
        Self {
            lives: config.lives,
            field: None,
            score: 0,
            frame: None,
            keys: None,
            pointer: None,
        }
    }

    fn on_frame(&mut self, host: &mut Host) {
        let Some(field) = self.field.as_mut() else {
            return;
        };

        let outcome = field.update();
        self.score = field.score;
        match outcome {
            Outcome::GameOver => {
                log::info!("breakout lost with score {}", self.score);
                host.set_status(format!(
                    "Game over! Score: {} (pick a game to play again)",
                    self.score
                ));
                self.stop(host);
                return;
            }
            Outcome::Cleared => {
                log::info!("breakout cleared with score {}", self.score);
                host.set_status(format!(
                    "You win! Score: {} (pick a game to play again)",
                    self.score
                ));
                self.stop(host);
                return;
            }
            Outcome::BallLost => log::debug!("breakout ball lost, {} lives left", field.lives),
            Outcome::Playing => {}
        }

        host.set_status(format!(
            "Breakout: mouse or arrow keys move the paddle. Score: {}  Lives: {}",
            field.score, field.lives
        ));
        self.draw(host);
        self.frame = Some(host.scheduler.request_frame());
    }

    fn draw(&self, host: &mut Host) {
        let Some(field) = self.field.as_ref() else {
            return;
        };
        let canvas = &mut host.canvas;
        canvas.clear();

        for brick in field.bricks.iter().filter(|b| b.alive) {
            canvas.fill_rect(brick.x, brick.y, BRICK_WIDTH, BRICK_HEIGHT, brick.color);
        }

        let p = &field.paddle;
        canvas.fill_rect(p.x, p.y, p.w, p.h, PADDLE_COLOR);

        let b = &field.ball;
        canvas.fill_circle(b.x, b.y, b.r, BALL_COLOR);
    }
}

impl Game for Breakout {
    fn kind(&self) -> GameKind {
        GameKind::Breakout
    }

    fn start(&mut self, host: &mut Host) {
        self.stop(host);

        let (w, h) = (host.canvas.width(), host.canvas.height());
        self.field = Some(Field::new(w, h, self.lives));
        self.score = 0;

        self.pointer = Some(host.scheduler.listen(Input::Pointer));
        self.keys = Some(host.scheduler.listen(Input::Key));
        host.set_status("Breakout: mouse or arrow keys move the paddle.");
        log::debug!("breakout started on a {w}x{h} canvas");

        self.on_frame(host);
    }

    fn stop(&mut self, host: &mut Host) {
        if let Some(frame) = self.frame.take() {
            host.scheduler.cancel(frame);
        }
        if let Some(pointer) = self.pointer.take() {
            host.scheduler.unlisten(pointer);
        }
        if let Some(keys) = self.keys.take() {
            host.scheduler.unlisten(keys);
        }
        self.field = None;
        host.canvas.clear();
    }

    fn wake(&mut self, task: TaskId, host: &mut Host) {
        if self.frame == Some(task) {
            self.frame = None;
            self.on_frame(host);
        }
    }

    fn handle_input(&mut self, key: KeyEvent, _host: &mut Host) {
        let Some(field) = self.field.as_mut() else {
            return;
        };
        match key.code {
            KeyCode::Left => field.nudge_paddle(-PADDLE_STEP),
            KeyCode::Right => field.nudge_paddle(PADDLE_STEP),
            _ => {}
        }
    }

    fn pointer(&mut self, x: f32, _host: &mut Host) {
        if let Some(field) = self.field.as_mut() {
            field.move_paddle_to(x);
        }
    }

    fn get_score(&self) -> u32 {
        self.score
    }

    fn is_running(&self) -> bool {
        self.field.is_some()
    }
}
