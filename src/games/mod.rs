pub mod breakout;
pub mod game2048;
pub mod grid;
pub mod snake;

use crossterm::event::KeyEvent;
use rand::rngs::StdRng;
use rand::SeedableRng;
use strum_macros::{Display, EnumIter, EnumString};

use crate::config::Config;
use crate::host::Host;
use crate::scheduler::TaskId;

use self::breakout::Breakout;
use self::game2048::Game2048;
use self::snake::Snake;

/// Lifecycle shared by every game.
///
/// `start` builds fresh state, attaches listeners and schedules the loop.
/// `stop` cancels every token the game holds and clears the canvas before it
/// returns; calling it twice is harmless. Win and loss conditions end in the
/// same `stop`.
pub trait Game {
    fn kind(&self) -> GameKind;
    fn start(&mut self, host: &mut Host);
    fn stop(&mut self, host: &mut Host);
    /// A timer or frame token owned by this game came due.
    fn wake(&mut self, _task: TaskId, _host: &mut Host) {}
    fn handle_input(&mut self, key: KeyEvent, host: &mut Host);
    /// Pointer moved to canvas x coordinate `x`.
    fn pointer(&mut self, _x: f32, _host: &mut Host) {}
    fn get_score(&self) -> u32;
    fn is_running(&self) -> bool;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, EnumString, Display)]
#[strum(serialize_all = "snake_case")]
pub enum GameKind {
    Snake,
    Breakout,
    #[strum(to_string = "2048")]
    Game2048,
}

impl GameKind {
    pub fn title(&self) -> &'static str {
        match self {
            GameKind::Snake => " Snake ",
            GameKind::Breakout => " Breakout ",
            GameKind::Game2048 => " 2048 ",
        }
    }

    /// Build a fresh, stopped instance.
    pub fn create(&self, config: &Config, seed: Option<u64>) -> Box<dyn Game> {
        let rng = seeded_rng(seed);
        match self {
            GameKind::Snake => Box::new(Snake::new(&config.snake, rng)),
            GameKind::Breakout => Box::new(Breakout::new(&config.breakout)),
            GameKind::Game2048 => Box::new(Game2048::new(&config.game2048, rng)),
        }
    }
}

pub fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}
