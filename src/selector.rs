use std::time::Duration;

use crossterm::event::KeyEvent;

use crate::config::Config;
use crate::games::{Game, GameKind};
use crate::host::Host;
use crate::scheduler::Input;

pub const IDLE_PROMPT: &str = "Stopped. Pick a game to start.";

/// Owns at most one game and the host it draws on.
pub struct Selector {
    config: Config,
    host: Host,
    active: Option<Box<dyn Game>>,
    sessions: u64,
}

impl Selector {
    pub fn new(config: Config) -> Self {
        let mut host = Host::new(config.canvas.width, config.canvas.height);
        host.set_status(IDLE_PROMPT);
        Self {
            config,
            host,
            active: None,
            sessions: 0,
        }
    }

    pub fn host(&self) -> &Host {
        &self.host
    }

    /// Kind of the selected game, whether or not it is still running.
    pub fn active(&self) -> Option<GameKind> {
        self.active.as_ref().map(|g| g.kind())
    }

    pub fn is_running(&self) -> bool {
        self.active.as_ref().is_some_and(|g| g.is_running())
    }

    pub fn score(&self) -> Option<u32> {
        self.active.as_ref().map(|g| g.get_score())
    }

    /// Start a fresh `kind`, stopping whatever was selected first.
    pub fn start(&mut self, kind: GameKind) {
        // Each session gets its own stream when a seed is configured.
        let seed = self.config.seed.map(|s| s.wrapping_add(self.sessions));
        self.sessions += 1;
        let game = kind.create(&self.config, seed);
        self.launch(game);
    }

    pub fn launch(&mut self, mut game: Box<dyn Game>) {
        if let Some(mut prev) = self.active.take() {
            log::info!("stopping {} before switching", prev.kind());
            prev.stop(&mut self.host);
            log::debug!(
                "{} tasks and {} listeners left after stop",
                self.host.scheduler.task_count(),
                self.host.scheduler.listener_count()
            );
        }

        log::info!("starting {}", game.kind());
        game.start(&mut self.host);
        self.active = Some(game);
    }

    /// Stop the active game and clear the selection.
    pub fn stop(&mut self) {
        if let Some(mut game) = self.active.take() {
            log::info!("stopping {} with score {}", game.kind(), game.get_score());
            game.stop(&mut self.host);
        }
        self.host.canvas.clear();
        self.host.set_status(IDLE_PROMPT);
    }

    /// Advance the clock and deliver due timers and frames.
    pub fn tick(&mut self, elapsed: Duration) {
        let due = self.host.scheduler.advance(elapsed);
        let Some(game) = self.active.as_mut() else {
            return;
        };
        for task in due {
            // An earlier callback in this batch may have cancelled it.
            if self.host.scheduler.claim(task) {
                game.wake(task, &mut self.host);
            }
        }
    }

    /// Forward a key if the game is listening. Returns whether it was taken.
    pub fn key(&mut self, key: KeyEvent) -> bool {
        if !self.host.scheduler.is_listening(Input::Key) {
            return false;
        }
        match self.active.as_mut() {
            Some(game) => {
                game.handle_input(key, &mut self.host);
                true
            }
            None => false,
        }
    }

    /// Forward a pointer position in canvas units if the game is listening.
    pub fn pointer(&mut self, x: f32) {
        if !self.host.scheduler.is_listening(Input::Pointer) {
            return;
        }
        if let Some(game) = self.active.as_mut() {
            game.pointer(x, &mut self.host);
        }
    }
}
