use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Runtime settings, loaded from a TOML file. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Fixed RNG seed, mostly useful for reproducing a session.
    pub seed: Option<u64>,
    pub canvas: CanvasConfig,
    pub timing: TimingConfig,
    pub snake: SnakeConfig,
    pub breakout: BreakoutConfig,
    pub game2048: Game2048Config,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct CanvasConfig {
    pub width: f32,
    pub height: f32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 960.0,
            height: 540.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct TimingConfig {
    /// Length of one animation frame
    pub frame_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self { frame_ms: 16 }
    }
}

impl TimingConfig {
    pub fn frame(&self) -> Duration {
        Duration::from_millis(self.frame_ms)
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SnakeConfig {
    /// Size of one grid cell in canvas units
    pub cell: f32,
    pub tick_ms: u64,
}

impl Default for SnakeConfig {
    fn default() -> Self {
        Self {
            cell: 20.0,
            tick_ms: 110,
        }
    }
}

impl SnakeConfig {
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct BreakoutConfig {
    pub lives: u32,
}

impl Default for BreakoutConfig {
    fn default() -> Self {
        Self { lives: 3 }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Game2048Config {
    pub size: usize,
}

impl Default for Game2048Config {
    fn default() -> Self {
        Self { size: 4 }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    pub file: PathBuf,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            file: std::env::temp_dir().join("minicade.log"),
        }
    }
}

/// Smallest snake grid the starting body fits in with room to move.
const MIN_SNAKE_CELLS: f32 = 8.0;
/// Keeps `cols * rows` well inside `i32`.
const MAX_SNAKE_CELLS: f32 = 4096.0;
/// Breakout needs the centred brick wall to fit.
const MIN_BREAKOUT_WIDTH: f32 = 880.0;
const MIN_BREAKOUT_HEIGHT: f32 = 300.0;

impl Config {
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Config::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Config, ConfigError> {
        let config: Config = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::Invalid(msg));

        if self.timing.frame_ms == 0 {
            return invalid("timing.frame_ms must be positive".into());
        }
        if self.snake.tick_ms == 0 {
            return invalid("snake.tick_ms must be positive".into());
        }
        if !self.snake.cell.is_finite() || self.snake.cell <= 0.0 {
            return invalid("snake.cell must be positive".into());
        }
        if !self.canvas.width.is_finite() || !self.canvas.height.is_finite() {
            return invalid(format!(
                "canvas size must be finite, got {}x{}",
                self.canvas.width, self.canvas.height
            ));
        }
        if self.canvas.width < MIN_BREAKOUT_WIDTH || self.canvas.height < MIN_BREAKOUT_HEIGHT {
            return invalid(format!(
                "canvas must be at least {MIN_BREAKOUT_WIDTH}x{MIN_BREAKOUT_HEIGHT}, got {}x{}",
                self.canvas.width, self.canvas.height
            ));
        }
        let cols = (self.canvas.width / self.snake.cell).floor();
        let rows = (self.canvas.height / self.snake.cell).floor();
        if cols < MIN_SNAKE_CELLS || rows < MIN_SNAKE_CELLS {
            return invalid(format!(
                "snake grid of {cols}x{rows} cells is too small, need at least {MIN_SNAKE_CELLS} per side"
            ));
        }
        if cols > MAX_SNAKE_CELLS || rows > MAX_SNAKE_CELLS {
            return invalid(format!(
                "snake grid of {cols}x{rows} cells is too large, at most {MAX_SNAKE_CELLS} per side"
            ));
        }
        if self.breakout.lives == 0 {
            return invalid("breakout.lives must be at least 1".into());
        }
        if self.game2048.size < 2 {
            return invalid("game2048.size must be at least 2".into());
        }
        Ok(())
    }
}
