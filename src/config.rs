//! Gameplay and animation-timing knobs.
//!
//! Defaults reproduce the reference game: two start tiles, spawned tiles of
//! value 2, a win at 2048 and a 100 ms base animation unit. A config can be
//! loaded from TOML; every field is optional and falls back to its default.
//!
//! ```
//! use merge_2048::config::GameConfig;
//! let cfg: GameConfig = toml::from_str("win_value = 512").unwrap();
//! assert_eq!(cfg.win_value, 512);
//! assert_eq!(cfg.start_tiles, 2);
//! ```

use std::io::{self, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Board side length. Fixed; the game has no configurable board sizes.
pub const BOARD_SIZE: usize = 4;

/// Largest tile a saved game or config may carry: the best a 4x4 board can
/// reach with spawns of 2 and 4.
pub const MAX_TILE_VALUE: u32 = 1 << 17;

/// Constant acceleration of the merge "pop" curve.
pub const MERGING_ACCELERATION: f64 = -0.5;

/// Initial velocity of the merge "pop" curve, chosen so the curve overshoots
/// and settles slightly above full size.
pub const INITIAL_VELOCITY: f64 = (1.0 - MERGING_ACCELERATION) / 4.0;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("toml parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Timing of every animation the game schedules, derived from one base unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimationTiming {
    /// Base animation unit in nanoseconds.
    #[serde(default = "defaults::base_nanos")]
    pub base_nanos: u64,
}

impl Default for AnimationTiming {
    fn default() -> Self {
        Self { base_nanos: defaults::base_nanos() }
    }
}

impl AnimationTiming {
    pub const fn move_duration(&self) -> u64 { self.base_nanos }

    pub const fn spawn_duration(&self) -> u64 { self.base_nanos }

    /// Spawned tiles pop in once the slides of the same turn have finished.
    pub const fn spawn_delay(&self) -> u64 { self.move_duration() }

    pub const fn merge_duration(&self) -> u64 { self.base_nanos }

    /// The merge pulse starts exactly when the slide into the target ends.
    pub const fn merge_delay(&self) -> u64 { self.move_duration() }

    pub const fn fade_duration(&self) -> u64 { self.base_nanos.saturating_mul(5) }

    pub const fn fade_delay(&self) -> u64 { self.move_duration().saturating_add(self.spawn_duration()) }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Number of random tiles placed by `Game::new_game`.
    #[serde(default = "defaults::start_tiles")]
    pub start_tiles: usize,
    /// Value of every spawned tile, 2 or 4.
    #[serde(default = "defaults::spawn_value")]
    pub spawn_value: u32,
    /// First win threshold. Each win taken with `continue_playing` doubles it.
    #[serde(default = "defaults::win_value")]
    pub win_value: u32,
    #[serde(default)]
    pub timing: AnimationTiming,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            start_tiles: defaults::start_tiles(),
            spawn_value: defaults::spawn_value(),
            win_value: defaults::win_value(),
            timing: AnimationTiming::default(),
        }
    }
}

impl GameConfig {
    pub fn from_toml<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut file = std::fs::File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;
        let config: GameConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the engine cannot play with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !matches!(self.spawn_value, 2 | 4) {
            return Err(ConfigError::Invalid(format!("spawn_value {} must be 2 or 4", self.spawn_value)));
        }
        if !self.win_value.is_power_of_two() || self.win_value <= self.spawn_value || self.win_value > MAX_TILE_VALUE {
            return Err(ConfigError::Invalid(format!(
                "win_value {} must be a power of two above spawn_value and at most {MAX_TILE_VALUE}",
                self.win_value
            )));
        }
        if self.start_tiles > BOARD_SIZE * BOARD_SIZE {
            return Err(ConfigError::Invalid(format!(
                "start_tiles {} exceeds the {} cells of the board",
                self.start_tiles,
                BOARD_SIZE * BOARD_SIZE
            )));
        }
        if self.timing.base_nanos == 0 || self.timing.base_nanos > u64::MAX / 5 {
            return Err(ConfigError::Invalid(format!("base_nanos {} is out of range", self.timing.base_nanos)));
        }
        Ok(())
    }
}

mod defaults {
    pub fn base_nanos() -> u64 { 100_000_000 }
    pub fn start_tiles() -> usize { 2 }
    pub fn spawn_value() -> u32 { 2 }
    pub fn win_value() -> u32 { 2048 }
}
