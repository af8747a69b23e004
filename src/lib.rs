//! merge-2048: rule engine and animation-timing model for a sliding-tile 2048 puzzle
//!
//! This crate provides:
//! - The board model and move resolution (`engine` module): slides, single merges per
//!   tile per move, random spawns, win/lose detection, turn and score bookkeeping
//! - A time-driven animation schedule (`animation` module) a renderer can query per cell
//! - A postcard save format and a personal-best persistence port (`serialization` module)
//! - Gameplay and timing settings loadable from TOML (`config` module)
//!
//! Quick start:
//! ```
//! use merge_2048::config::GameConfig;
//! use merge_2048::engine::{Direction, Game};
//! use merge_2048::serialization::MemoryStore;
//!
//! // Deterministic session with a seeded RNG
//! let mut game = Game::with_seed(GameConfig::default(), MemoryStore::new(), 42);
//! for dir in [Direction::Left, Direction::Up, Direction::Right, Direction::Down] {
//!     game.make_move(dir);
//!     // One 60 Hz frame
//!     game.tick(16_666_667);
//! }
//! assert!(game.grid().highest_tile() >= 2);
//! println!("{}", game.grid());
//! ```
//!
//! Note: the core never reads a clock. Callers pass elapsed nanoseconds to `Game::tick`
//! and read progress back through `AnimationGrid`.
//!
pub mod animation;
pub mod config;
pub mod engine;
pub mod serialization;
