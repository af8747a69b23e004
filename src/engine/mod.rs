//! Rule engine: cells, tiles, the grid and move resolution.
//!
//! [`Game`] owns the single live [`Grid`] and its animation bookkeeping.
//! A move walks the grid in an order that puts the tiles nearest the target
//! edge first, so each tile takes part in at most one merge per move.
//!
//! Example
//! ```
//! use merge_2048::engine::{Direction, Game};
//!
//! let mut game: Game = Game::with_seed(Default::default(), Default::default(), 7);
//! for code in [0u8, 1, 2, 3] {
//!     game.make_move_code(code);
//! }
//! assert!(game.grid().iter().all(|(cell, tile)| cell == tile.cell()));
//! assert_eq!(Direction::try_from(2).unwrap(), Direction::Down);
//! ```

mod game;
mod grid;
mod ops;
mod state;

pub use game::{Game, MoveOutcome};
pub use grid::{Grid, GridError};
pub use state::{Cell, Direction, GameState, InvalidDirection, Status, Tile};
