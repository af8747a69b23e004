use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::MAX_TILE_VALUE;
use crate::engine::GameState;

/// Sentinel stored when no personal best has been recorded.
pub const NO_PERSONAL_BEST: &str = "N/A";

/// Persisted game layout.
///
/// `cells` holds one value per cell in row-major order, 0 for empty.
/// `moves` and `personal_best` keep their display strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedGame {
    pub width: u32,
    pub height: u32,
    pub cells: Vec<u32>,
    pub moves: String,
    pub personal_best: String,
    pub state: i32,
    pub score: u64,
}

#[derive(thiserror::Error, Debug)]
pub enum SerializationError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("postcard error: {0}")]
    Postcard(#[from] postcard::Error),
    #[error("board is {found_w}x{found_h}, expected {expected_w}x{expected_h}")]
    Dimensions { expected_w: usize, expected_h: usize, found_w: u32, found_h: u32 },
    #[error("expected {expected} cell values, found {found}")]
    CellCount { expected: usize, found: usize },
    #[error("cell ({x}, {y}) holds {value}, which is not a tile value")]
    TileValue { x: usize, y: usize, value: u32 },
    #[error("invalid move count {0:?}")]
    Moves(String),
    #[error("invalid personal best {0:?}")]
    PersonalBest(String),
    #[error("unknown game state code {0}")]
    State(i32),
}

/// Parsed, validated view of a [`SavedGame`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Checked {
    pub turns: u64,
    pub personal_best: Option<u64>,
    pub state: GameState,
}

impl SavedGame {
    /// Validate against a `width` x `height` board without touching any game.
    pub(crate) fn check(&self, width: usize, height: usize) -> Result<Checked, SerializationError> {
        if self.width as usize != width || self.height as usize != height {
            return Err(SerializationError::Dimensions {
                expected_w: width,
                expected_h: height,
                found_w: self.width,
                found_h: self.height,
            });
        }
        if self.cells.len() != width * height {
            return Err(SerializationError::CellCount { expected: width * height, found: self.cells.len() });
        }
        for (idx, &value) in self.cells.iter().enumerate() {
            if value != 0 && (value < 2 || !value.is_power_of_two() || value > MAX_TILE_VALUE) {
                return Err(SerializationError::TileValue { x: idx % width, y: idx / width, value });
            }
        }
        let turns = self.moves.trim().parse().map_err(|_| SerializationError::Moves(self.moves.clone()))?;
        let personal_best = parse_personal_best(&self.personal_best)?;
        let state = GameState::from_code(self.state).ok_or(SerializationError::State(self.state))?;
        Ok(Checked { turns, personal_best, state })
    }
}

pub(crate) fn parse_personal_best(text: &str) -> Result<Option<u64>, SerializationError> {
    let text = text.trim();
    if text == NO_PERSONAL_BEST {
        return Ok(None);
    }
    text.parse().map(Some).map_err(|_| SerializationError::PersonalBest(text.to_string()))
}

pub(crate) fn format_personal_best(best: Option<u64>) -> String {
    best.map_or_else(|| NO_PERSONAL_BEST.to_string(), |b| b.to_string())
}

/// Encode a saved game to postcard bytes.
pub fn to_postcard_bytes(saved: &SavedGame) -> Result<Vec<u8>, SerializationError> {
    Ok(postcard::to_allocvec(saved)?)
}

/// Decode a saved game from postcard bytes.
pub fn from_postcard_bytes(bytes: &[u8]) -> Result<SavedGame, SerializationError> {
    Ok(postcard::from_bytes(bytes)?)
}

pub fn write_to_path<P: AsRef<Path>>(path: P, saved: &SavedGame) -> Result<(), SerializationError> {
    let bytes = to_postcard_bytes(saved)?;
    fs::write(path, bytes)?;
    Ok(())
}

pub fn read_from_path<P: AsRef<Path>>(path: P) -> Result<SavedGame, SerializationError> {
    let bytes = fs::read(path)?;
    from_postcard_bytes(&bytes)
}
