use std::fmt;
use std::ops::Add;

use serde::{Deserialize, Serialize};

/// An integer coordinate pair. Doubles as a unit vector for directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Cell { x, y }
    }
}

impl Add for Cell {
    type Output = Cell;

    #[inline]
    fn add(self, rhs: Cell) -> Cell {
        Cell::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A direction to slide/merge tiles. Discriminants are the input codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Direction {
    Up = 0,
    Right = 1,
    Down = 2,
    Left = 3,
}

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("invalid direction code {0}; expected 0 (up), 1 (right), 2 (down) or 3 (left)")]
pub struct InvalidDirection(pub u8);

impl Direction {
    /// All directions in code order.
    pub const ALL: [Direction; 4] = [Direction::Up, Direction::Right, Direction::Down, Direction::Left];

    /// Unit vector for this direction. Up is towards row 0.
    #[inline]
    pub const fn vector(self) -> Cell {
        const VECTORS: [Cell; 4] = [Cell::new(0, -1), Cell::new(1, 0), Cell::new(0, 1), Cell::new(-1, 0)];
        VECTORS[self as usize]
    }

    #[inline]
    pub const fn code(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for Direction {
    type Error = InvalidDirection;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Direction::Up),
            1 => Ok(Direction::Right),
            2 => Ok(Direction::Down),
            3 => Ok(Direction::Left),
            other => Err(InvalidDirection(other)),
        }
    }
}

/// A numbered game piece bound to a cell.
///
/// `merged_from` holds the cells of the two tiles that produced this one and
/// is only meaningful during the move that created it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    cell: Cell,
    value: u32,
    merged_from: Option<[Cell; 2]>,
}

impl Tile {
    pub fn new(cell: Cell, value: u32) -> Self {
        Tile { cell, value, merged_from: None }
    }

    #[inline]
    pub fn cell(&self) -> Cell { self.cell }

    #[inline]
    pub fn x(&self) -> i32 { self.cell.x }

    #[inline]
    pub fn y(&self) -> i32 { self.cell.y }

    #[inline]
    pub fn value(&self) -> u32 { self.value }

    #[inline]
    pub fn merged_from(&self) -> Option<[Cell; 2]> { self.merged_from }

    pub(crate) fn set_merged_from(&mut self, sources: Option<[Cell; 2]>) {
        self.merged_from = sources;
    }

    pub(crate) fn update_position(&mut self, cell: Cell) {
        self.cell = cell;
    }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.value, self.cell)
    }
}

/// Coarse view of [`GameState`] for matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Playing, either fresh or continuing after a win.
    Normal,
    Won,
    Lost,
}

/// Terminal-state counter, stored as its persisted integer code.
///
/// `0` is a fresh game and `-1` is lost. Positive odd values mean the game
/// has just been won; continuing bumps the counter to the next even value,
/// so the counter only ever grows while the player keeps winning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct GameState(i32);

impl GameState {
    pub const NORMAL: GameState = GameState(0);
    pub const LOST: GameState = GameState(-1);

    /// Highest code a game can reach: 32 wins, each continued.
    pub const MAX_CODE: i32 = 64;

    /// Accepts any code the game itself can produce (`-1..=MAX_CODE`).
    pub fn from_code(code: i32) -> Option<Self> {
        (-1..=Self::MAX_CODE).contains(&code).then_some(GameState(code))
    }

    #[inline]
    pub fn code(self) -> i32 { self.0 }

    #[inline]
    pub fn is_won(self) -> bool { self.0 > 0 && self.0 % 2 != 0 }

    #[inline]
    pub fn is_lost(self) -> bool { self == GameState::LOST }

    /// Whether moves are accepted.
    #[inline]
    pub fn is_active(self) -> bool { !(self.is_won() || self.is_lost()) }

    /// Number of wins recorded so far (including a current, unacknowledged one).
    pub fn wins(self) -> u32 {
        if self.0 > 0 { (self.0 as u32 + 1) / 2 } else { 0 }
    }

    pub fn status(self) -> Status {
        if self.is_lost() {
            Status::Lost
        } else if self.is_won() {
            Status::Won
        } else {
            Status::Normal
        }
    }

    pub(crate) fn record_win(&mut self) {
        debug_assert!(self.is_active());
        self.0 = self.0.saturating_add(1);
    }

    pub(crate) fn record_loss(&mut self) {
        *self = GameState::LOST;
    }

    /// Move from won to continuing. Returns false when not currently won.
    pub(crate) fn resume(&mut self) -> bool {
        if !self.is_won() || self.0 >= Self::MAX_CODE {
            return false;
        }
        self.0 += 1;
        true
    }
}
