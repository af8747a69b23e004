use std::fmt;

use rand::Rng;

use super::state::{Cell, Tile};

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridError {
    #[error("no available cell: the grid is full")]
    NoAvailableCell,
}

/// Fixed-size matrix of tile slots.
///
/// Each slot owns at most one [`Tile`]. A tile's recorded cell always matches
/// the slot that holds it; coordinates outside the grid are never stored.
///
/// ```
/// use merge_2048::engine::{Cell, Grid, Tile};
/// let mut grid = Grid::new(4, 4);
/// grid.insert(Tile::new(Cell::new(1, 2), 2));
/// assert!(grid.is_occupied(Cell::new(1, 2)));
/// assert!(grid.is_available(Cell::new(0, 0)));
/// assert!(!grid.is_available(Cell::new(4, 0)));
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    slots: Vec<Option<Tile>>,
}

impl Grid {
    pub fn new(width: usize, height: usize) -> Self {
        Grid { width, height, slots: vec![None; width * height] }
    }

    #[inline]
    pub fn width(&self) -> usize { self.width }

    #[inline]
    pub fn height(&self) -> usize { self.height }

    #[inline]
    fn index(&self, cell: Cell) -> Option<usize> {
        if self.is_within_bounds(cell) {
            Some(cell.y as usize * self.width + cell.x as usize)
        } else {
            None
        }
    }

    #[inline]
    fn cell_at(&self, idx: usize) -> Cell {
        Cell::new((idx % self.width) as i32, (idx / self.width) as i32)
    }

    #[inline]
    pub fn is_within_bounds(&self, cell: Cell) -> bool {
        cell.x >= 0 && cell.y >= 0 && (cell.x as usize) < self.width && (cell.y as usize) < self.height
    }

    #[inline]
    pub fn is_occupied(&self, cell: Cell) -> bool {
        self.content_at(cell).is_some()
    }

    /// In bounds and empty.
    #[inline]
    pub fn is_available(&self, cell: Cell) -> bool {
        matches!(self.index(cell), Some(idx) if self.slots[idx].is_none())
    }

    /// True if at least one cell is empty.
    pub fn cells_available(&self) -> bool {
        self.slots.iter().any(Option::is_none)
    }

    /// Empty cells, column by column (x outer, y inner).
    pub fn available_cells(&self) -> Vec<Cell> {
        let mut cells = Vec::with_capacity(self.slots.len());
        for x in 0..self.width as i32 {
            for y in 0..self.height as i32 {
                let cell = Cell::new(x, y);
                if self.is_available(cell) {
                    cells.push(cell);
                }
            }
        }
        cells
    }

    /// Uniformly pick one empty cell using the provided RNG.
    ///
    /// Callers are expected to check [`Grid::cells_available`] first.
    pub fn random_available_cell<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Cell, GridError> {
        let cells = self.available_cells();
        if cells.is_empty() {
            return Err(GridError::NoAvailableCell);
        }
        Ok(cells[rng.gen_range(0..cells.len())])
    }

    /// Place `tile` at its own recorded cell, returning whatever occupied that slot.
    ///
    /// Panics if the tile's cell is outside the grid.
    pub fn insert(&mut self, tile: Tile) -> Option<Tile> {
        let idx = self
            .index(tile.cell())
            .unwrap_or_else(|| panic!("tile {tile} lies outside a {}x{} grid", self.width, self.height));
        self.slots[idx].replace(tile)
    }

    /// Clear the slot at `cell`, returning the tile that was there.
    pub fn remove(&mut self, cell: Cell) -> Option<Tile> {
        let idx = self.index(cell)?;
        self.slots[idx].take()
    }

    #[inline]
    pub fn content_at(&self, cell: Cell) -> Option<&Tile> {
        self.index(cell).and_then(|idx| self.slots[idx].as_ref())
    }

    /// Value at `cell`, 0 when empty or out of bounds.
    #[inline]
    pub fn value_at(&self, cell: Cell) -> u32 {
        self.content_at(cell).map_or(0, Tile::value)
    }

    /// Move the tile at `from` into the slot at `to`, keeping its cell in sync.
    pub(crate) fn move_tile(&mut self, from: Cell, to: Cell) {
        if from == to {
            return;
        }
        if let Some(mut tile) = self.remove(from) {
            tile.update_position(to);
            self.insert(tile);
        }
    }

    pub(crate) fn tiles_mut(&mut self) -> impl Iterator<Item = &mut Tile> {
        self.slots.iter_mut().flatten()
    }

    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = None);
    }

    /// Occupied slots in row-major order, paired with the slot's cell.
    pub fn iter(&self) -> impl Iterator<Item = (Cell, &Tile)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(idx, slot)| slot.as_ref().map(|tile| (self.cell_at(idx), tile)))
    }

    pub fn tile_count(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    /// Sum of all tile values.
    pub fn value_sum(&self) -> u64 {
        self.slots.iter().flatten().map(|t| t.value() as u64).sum()
    }

    pub fn highest_tile(&self) -> u32 {
        self.slots.iter().flatten().map(Tile::value).max().unwrap_or(0)
    }

    /// Per-cell values in row-major order, 0 for empty.
    pub fn values(&self) -> Vec<u32> {
        self.slots.iter().map(|slot| slot.as_ref().map_or(0, Tile::value)).collect()
    }

    /// Row `y` as values, 0 for empty.
    pub fn row(&self, y: usize) -> Vec<u32> {
        (0..self.width).map(|x| self.value_at(Cell::new(x as i32, y as i32))).collect()
    }
}

impl fmt::Debug for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Grid")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("values", &self.values())
            .finish()
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "-".repeat(self.width * 8);
        for y in 0..self.height {
            if y > 0 {
                writeln!(f, "{rule}")?;
            }
            let cells: Vec<String> = self.row(y).iter().map(|&v| format_val(v)).collect();
            writeln!(f, "{}", cells.join("|"))?;
        }
        Ok(())
    }
}

fn format_val(val: u32) -> String {
    match val {
        0 => " ".repeat(7),
        v => format!("{v:^7}"),
    }
}
