//! Move-resolution helpers that only need read access to the grid.

use super::grid::Grid;
use super::state::{Cell, Direction};

/// Processing order along one axis.
///
/// Ascending by default, reversed when the vector points towards the far
/// edge so the tiles closest to the target edge are resolved first.
pub(crate) fn build_traversal(len: usize, component: i32) -> Vec<i32> {
    let mut order: Vec<i32> = (0..len as i32).collect();
    if component == 1 {
        order.reverse();
    }
    order
}

/// Step from `cell` along `vector` while the next cell is in bounds and empty.
///
/// Returns `(farthest, next)`: the last empty cell reached (or `cell` itself)
/// and the cell just beyond it, which may be occupied or out of bounds.
pub(crate) fn find_farthest_position(grid: &Grid, cell: Cell, vector: Cell) -> (Cell, Cell) {
    let mut previous;
    let mut next = cell;
    loop {
        previous = next;
        next = previous + vector;
        if !(grid.is_within_bounds(next) && grid.is_available(next)) {
            break;
        }
    }
    (previous, next)
}

/// True if any two 4-neighbour tiles share a value.
pub(crate) fn tile_matches_available(grid: &Grid) -> bool {
    grid.iter().any(|(cell, tile)| {
        Direction::ALL.iter().any(|dir| {
            grid.content_at(cell + dir.vector())
                .is_some_and(|other| other.value() == tile.value())
        })
    })
}

/// True if some move could still change the grid.
pub(crate) fn moves_available(grid: &Grid) -> bool {
    grid.cells_available() || tile_matches_available(grid)
}
