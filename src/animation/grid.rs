use super::{merge_scale, AnimationCell, AnimationKind, TileVisual};
use crate::engine::Cell;

/// Per-cell and board-wide animation bookkeeping.
///
/// Entries are kept in insertion order and never reordered. `now` only moves
/// forward, through [`AnimationGrid::tick_all`].
#[derive(Debug, Clone)]
pub struct AnimationGrid {
    width: usize,
    height: usize,
    now: u64,
    cells: Vec<Vec<AnimationCell>>,
    global: Vec<AnimationCell>,
}

impl AnimationGrid {
    pub fn new(width: usize, height: usize) -> Self {
        AnimationGrid { width, height, now: 0, cells: vec![Vec::new(); width * height], global: Vec::new() }
    }

    /// Current animation clock in nanoseconds.
    #[inline]
    pub fn now(&self) -> u64 { self.now }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height {
            Some(y as usize * self.width + x as usize)
        } else {
            None
        }
    }

    /// Schedule an animation starting now.
    ///
    /// `(-1, -1)` addresses the board-wide list. Entries on one cell add up;
    /// a merge leaves both a move and a merge entry on its target.
    pub fn start_animation(&mut self, x: i32, y: i32, kind: AnimationKind, duration: u64, delay: u64) {
        let animation = AnimationCell::new(kind, self.now, duration, delay);
        if x == -1 && y == -1 {
            self.global.push(animation);
            return;
        }
        match self.index(x, y) {
            Some(idx) => self.cells[idx].push(animation),
            None => log::warn!("dropping {kind:?} animation for out-of-bounds cell ({x}, {y})"),
        }
    }

    /// Schedule a board-wide animation starting now.
    pub fn start_global(&mut self, kind: AnimationKind, duration: u64, delay: u64) {
        self.start_animation(-1, -1, kind, duration, delay);
    }

    /// Live entries for a cell, oldest first. Empty for out-of-bounds cells.
    pub fn animations_at(&self, x: i32, y: i32) -> &[AnimationCell] {
        match self.index(x, y) {
            Some(idx) => &self.cells[idx],
            None => &[],
        }
    }

    pub fn global_animations(&self) -> &[AnimationCell] {
        &self.global
    }

    /// True while any entry has not run its full delay + duration.
    ///
    /// Retained global fades stop counting once they finish, so the renderer
    /// can stop requesting frames.
    pub fn is_animation_active(&self) -> bool {
        let now = self.now;
        self.global.iter().chain(self.cells.iter().flatten()).any(|a| !a.is_expired(now))
    }

    /// Advance the clock and drop finished per-cell entries.
    ///
    /// Global fades are kept so the end-of-game overlay holds its final alpha.
    pub fn tick_all(&mut self, elapsed_nanos: u64) {
        self.now = self.now.saturating_add(elapsed_nanos);
        let now = self.now;
        for list in &mut self.cells {
            list.retain(|a| !a.is_expired(now));
        }
        self.global.retain(|a| a.kind() == AnimationKind::GlobalFade || !a.is_expired(now));
    }

    /// Drop every per-cell and global entry immediately.
    pub fn cancel_animations(&mut self) {
        self.cells.iter_mut().for_each(Vec::clear);
        self.global.clear();
    }

    /// Resolve how the tile at `(x, y)` should be drawn right now.
    ///
    /// Entries are consulted newest first: a spawn entry wins outright (hidden
    /// during its delay), otherwise the newest active merge or move entry
    /// decides. Anything else draws the tile at rest.
    pub fn visual_at(&self, x: i32, y: i32) -> TileVisual {
        let entries = self.animations_at(x, y);
        let now = self.now;
        let pre_merge = entries.iter().any(|a| a.kind() == AnimationKind::Merge);
        for animation in entries.iter().rev() {
            match animation.kind() {
                AnimationKind::Spawn => {
                    if animation.is_pending(now) {
                        return TileVisual::Hidden;
                    }
                    if animation.is_active(now) {
                        return TileVisual::Scale(animation.percentage_done(now));
                    }
                }
                AnimationKind::Merge if animation.is_active(now) => {
                    return TileVisual::Scale(merge_scale(animation.percentage_done(now)));
                }
                AnimationKind::Move { from } if animation.is_active(now) => {
                    let remaining = animation.percentage_done(now) - 1.0;
                    let here = Cell::new(x, y);
                    return TileVisual::Slide {
                        dx: (here.x - from.x) as f64 * remaining,
                        dy: (here.y - from.y) as f64 * remaining,
                        pre_merge,
                    };
                }
                _ => {}
            }
        }
        TileVisual::Static
    }

    /// Alpha of the end-of-game overlay: progress of the newest global fade,
    /// or fully opaque when none is scheduled.
    pub fn fade_alpha(&self) -> f64 {
        self.global
            .iter()
            .rev()
            .find(|a| a.kind() == AnimationKind::GlobalFade)
            .map_or(1.0, |a| a.percentage_done(self.now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minus_one_pair_goes_global() {
        let mut grid = AnimationGrid::new(4, 4);
        grid.start_animation(-1, -1, AnimationKind::GlobalFade, 500, 200);
        grid.start_animation(1, 2, AnimationKind::Spawn, 100, 100);
        assert_eq!(grid.global_animations().len(), 1);
        assert_eq!(grid.animations_at(1, 2).len(), 1);
        assert!(grid.animations_at(0, 0).is_empty());
        assert!(grid.animations_at(-1, -1).is_empty());
    }

    #[test]
    fn entries_on_one_cell_are_additive_and_ordered() {
        let mut grid = AnimationGrid::new(4, 4);
        let from = Cell::new(0, 0);
        grid.start_animation(3, 0, AnimationKind::Move { from }, 100, 0);
        grid.start_animation(3, 0, AnimationKind::Merge, 100, 100);
        let kinds: Vec<_> = grid.animations_at(3, 0).iter().map(AnimationCell::kind).collect();
        assert_eq!(kinds, vec![AnimationKind::Move { from }, AnimationKind::Merge]);
    }

    #[test]
    fn tick_prunes_cells_but_keeps_global_fade() {
        let mut grid = AnimationGrid::new(4, 4);
        grid.start_animation(0, 0, AnimationKind::Move { from: Cell::new(3, 0) }, 100, 0);
        grid.start_animation(0, 0, AnimationKind::Merge, 100, 100);
        grid.start_global(AnimationKind::GlobalFade, 500, 200);
        assert!(grid.is_animation_active());

        grid.tick_all(100);
        assert_eq!(grid.animations_at(0, 0).len(), 1);
        assert_eq!(grid.animations_at(0, 0)[0].kind(), AnimationKind::Merge);

        grid.tick_all(100);
        assert!(grid.animations_at(0, 0).is_empty());
        assert!(grid.is_animation_active());

        grid.tick_all(500);
        assert_eq!(grid.global_animations().len(), 1);
        assert!(!grid.is_animation_active());
        assert_eq!(grid.fade_alpha(), 1.0);
        assert_eq!(grid.now(), 700);
    }

    #[test]
    fn pending_entries_keep_the_grid_busy() {
        let mut grid = AnimationGrid::new(4, 4);
        grid.start_animation(2, 2, AnimationKind::Spawn, 100, 100);
        grid.tick_all(50);
        assert!(grid.is_animation_active());
        assert_eq!(grid.visual_at(2, 2), TileVisual::Hidden);
    }

    #[test]
    fn cancel_clears_everything() {
        let mut grid = AnimationGrid::new(4, 4);
        grid.start_animation(1, 1, AnimationKind::Spawn, 100, 0);
        grid.start_global(AnimationKind::GlobalFade, 500, 0);
        grid.cancel_animations();
        assert!(grid.animations_at(1, 1).is_empty());
        assert!(grid.global_animations().is_empty());
        assert!(!grid.is_animation_active());
    }

    #[test]
    fn spawn_visual_pops_in() {
        let mut grid = AnimationGrid::new(4, 4);
        grid.start_animation(0, 3, AnimationKind::Spawn, 100, 100);
        assert_eq!(grid.visual_at(0, 3), TileVisual::Hidden);
        grid.tick_all(150);
        assert_eq!(grid.visual_at(0, 3), TileVisual::Scale(0.5));
        grid.tick_all(50);
        assert_eq!(grid.visual_at(0, 3), TileVisual::Static);
    }

    #[test]
    fn merge_target_slides_then_pulses() {
        let mut grid = AnimationGrid::new(4, 4);
        grid.start_animation(3, 0, AnimationKind::Move { from: Cell::new(1, 0) }, 100, 0);
        grid.start_animation(3, 0, AnimationKind::Merge, 100, 100);

        grid.tick_all(50);
        assert_eq!(grid.visual_at(3, 0), TileVisual::Slide { dx: -1.0, dy: 0.0, pre_merge: true });

        grid.tick_all(100);
        assert_eq!(grid.visual_at(3, 0), TileVisual::Scale(merge_scale(0.5)));
    }

    #[test]
    fn plain_slide_reports_remaining_offset() {
        let mut grid = AnimationGrid::new(4, 4);
        grid.start_animation(0, 3, AnimationKind::Move { from: Cell::new(0, 0) }, 100, 0);
        assert_eq!(grid.visual_at(0, 3), TileVisual::Slide { dx: 0.0, dy: -3.0, pre_merge: false });
        grid.tick_all(75);
        assert_eq!(grid.visual_at(0, 3), TileVisual::Slide { dx: 0.0, dy: -0.75, pre_merge: false });
    }

    #[test]
    fn fade_alpha_tracks_latest_fade() {
        let mut grid = AnimationGrid::new(4, 4);
        assert_eq!(grid.fade_alpha(), 1.0);
        grid.start_global(AnimationKind::GlobalFade, 500, 200);
        assert_eq!(grid.fade_alpha(), 0.0);
        grid.tick_all(450);
        assert_eq!(grid.fade_alpha(), 0.5);
    }
}
