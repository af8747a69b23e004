//! Animation-scheduling model for the renderer.
//!
//! Every transition is an [`AnimationCell`]: a kind, an absolute start time,
//! a duration and a pre-delay, all in nanoseconds. Progress is a pure
//! function of the caller-supplied `now`; nothing here reads a clock.
//! [`AnimationGrid`] owns the live entries and advances `now` on each tick.
//!
//! ```
//! use merge_2048::animation::{AnimationCell, AnimationKind};
//! let a = AnimationCell::new(AnimationKind::Merge, 1_000, 100, 50);
//! assert_eq!(a.percentage_done(1_020), 0.0); // still in the delay window
//! assert!(a.is_pending(1_020));
//! assert_eq!(a.percentage_done(1_100), 0.5);
//! assert!(a.is_active(1_100));
//! assert!(a.is_expired(1_150));
//! ```

mod grid;

pub use grid::AnimationGrid;

use crate::config::{INITIAL_VELOCITY, MERGING_ACCELERATION};
use crate::engine::Cell;

/// Closed set of visual transitions, with per-kind data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationKind {
    /// A new tile popping in.
    Spawn,
    /// A tile sliding into this cell from `from`.
    Move { from: Cell },
    /// The overshoot pulse of a freshly merged tile.
    Merge,
    /// Board-wide fade of the end-of-game overlay.
    GlobalFade,
}

/// One timed transition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationCell {
    kind: AnimationKind,
    start: u64,
    duration: u64,
    delay: u64,
}

impl AnimationCell {
    pub fn new(kind: AnimationKind, start: u64, duration: u64, delay: u64) -> Self {
        AnimationCell { kind, start, duration, delay }
    }

    #[inline]
    pub fn kind(&self) -> AnimationKind { self.kind }

    #[inline]
    pub fn start(&self) -> u64 { self.start }

    #[inline]
    pub fn duration(&self) -> u64 { self.duration }

    #[inline]
    pub fn delay(&self) -> u64 { self.delay }

    #[inline]
    fn elapsed(&self, now: u64) -> u64 {
        now.saturating_sub(self.start)
    }

    /// Progress in `[0, 1]`: `(now - start - delay) / duration`, clamped.
    pub fn percentage_done(&self, now: u64) -> f64 {
        let elapsed = self.elapsed(now);
        if elapsed < self.delay {
            return 0.0;
        }
        if self.duration == 0 {
            return 1.0;
        }
        ((elapsed - self.delay) as f64 / self.duration as f64).clamp(0.0, 1.0)
    }

    /// Still inside the pre-delay window; no visual effect yet.
    #[inline]
    pub fn is_pending(&self, now: u64) -> bool {
        self.elapsed(now) < self.delay
    }

    /// Delay over and duration not yet elapsed.
    #[inline]
    pub fn is_active(&self, now: u64) -> bool {
        !self.is_pending(now) && !self.is_expired(now)
    }

    /// Delay and duration have both fully elapsed.
    #[inline]
    pub fn is_expired(&self, now: u64) -> bool {
        self.elapsed(now) >= self.delay.saturating_add(self.duration)
    }
}

/// How the renderer should draw the tile in one cell this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TileVisual {
    /// Draw at rest.
    Static,
    /// A spawned tile still waiting for its pop-in.
    Hidden,
    /// Draw scaled around the cell centre (1.0 = full size).
    Scale(f64),
    /// Draw offset by `(dx, dy)` cells. `pre_merge` asks for the value the
    /// tile had before merging (half the current value).
    Slide { dx: f64, dy: f64, pre_merge: bool },
}

/// Merge pulse scale: `1 + v0*t + a*t^2/2`.
pub fn merge_scale(t: f64) -> f64 {
    1.0 + INITIAL_VELOCITY * t + MERGING_ACCELERATION * t * t / 2.0
}
