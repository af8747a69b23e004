use rand::{rngs::StdRng, SeedableRng};

use super::grid::Grid;
use super::ops::{build_traversal, find_farthest_position, moves_available};
use super::state::{Cell, Direction, GameState, Status, Tile};
use crate::animation::{AnimationGrid, AnimationKind};
use crate::config::{GameConfig, BOARD_SIZE};
use crate::serialization::{format_personal_best, MemoryStore, SavedGame, ScoreStore, SerializationError};

/// What a single call to [`Game::make_move`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MoveOutcome {
    /// At least one tile changed cell.
    pub moved: bool,
    pub merges: u32,
    /// Sum of the values of the tiles created by merges.
    pub points: u64,
    /// Cell of the tile spawned after the move, if any.
    pub spawned: Option<Cell>,
}

/// One play session: the live grid, its animations and the bookkeeping around them.
///
/// All randomness comes from the owned RNG, so a seeded game replays exactly.
///
/// ```
/// use merge_2048::config::GameConfig;
/// use merge_2048::engine::{Direction, Game};
/// use merge_2048::serialization::MemoryStore;
///
/// let mut game = Game::with_seed(GameConfig::default(), MemoryStore::new(), 42);
/// assert_eq!(game.grid().tile_count(), 2);
///
/// let outcome = game.make_move(Direction::Left);
/// if outcome.moved {
///     assert_eq!(game.turns(), 1);
///     assert!(outcome.spawned.is_some());
/// }
/// // Let the slide and spawn animations run out.
/// game.tick(1_000_000_000);
/// assert!(!game.animations().is_animation_active());
/// ```
#[derive(Debug)]
pub struct Game<S: ScoreStore = MemoryStore> {
    grid: Grid,
    animations: AnimationGrid,
    config: GameConfig,
    state: GameState,
    turns: u64,
    moves: String,
    score: u64,
    personal_best: Option<u64>,
    store: S,
    rng: StdRng,
}

impl<S: ScoreStore> Game<S> {
    /// Start a game seeded from OS entropy.
    pub fn new(config: GameConfig, store: S) -> Self {
        Self::with_rng(config, store, StdRng::from_entropy())
    }

    pub fn with_seed(config: GameConfig, store: S, seed: u64) -> Self {
        Self::with_rng(config, store, StdRng::seed_from_u64(seed))
    }

    pub fn with_rng(config: GameConfig, store: S, rng: StdRng) -> Self {
        let mut game = Game {
            grid: Grid::new(BOARD_SIZE, BOARD_SIZE),
            animations: AnimationGrid::new(BOARD_SIZE, BOARD_SIZE),
            config,
            state: GameState::NORMAL,
            turns: 0,
            moves: String::from("0"),
            score: 0,
            personal_best: None,
            store,
            rng,
        };
        game.new_game();
        game
    }

    /// Reset in place: empty grid, fresh animations, counters at zero and
    /// `start_tiles` new tiles.
    pub fn new_game(&mut self) {
        self.grid.clear();
        self.animations = AnimationGrid::new(self.grid.width(), self.grid.height());
        self.personal_best = self.load_personal_best();
        self.state = GameState::NORMAL;
        self.turns = 0;
        self.moves = self.turns.to_string();
        self.score = 0;
        for _ in 0..self.config.start_tiles {
            self.add_random_tile();
        }
        log::debug!("new game, personal best {}", self.personal_best_display());
    }

    /// Slide every tile towards `direction`, merging equal neighbours once.
    ///
    /// Does nothing once the game is won or lost. A move that changes the
    /// grid counts a turn and spawns one tile; a move that cannot change a
    /// full, match-free grid ends the game.
    pub fn make_move(&mut self, direction: Direction) -> MoveOutcome {
        let mut outcome = MoveOutcome::default();
        if !self.state.is_active() {
            return outcome;
        }

        self.animations.cancel_animations();
        for tile in self.grid.tiles_mut() {
            tile.set_merged_from(None);
        }

        let vector = direction.vector();
        let xs = build_traversal(self.grid.width(), vector.x);
        let ys = build_traversal(self.grid.height(), vector.y);
        let timing = self.config.timing;

        for &x in &xs {
            for &y in &ys {
                let cell = Cell::new(x, y);
                let Some(value) = self.grid.content_at(cell).map(Tile::value) else {
                    continue;
                };
                let (farthest, next) = find_farthest_position(&self.grid, cell, vector);
                let merge_into = value.checked_mul(2).filter(|_| {
                    self.grid
                        .content_at(next)
                        .is_some_and(|other| other.value() == value && other.merged_from().is_none())
                });

                if let Some(merged_value) = merge_into {
                    let mut merged = Tile::new(next, merged_value);
                    merged.set_merged_from(Some([cell, next]));
                    self.grid.insert(merged);
                    self.grid.remove(cell);

                    self.animations.start_animation(
                        next.x,
                        next.y,
                        AnimationKind::Move { from: cell },
                        timing.move_duration(),
                        0,
                    );
                    self.animations.start_animation(
                        next.x,
                        next.y,
                        AnimationKind::Merge,
                        timing.merge_duration(),
                        timing.merge_delay(),
                    );

                    outcome.merges += 1;
                    outcome.points += merged_value as u64;
                    outcome.moved = true;

                    if merged_value as u64 >= self.win_threshold() && self.state.is_active() {
                        self.state.record_win();
                        log::info!("reached {merged_value} after {} turns", self.turns);
                        self.end_game();
                    }
                } else {
                    self.grid.move_tile(cell, farthest);
                    self.animations.start_animation(
                        farthest.x,
                        farthest.y,
                        AnimationKind::Move { from: cell },
                        timing.move_duration(),
                        0,
                    );
                    outcome.moved |= farthest != cell;
                }
            }
        }

        self.score += outcome.points;
        if outcome.moved {
            self.turns += 1;
            self.moves = self.turns.to_string();
            outcome.spawned = self.add_random_tile();
            self.check_lose();
        } else if !moves_available(&self.grid) {
            self.check_lose();
        }

        log::debug!(
            "{direction:?}: moved={} merges={} points={} state={}",
            outcome.moved,
            outcome.merges,
            outcome.points,
            self.state.code()
        );
        outcome
    }

    /// [`Game::make_move`] for a raw input code (0 up, 1 right, 2 down, 3 left).
    ///
    /// Panics on any other code.
    pub fn make_move_code(&mut self, code: u8) -> MoveOutcome {
        match Direction::try_from(code) {
            Ok(direction) => self.make_move(direction),
            Err(e) => panic!("{e}"),
        }
    }

    /// Acknowledge a win and keep playing towards the next doubling.
    ///
    /// Returns false (and changes nothing) unless the game is currently won.
    pub fn continue_playing(&mut self) -> bool {
        if !self.state.resume() {
            return false;
        }
        self.animations.cancel_animations();
        log::info!("continuing towards {}", self.win_threshold());
        true
    }

    /// Advance the animation clock by one frame.
    pub fn tick(&mut self, elapsed_nanos: u64) {
        self.animations.tick_all(elapsed_nanos);
    }

    /// Snapshot of everything the persisted layout carries.
    pub fn save(&self) -> SavedGame {
        SavedGame {
            width: self.grid.width() as u32,
            height: self.grid.height() as u32,
            cells: self.grid.values(),
            moves: self.moves.clone(),
            personal_best: self.personal_best_display(),
            state: self.state.code(),
            score: self.score,
        }
    }

    /// Replace the current session with `saved`.
    ///
    /// The layout is validated before anything changes; on error the game is
    /// left as it was. Tiles are placed directly, without spawn animations.
    pub fn load(&mut self, saved: &SavedGame) -> Result<(), SerializationError> {
        let checked = saved.check(self.grid.width(), self.grid.height())?;

        self.animations.cancel_animations();
        self.grid.clear();
        let width = self.grid.width();
        for (idx, &value) in saved.cells.iter().enumerate() {
            if value != 0 {
                let cell = Cell::new((idx % width) as i32, (idx / width) as i32);
                self.grid.insert(Tile::new(cell, value));
            }
        }
        self.turns = checked.turns;
        self.moves = self.turns.to_string();
        self.personal_best = checked.personal_best;
        self.state = checked.state;
        self.score = saved.score;
        log::debug!("loaded game at turn {} with state {}", self.turns, self.state.code());
        Ok(())
    }

    /// Value a merge has to reach for the next win.
    pub fn win_threshold(&self) -> u64 {
        (self.config.win_value as u64) << self.state.wins().min(32)
    }

    #[inline]
    pub fn grid(&self) -> &Grid { &self.grid }

    #[inline]
    pub fn animations(&self) -> &AnimationGrid { &self.animations }

    #[inline]
    pub fn config(&self) -> &GameConfig { &self.config }

    #[inline]
    pub fn state(&self) -> GameState { self.state }

    #[inline]
    pub fn status(&self) -> Status { self.state.status() }

    #[inline]
    pub fn turns(&self) -> u64 { self.turns }

    /// Turn count as shown to the player and persisted.
    #[inline]
    pub fn moves(&self) -> &str { &self.moves }

    #[inline]
    pub fn score(&self) -> u64 { self.score }

    /// Fewest turns recorded at the end of a game.
    #[inline]
    pub fn personal_best(&self) -> Option<u64> { self.personal_best }

    /// The personal best, or "N/A" when none is recorded.
    pub fn personal_best_display(&self) -> String {
        format_personal_best(self.personal_best)
    }

    #[inline]
    pub fn is_active(&self) -> bool { self.state.is_active() }

    #[inline]
    pub fn game_won(&self) -> bool { self.state.is_won() }

    #[inline]
    pub fn game_lost(&self) -> bool { self.state.is_lost() }

    pub fn store(&self) -> &S { &self.store }

    fn add_random_tile(&mut self) -> Option<Cell> {
        if !self.grid.cells_available() {
            return None;
        }
        let cell = self.grid.random_available_cell(&mut self.rng).ok()?;
        self.spawn_tile(Tile::new(cell, self.config.spawn_value));
        Some(cell)
    }

    fn spawn_tile(&mut self, tile: Tile) {
        let cell = tile.cell();
        let timing = self.config.timing;
        log::trace!("spawning {tile}");
        self.grid.insert(tile);
        self.animations.start_animation(
            cell.x,
            cell.y,
            AnimationKind::Spawn,
            timing.spawn_duration(),
            timing.spawn_delay(),
        );
    }

    fn check_lose(&mut self) {
        if !moves_available(&self.grid) && !self.state.is_won() {
            self.state.record_loss();
            log::info!("no moves left after {} turns", self.turns);
            self.end_game();
        } else if self.state.is_won() {
            self.end_game();
        }
    }

    fn end_game(&mut self) {
        let timing = self.config.timing;
        self.animations.start_global(AnimationKind::GlobalFade, timing.fade_duration(), timing.fade_delay());

        let improved = self.personal_best.map_or(true, |best| self.turns <= best);
        if improved {
            self.personal_best = Some(self.turns);
            log::info!("new personal best: {} turns", self.turns);
            if let Err(e) = self.store.record_personal_best(self.turns) {
                log::warn!("failed to record personal best: {e}");
            }
        }
    }

    fn load_personal_best(&mut self) -> Option<u64> {
        match self.store.load_personal_best() {
            Ok(best) => best,
            Err(e) => {
                log::warn!("failed to load personal best: {e}");
                self.personal_best
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serialization::{StoreError, NO_PERSONAL_BEST};
    use rand::Rng;

    type Rows = [[u32; 4]; 4];

    const CHECKER: Rows = [[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 4, 2]];

    fn layout(rows: Rows, state: i32) -> SavedGame {
        SavedGame {
            width: 4,
            height: 4,
            cells: rows.concat(),
            moves: "0".to_string(),
            personal_best: NO_PERSONAL_BEST.to_string(),
            state,
            score: 0,
        }
    }

    fn game_with(rows: Rows, state: i32) -> Game {
        let mut game = Game::with_seed(GameConfig::default(), MemoryStore::new(), 7);
        game.load(&layout(rows, state)).unwrap();
        game
    }

    /// Row `y`, with the tile spawned by the last move blanked out.
    fn row_ignoring_spawn(game: &Game, y: usize, outcome: &MoveOutcome) -> Vec<u32> {
        let mut row = game.grid().row(y);
        if let Some(cell) = outcome.spawned.filter(|c| c.y as usize == y) {
            row[cell.x as usize] = 0;
        }
        row
    }

    fn assert_grid_consistent(grid: &Grid) {
        for (cell, tile) in grid.iter() {
            assert_eq!(cell, tile.cell(), "tile {tile} stored at {cell}");
            assert!(tile.value() >= 2 && tile.value().is_power_of_two());
        }
    }

    #[test]
    fn new_game_places_start_tiles() {
        let game = Game::with_seed(GameConfig::default(), MemoryStore::with_best(7), 3);
        assert_eq!(game.grid().tile_count(), 2);
        assert!(game.grid().iter().all(|(_, t)| t.value() == 2));
        assert_eq!(game.turns(), 0);
        assert_eq!(game.moves(), "0");
        assert_eq!(game.personal_best(), Some(7));
        assert_eq!(game.status(), Status::Normal);
        for (cell, _) in game.grid().iter() {
            let kinds: Vec<_> = game.animations().animations_at(cell.x, cell.y).iter().map(|a| a.kind()).collect();
            assert_eq!(kinds, vec![AnimationKind::Spawn]);
        }
    }

    #[test]
    fn new_game_resets_in_place() {
        let mut game = game_with([[2, 2, 0, 0], [0; 4], [0; 4], [0; 4]], 0);
        game.make_move(Direction::Left);
        assert_eq!(game.turns(), 1);
        game.new_game();
        assert_eq!(game.turns(), 0);
        assert_eq!(game.score(), 0);
        assert_eq!(game.grid().tile_count(), 2);
    }

    #[test]
    fn right_merges_rightmost_pair_first() {
        let mut game = game_with([[2, 2, 2, 2], [0; 4], [0; 4], [0; 4]], 0);
        let outcome = game.make_move(Direction::Right);
        assert!(outcome.moved);
        assert_eq!(outcome.merges, 2);
        assert_eq!(outcome.points, 8);
        assert_eq!(row_ignoring_spawn(&game, 0, &outcome), vec![0, 0, 4, 4]);
        assert_eq!(game.score(), 8);
    }

    #[test]
    fn left_merges_leftmost_pair_first() {
        let mut game = game_with([[2, 2, 2, 2], [0; 4], [0; 4], [0; 4]], 0);
        let outcome = game.make_move_code(3);
        assert_eq!(row_ignoring_spawn(&game, 0, &outcome), vec![4, 4, 0, 0]);
    }

    #[test]
    fn merged_tile_does_not_merge_again() {
        let mut game = game_with([[0; 4], [2, 2, 4, 0], [0; 4], [0; 4]], 0);
        let outcome = game.make_move(Direction::Left);
        assert_eq!(outcome.merges, 1);
        assert_eq!(outcome.points, 4);
        assert_eq!(row_ignoring_spawn(&game, 1, &outcome), vec![4, 4, 0, 0]);
        let merged = game.grid().content_at(Cell::new(0, 1)).unwrap();
        assert_eq!(merged.merged_from(), Some([Cell::new(1, 1), Cell::new(0, 1)]));
        assert_eq!(game.grid().content_at(Cell::new(1, 1)).unwrap().merged_from(), None);
    }

    #[test]
    fn largest_tiles_merge_without_overflow() {
        let top = crate::config::MAX_TILE_VALUE;
        let mut game = game_with([[top, top, 0, 0], [0; 4], [0; 4], [0; 4]], 2);
        let outcome = game.make_move(Direction::Left);
        assert_eq!(outcome.merges, 1);
        assert_eq!(game.grid().value_at(Cell::new(0, 0)), top * 2);
        assert_grid_consistent(game.grid());
    }

    #[test]
    fn oversized_saves_are_rejected() {
        let mut game = Game::with_seed(GameConfig::default(), MemoryStore::new(), 8);
        let before = game.save();

        let mut huge = layout([[0; 4]; 4], 2);
        huge.cells[0] = 1 << 31;
        huge.cells[1] = 1 << 31;
        assert!(matches!(game.load(&huge), Err(SerializationError::TileValue { .. })));

        let extreme = layout([[2, 0, 0, 0], [0; 4], [0; 4], [0; 4]], i32::MAX);
        assert!(matches!(game.load(&extreme), Err(SerializationError::State(i32::MAX))));
        assert!(!game.continue_playing());
        assert_eq!(game.save(), before);
    }

    #[test]
    fn vertical_moves_use_column_traversal() {
        let mut game = game_with([[2, 0, 0, 0], [2, 0, 0, 0], [4, 0, 0, 0], [0; 4]], 0);
        let outcome = game.make_move(Direction::Down);
        assert_eq!(outcome.merges, 1);
        let column: Vec<u32> = (0..4).map(|y| game.grid().value_at(Cell::new(0, y))).collect();
        let spawned_in_column = outcome.spawned.filter(|c| c.x == 0).map(|c| c.y as usize);
        let mut expected = vec![0, 0, 4, 4];
        if let Some(y) = spawned_in_column {
            expected[y] = 2;
        }
        assert_eq!(column, expected);
    }

    #[test]
    fn blocked_move_changes_nothing() {
        let rows = [[2, 4, 0, 0], [8, 0, 0, 0], [0; 4], [0; 4]];
        let mut game = game_with(rows, 0);
        let before = game.grid().clone();
        let outcome = game.make_move(Direction::Left);
        assert_eq!(outcome, MoveOutcome::default());
        assert_eq!(game.grid(), &before);
        assert_eq!(game.turns(), 0);
        assert_eq!(game.moves(), "0");
    }

    #[test]
    fn merge_conserves_value_sum() {
        let mut game = game_with([[2, 2, 0, 0], [0, 0, 8, 0], [0; 4], [0; 4]], 0);
        let (count, sum) = (game.grid().tile_count(), game.grid().value_sum());
        let outcome = game.make_move(Direction::Left);
        assert_eq!(outcome.merges, 1);
        assert!(outcome.spawned.is_some());
        let spawn = game.config().spawn_value as u64;
        assert_eq!(game.grid().tile_count(), count - 1 + 1);
        assert_eq!(game.grid().value_sum(), sum + spawn);
    }

    #[test]
    fn seeded_random_play_keeps_grid_consistent() {
        let mut game = Game::with_seed(GameConfig::default(), MemoryStore::new(), 2024);
        let mut rng = StdRng::seed_from_u64(99);
        for _ in 0..500 {
            if game.game_won() {
                assert!(game.continue_playing());
            }
            if game.game_lost() {
                break;
            }
            let before = game.grid().value_sum();
            let outcome = game.make_move(Direction::ALL[rng.gen_range(0..4)]);
            assert_grid_consistent(game.grid());
            let spawned = outcome.spawned.map_or(0, |_| 2);
            assert_eq!(game.grid().value_sum(), before + spawned);
            game.tick(16_000_000);
        }
        assert!(game.turns() > 0);
    }

    #[test]
    fn seeded_games_replay_identically() {
        let play = |seed| {
            let mut game = Game::with_seed(GameConfig::default(), MemoryStore::new(), seed);
            for dir in [Direction::Up, Direction::Left, Direction::Down, Direction::Right].repeat(10) {
                game.make_move(dir);
            }
            game.save()
        };
        assert_eq!(play(11), play(11));
    }

    #[test]
    fn move_schedules_slide_merge_and_spawn() {
        let mut game = game_with([[2, 2, 0, 0], [0; 4], [0; 4], [0; 4]], 0);
        let outcome = game.make_move(Direction::Left);
        let timing = game.config().timing;

        let target = game.animations().animations_at(0, 0);
        let n = target.len();
        assert!(n >= 2);
        assert_eq!(target[n - 2].kind(), AnimationKind::Move { from: Cell::new(1, 0) });
        assert_eq!(target[n - 2].delay(), 0);
        assert_eq!(target[n - 1].kind(), AnimationKind::Merge);
        assert_eq!(target[n - 1].delay(), timing.merge_delay());
        assert_eq!(target[n - 1].duration(), timing.merge_duration());

        let spawned = outcome.spawned.unwrap();
        let spawn = game.animations().animations_at(spawned.x, spawned.y).last().unwrap();
        assert_eq!(spawn.kind(), AnimationKind::Spawn);
        assert_eq!(spawn.delay(), timing.spawn_delay());
        assert!(game.animations().global_animations().is_empty());
    }

    #[test]
    fn win_triggers_once_and_blocks_moves() {
        let mut game = game_with([[1024, 1024, 0, 0], [0; 4], [0; 4], [0; 4]], 0);
        let outcome = game.make_move(Direction::Left);
        assert!(outcome.moved);
        assert!(game.game_won());
        assert_eq!(game.state().code(), 1);
        let fade = game.animations().global_animations().last().unwrap();
        assert_eq!(fade.kind(), AnimationKind::GlobalFade);
        assert_eq!(fade.duration(), game.config().timing.fade_duration());
        assert_eq!(fade.delay(), game.config().timing.fade_delay());

        let before = game.grid().clone();
        assert_eq!(game.make_move(Direction::Right), MoveOutcome::default());
        assert_eq!(game.grid(), &before);
        assert_eq!(game.state().code(), 1);
    }

    #[test]
    fn continuing_raises_the_threshold() {
        let mut game = game_with([[1024, 1024, 0, 0], [0; 4], [0; 4], [0; 4]], 0);
        assert!(!game.continue_playing());
        game.make_move(Direction::Left);
        assert!(game.continue_playing());
        assert_eq!(game.state().code(), 2);
        assert!(game.is_active());
        assert_eq!(game.win_threshold(), 4096);
        assert!(game.animations().global_animations().is_empty());

        let mut again = game_with([[1024, 1024, 0, 0], [0; 4], [0; 4], [0; 4]], 2);
        again.make_move(Direction::Left);
        assert_eq!(again.grid().value_at(Cell::new(0, 0)), 2048);
        assert_eq!(again.state().code(), 2);

        let mut next = game_with([[2048, 2048, 0, 0], [0; 4], [0; 4], [0; 4]], 2);
        next.make_move(Direction::Left);
        assert!(next.game_won());
        assert_eq!(next.state().code(), 3);
    }

    #[test]
    fn custom_win_value_is_respected() {
        let cfg = GameConfig { win_value: 16, ..GameConfig::default() };
        let mut game = Game::with_seed(cfg, MemoryStore::new(), 5);
        game.load(&layout([[8, 8, 0, 0], [0; 4], [0; 4], [0; 4]], 0)).unwrap();
        game.make_move(Direction::Left);
        assert!(game.game_won());
    }

    #[test]
    fn stuck_board_is_lost_on_next_attempt() {
        let mut game = game_with(CHECKER, 0);
        assert!(game.is_active());
        let outcome = game.make_move(Direction::Left);
        assert!(!outcome.moved);
        assert!(game.game_lost());
        assert_eq!(game.status(), Status::Lost);
        assert_eq!(game.state().code(), -1);
        assert_eq!(game.animations().global_animations().len(), 1);

        let before = game.grid().clone();
        assert_eq!(game.make_move(Direction::Up), MoveOutcome::default());
        assert_eq!(game.grid(), &before);
    }

    #[test]
    fn adjacent_pair_is_not_lost() {
        let rows = [[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [2, 8, 4, 2]];
        let mut game = game_with(rows, 0);
        let outcome = game.make_move(Direction::Left);
        assert!(!outcome.moved);
        assert!(game.is_active());
        assert!(game.animations().global_animations().is_empty());
    }

    #[test]
    fn spawn_into_last_cell_can_lose() {
        let rows = [[4, 8, 4, 0], [4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 4, 2]];
        let mut game = game_with(rows, 0);
        let outcome = game.make_move(Direction::Right);
        assert!(outcome.moved);
        assert_eq!(outcome.spawned, Some(Cell::new(0, 0)));
        assert_eq!(game.grid().row(0), vec![2, 4, 8, 4]);
        assert!(game.game_lost());
        assert_eq!(game.turns(), 1);
    }

    #[test]
    fn end_game_records_fewest_turns() {
        let mut game = Game::with_seed(GameConfig::default(), MemoryStore::new(), 1);
        let mut saved = layout([[1024, 1024, 0, 0], [0; 4], [0; 4], [0; 4]], 0);
        saved.moves = "41".to_string();
        game.load(&saved).unwrap();
        game.make_move(Direction::Left);
        assert_eq!(game.personal_best(), Some(41));
        assert_eq!(game.personal_best_display(), "41");
        assert_eq!(game.store().best(), Some(41));
        assert_eq!(game.turns(), 42);

        saved.personal_best = "10".to_string();
        game.load(&saved).unwrap();
        game.make_move(Direction::Left);
        assert_eq!(game.personal_best(), Some(10));
        assert_eq!(game.store().best(), Some(41));
    }

    #[test]
    fn store_failures_do_not_stop_play() {
        struct Broken;
        impl ScoreStore for Broken {
            fn load_personal_best(&mut self) -> Result<Option<u64>, StoreError> {
                Err(std::io::Error::other("offline").into())
            }
            fn record_personal_best(&mut self, _: u64) -> Result<(), StoreError> {
                Err(std::io::Error::other("offline").into())
            }
        }
        let mut game = Game::with_seed(GameConfig::default(), Broken, 4);
        assert_eq!(game.personal_best(), None);
        game.load(&layout(CHECKER, 0)).unwrap();
        game.make_move(Direction::Down);
        assert!(game.game_lost());
        assert_eq!(game.personal_best(), Some(0));
    }

    #[test]
    #[should_panic]
    fn invalid_direction_code_panics() {
        let mut game = Game::with_seed(GameConfig::default(), MemoryStore::new(), 0);
        game.make_move_code(4);
    }

    #[test]
    fn save_load_reproduces_read_surface() {
        let mut game = Game::with_seed(GameConfig::default(), MemoryStore::with_best(300), 8);
        for code in [0, 3, 2, 1, 0, 3, 3, 2] {
            game.make_move_code(code);
        }
        let bytes = crate::serialization::to_postcard_bytes(&game.save()).unwrap();

        let mut fresh = Game::with_seed(GameConfig::default(), MemoryStore::new(), 1234);
        fresh.load(&crate::serialization::from_postcard_bytes(&bytes).unwrap()).unwrap();

        assert_eq!(fresh.grid().values(), game.grid().values());
        assert_grid_consistent(fresh.grid());
        assert_eq!(fresh.moves(), game.moves());
        assert_eq!(fresh.turns(), game.turns());
        assert_eq!(fresh.personal_best_display(), "300");
        assert_eq!(fresh.state(), game.state());
        assert_eq!(fresh.score(), game.score());
        assert!(!fresh.animations().is_animation_active());
        assert!(fresh.animations().global_animations().is_empty());
    }

    #[test]
    fn invalid_load_leaves_game_untouched() {
        let mut game = Game::with_seed(GameConfig::default(), MemoryStore::new(), 8);
        let before = game.save();
        let mut bad = layout(CHECKER, 0);
        bad.cells[0] = 3;
        assert!(matches!(game.load(&bad), Err(SerializationError::TileValue { .. })));
        assert_eq!(game.save(), before);
        assert!(game.animations().is_animation_active());
    }
}
