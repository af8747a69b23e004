//! Persistence surfaces.
//!
//! [`SavedGame`] is the postcard-encoded snapshot behind `Game::save` and
//! `Game::load`. [`ScoreStore`] is the port the game uses to read and record
//! the personal best; [`MemoryStore`] and [`FileStore`] implement it.

mod saved;
mod store;

pub(crate) use saved::format_personal_best;
pub use saved::{
    SavedGame,
    SerializationError,
    NO_PERSONAL_BEST,
    to_postcard_bytes,
    from_postcard_bytes,
    write_to_path,
    read_from_path,
};
pub use store::{FileStore, MemoryStore, ScoreStore, StoreError};
