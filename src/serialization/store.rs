use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Persistence port for the personal best (fewest turns at the end of a game).
pub trait ScoreStore {
    /// The stored best, or `None` if nothing has been recorded yet.
    fn load_personal_best(&mut self) -> Result<Option<u64>, StoreError>;

    fn record_personal_best(&mut self, turns: u64) -> Result<(), StoreError>;
}

impl<S: ScoreStore + ?Sized> ScoreStore for Box<S> {
    fn load_personal_best(&mut self) -> Result<Option<u64>, StoreError> {
        (**self).load_personal_best()
    }

    fn record_personal_best(&mut self, turns: u64) -> Result<(), StoreError> {
        (**self).record_personal_best(turns)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("postcard error: {0}")]
    Postcard(#[from] postcard::Error),
}

/// In-process store; forgets everything when dropped.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    best: Option<u64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_best(turns: u64) -> Self {
        MemoryStore { best: Some(turns) }
    }

    pub fn best(&self) -> Option<u64> {
        self.best
    }
}

impl ScoreStore for MemoryStore {
    fn load_personal_best(&mut self) -> Result<Option<u64>, StoreError> {
        Ok(self.best)
    }

    fn record_personal_best(&mut self, turns: u64) -> Result<(), StoreError> {
        self.best = Some(turns);
        Ok(())
    }
}

#[derive(Serialize, Deserialize)]
struct BestRecord {
    turns: u64,
}

/// Keeps the personal best in a small postcard file.
///
/// A missing file reads as "no best yet".
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        FileStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ScoreStore for FileStore {
    fn load_personal_best(&mut self) -> Result<Option<u64>, StoreError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let record: BestRecord = postcard::from_bytes(&bytes)?;
        Ok(Some(record.turns))
    }

    fn record_personal_best(&mut self, turns: u64) -> Result<(), StoreError> {
        let bytes = postcard::to_allocvec(&BestRecord { turns })?;
        fs::write(&self.path, bytes)?;
        Ok(())
    }
}
