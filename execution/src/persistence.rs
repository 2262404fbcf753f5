//! Storage backends for the persisted [`GameState`] blob.
//!
//! The whole state is a single JSON document keyed by [`STORAGE_KEY`]. Backends are written to
//! only when the ledger commits.

use babapoly_types::casino::{GameState, STORAGE_KEY};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error as ThisError;
use tracing::debug;

#[derive(Debug, ThisError)]
pub enum StoreError {
    #[error("state io failed: {0}")]
    Io(#[from] io::Error),
    #[error("state json invalid: {0}")]
    Json(#[from] serde_json::Error),
}

pub trait Store {
    /// Load the persisted state, or `None` when nothing has been saved yet.
    fn load(&self) -> Result<Option<GameState>, StoreError>;

    fn save(&mut self, state: &GameState) -> Result<(), StoreError>;
}

/// In-process store, used by tests and by hosts that persist elsewhere.
#[derive(Debug, Default)]
pub struct MemoryStore {
    saved: Option<GameState>,
    writes: usize,
}

impl MemoryStore {
    pub fn with_state(state: GameState) -> Self {
        Self {
            saved: Some(state),
            writes: 0,
        }
    }

    pub fn saved(&self) -> Option<&GameState> {
        self.saved.as_ref()
    }

    /// Number of saves performed so far.
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl Store for MemoryStore {
    fn load(&self) -> Result<Option<GameState>, StoreError> {
        Ok(self.saved.clone())
    }

    fn save(&mut self, state: &GameState) -> Result<(), StoreError> {
        self.saved = Some(state.clone());
        self.writes += 1;
        Ok(())
    }
}

/// JSON file on disk. Saves go through a sibling temp file and a rename so a crash mid-write
/// never leaves a truncated blob behind.
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<dir>/baba-poly-state-v1.json`
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(format!("{STORAGE_KEY}.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Store for JsonFileStore {
    fn load(&self) -> Result<Option<GameState>, StoreError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let state = serde_json::from_slice(&bytes)?;
        Ok(Some(state))
    }

    fn save(&mut self, state: &GameState) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(state)?;
        let tmp = self.path.with_extension("json.tmp");
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&tmp, &bytes)?;
        fs::rename(&tmp, &self.path)?;
        debug!(path = %self.path.display(), bytes = bytes.len(), "state saved");
        Ok(())
    }
}
