//! FallbackStore trait: local persistence used when the backend is
//! unreachable.
//!
//! Implementations:
//! - `InMemoryFallback` - For testing, with a switchable write failure
//! - `SnapshotStore` (in tree-client) - JSON file under the data directory
//!
//! The store holds one full snapshot of the collection; `save` replaces it
//! wholesale. Callers log and swallow save failures, so a broken fallback
//! degrades to in-memory-only operation instead of surfacing an error.

use async_trait::async_trait;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;

use crate::note::Note;

#[derive(Debug, Error)]
pub enum FallbackError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Corrupt snapshot: {0}")]
    Corrupt(String),
}

pub type Result<T> = std::result::Result<T, FallbackError>;

/// Persistent key-value style snapshot of the note collection.
#[async_trait]
pub trait FallbackStore: Send + Sync {
    /// Load the persisted snapshot. An absent snapshot is an empty
    /// collection, not an error.
    async fn load(&self) -> Result<Vec<Note>>;

    /// Replace the persisted snapshot with the given collection.
    async fn save(&self, notes: &[Note]) -> Result<()>;
}

// Allows sharing a store between a tree and test assertions.
#[async_trait]
impl<T: FallbackStore> FallbackStore for std::sync::Arc<T> {
    async fn load(&self) -> Result<Vec<Note>> {
        (**self).load().await
    }

    async fn save(&self, notes: &[Note]) -> Result<()> {
        (**self).save(notes).await
    }
}

/// In-memory fallback store for testing.
pub struct InMemoryFallback {
    snapshot: RwLock<Vec<Note>>,
    fail_saves: AtomicBool,
    fail_loads: AtomicBool,
}

impl InMemoryFallback {
    pub fn new() -> Self {
        Self {
            snapshot: RwLock::new(Vec::new()),
            fail_saves: AtomicBool::new(false),
            fail_loads: AtomicBool::new(false),
        }
    }

    /// Pre-seed the snapshot, as if a previous session had saved it.
    pub fn with_snapshot(notes: Vec<Note>) -> Self {
        let store = Self::new();
        *store.snapshot.write().unwrap() = notes;
        store
    }

    /// Simulate write failures (quota exceeded and the like).
    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::Relaxed);
    }

    /// Simulate an unreadable snapshot.
    pub fn set_fail_loads(&self, fail: bool) {
        self.fail_loads.store(fail, Ordering::Relaxed);
    }

    /// Current snapshot contents, for test assertions.
    pub fn snapshot(&self) -> Vec<Note> {
        self.snapshot.read().unwrap().clone()
    }
}

impl Default for InMemoryFallback {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FallbackStore for InMemoryFallback {
    async fn load(&self) -> Result<Vec<Note>> {
        if self.fail_loads.load(Ordering::Relaxed) {
            return Err(FallbackError::Corrupt("unexpected end of input".into()));
        }
        Ok(self.snapshot.read().unwrap().clone())
    }

    async fn save(&self, notes: &[Note]) -> Result<()> {
        if self.fail_saves.load(Ordering::Relaxed) {
            return Err(FallbackError::Io("quota exceeded".into()));
        }
        *self.snapshot.write().unwrap() = notes.to_vec();
        Ok(())
    }
}
