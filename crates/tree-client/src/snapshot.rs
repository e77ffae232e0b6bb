//! JSON-file implementation of the fallback store.
//!
//! The snapshot lives at `leaves.json` under the data directory and holds
//! the full collection, replaced wholesale on every save. A missing file
//! is an empty collection; an unreadable one surfaces as an error the
//! sync core degrades from.

use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use tree_core::fallback::Result;
use tree_core::{FallbackError, FallbackStore, Note};

pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join("leaves.json"),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl FallbackStore for SnapshotStore {
    async fn load(&self) -> Result<Vec<Note>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let contents =
            fs::read_to_string(&self.path).map_err(|e| FallbackError::Io(e.to_string()))?;
        serde_json::from_str(&contents).map_err(|e| FallbackError::Corrupt(e.to_string()))
    }

    async fn save(&self, notes: &[Note]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| FallbackError::Io(e.to_string()))?;
        }
        let contents =
            serde_json::to_string_pretty(notes).map_err(|e| FallbackError::Io(e.to_string()))?;
        fs::write(&self.path, contents).map_err(|e| FallbackError::Io(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::TempDir;
    use tree_core::{NoteDraft, NoteId};

    fn note(name: &str) -> Note {
        NoteDraft::styled(name.into(), "Mr. Tran".into(), "Thank you".into())
            .into_note(NoteId::generate_local(), Utc::now())
    }

    #[tokio::test]
    async fn test_missing_snapshot_loads_empty() {
        let temp_dir = TempDir::new().unwrap();
        let store = SnapshotStore::new(temp_dir.path());
        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_and_load_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let store = SnapshotStore::new(temp_dir.path());

        let notes = vec![note("Minh"), note("Lan")];
        store.save(&notes).await.unwrap();

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded, notes);
        assert!(store.path().exists());
    }

    #[tokio::test]
    async fn test_save_creates_data_directory() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("a/b");
        let store = SnapshotStore::new(&nested);

        store.save(&[note("Lan")]).await.unwrap();
        assert_eq!(store.load().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_corrupt_snapshot_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let store = SnapshotStore::new(temp_dir.path());
        fs::write(store.path(), "{not json").unwrap();

        assert!(matches!(
            store.load().await,
            Err(FallbackError::Corrupt(_))
        ));
    }

    #[tokio::test]
    async fn test_second_save_replaces_snapshot() {
        let temp_dir = TempDir::new().unwrap();
        let store = SnapshotStore::new(temp_dir.path());

        store.save(&[note("Lan")]).await.unwrap();
        store.save(&[note("Minh"), note("Lan")]).await.unwrap();

        assert_eq!(store.load().await.unwrap().len(), 2);
    }
}
