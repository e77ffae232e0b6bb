//! RemoteStore trait: the backend the sync core prefers to write to.
//!
//! Implementations:
//! - `InMemoryRemote` - For testing, with a switchable offline mode
//! - `HttpRemote` (in tree-client) - Talks to the backend service over
//!   HTTP/JSON

use async_trait::async_trait;
use chrono::Utc;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use thiserror::Error;

use crate::note::{Note, NoteDraft};
use crate::note_id::NoteId;
use crate::stats::RemoteStats;

/// Most-recent cap applied by the list operation, store side.
pub const LIST_CAP: usize = 1000;

#[derive(Debug, Error)]
pub enum RemoteStoreError {
    #[error("Transport failure: {0}")]
    Transport(String),

    #[error("Store rejected the request: {0}")]
    Rejected(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

pub type Result<T> = std::result::Result<T, RemoteStoreError>;

/// The persistent backend accessed over the network.
///
/// Every operation can fail as a whole; the sync core treats any failure
/// as "remote unavailable" and degrades to the fallback store.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Insert one note and return the stored row, including the
    /// store-assigned id and timestamp.
    async fn insert(&self, draft: NoteDraft) -> Result<Note>;

    /// The most recently created notes, newest first, capped at
    /// [`LIST_CAP`].
    async fn list_recent(&self) -> Result<Vec<Note>>;

    /// Server-side aggregate counts.
    async fn aggregate_counts(&self) -> Result<RemoteStats>;
}

// Allows sharing a store between a tree and test assertions.
#[async_trait]
impl<T: RemoteStore> RemoteStore for std::sync::Arc<T> {
    async fn insert(&self, draft: NoteDraft) -> Result<Note> {
        (**self).insert(draft).await
    }

    async fn list_recent(&self) -> Result<Vec<Note>> {
        (**self).list_recent().await
    }

    async fn aggregate_counts(&self) -> Result<RemoteStats> {
        (**self).aggregate_counts().await
    }
}

/// In-memory remote store for testing.
///
/// Assigns sequential integer ids the way the backend table does and can
/// be switched offline to simulate an unreachable backend.
pub struct InMemoryRemote {
    notes: RwLock<Vec<Note>>,
    next_id: AtomicI64,
    offline: AtomicBool,
}

impl InMemoryRemote {
    pub fn new() -> Self {
        Self {
            notes: RwLock::new(Vec::new()),
            next_id: AtomicI64::new(1),
            offline: AtomicBool::new(false),
        }
    }

    /// Simulate the backend becoming (un)reachable.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::Relaxed);
    }

    fn check_online(&self) -> Result<()> {
        if self.offline.load(Ordering::Relaxed) {
            Err(RemoteStoreError::Transport("connection refused".into()))
        } else {
            Ok(())
        }
    }

    /// Number of stored notes, for test assertions.
    pub fn len(&self) -> usize {
        self.notes.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryRemote {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RemoteStore for InMemoryRemote {
    async fn insert(&self, draft: NoteDraft) -> Result<Note> {
        self.check_online()?;
        let id = NoteId::Remote(self.next_id.fetch_add(1, Ordering::Relaxed));
        let note = draft.into_note(id, Utc::now());
        let mut notes = self.notes.write().unwrap();
        notes.insert(0, note.clone());
        Ok(note)
    }

    async fn list_recent(&self) -> Result<Vec<Note>> {
        self.check_online()?;
        let notes = self.notes.read().unwrap();
        Ok(notes.iter().take(LIST_CAP).cloned().collect())
    }

    async fn aggregate_counts(&self) -> Result<RemoteStats> {
        self.check_online()?;
        let notes = self.notes.read().unwrap();
        let now = Utc::now();
        let students: std::collections::HashSet<&str> =
            notes.iter().map(|n| n.student_name.as_str()).collect();
        let teachers: std::collections::HashSet<&str> =
            notes.iter().map(|n| n.teacher_name.as_str()).collect();
        let recent = notes
            .iter()
            .filter(|n| now.signed_duration_since(n.created_at) < chrono::Duration::hours(24))
            .count();
        Ok(RemoteStats {
            total_leaves: notes.len() as u64,
            total_students: students.len() as u64,
            total_teachers: teachers.len() as u64,
            recent_leaves: recent as u64,
            last_updated: now,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(name: &str, teacher: &str) -> NoteDraft {
        NoteDraft::styled(name.into(), teacher.into(), "Thank you".into())
    }

    #[tokio::test]
    async fn test_insert_assigns_sequential_remote_ids() {
        let remote = InMemoryRemote::new();
        let a = remote.insert(draft("Lan", "Mr. Tran")).await.unwrap();
        let b = remote.insert(draft("Minh", "Ms. Hoa")).await.unwrap();
        assert_eq!(a.id, NoteId::Remote(1));
        assert_eq!(b.id, NoteId::Remote(2));
    }

    #[tokio::test]
    async fn test_list_recent_newest_first() {
        let remote = InMemoryRemote::new();
        remote.insert(draft("Lan", "Mr. Tran")).await.unwrap();
        remote.insert(draft("Minh", "Ms. Hoa")).await.unwrap();

        let notes = remote.list_recent().await.unwrap();
        assert_eq!(notes.len(), 2);
        assert_eq!(notes[0].student_name, "Minh");
        assert_eq!(notes[1].student_name, "Lan");
    }

    #[tokio::test]
    async fn test_offline_store_fails_every_operation() {
        let remote = InMemoryRemote::new();
        remote.set_offline(true);

        assert!(remote.insert(draft("Lan", "Mr. Tran")).await.is_err());
        assert!(remote.list_recent().await.is_err());
        assert!(remote.aggregate_counts().await.is_err());
    }

    #[tokio::test]
    async fn test_aggregate_counts_distinct_names() {
        let remote = InMemoryRemote::new();
        remote.insert(draft("Lan", "Mr. Tran")).await.unwrap();
        remote.insert(draft("Lan", "Ms. Hoa")).await.unwrap();
        remote.insert(draft("Minh", "Mr. Tran")).await.unwrap();

        let stats = remote.aggregate_counts().await.unwrap();
        assert_eq!(stats.total_leaves, 3);
        assert_eq!(stats.total_students, 2);
        assert_eq!(stats.total_teachers, 2);
        assert_eq!(stats.recent_leaves, 3);
    }
}
