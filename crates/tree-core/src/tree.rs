//! GratitudeTree: the sync core owning the in-memory note collection.
//!
//! The tree decides per write whether to target the remote store or the
//! local fallback:
//!
//! 1. At startup a single list probe picks the connectivity mode.
//! 2. In remote mode every write attempts the backend first; a successful
//!    write is mirrored into the fallback snapshot as a consistency
//!    backstop, a failed write is redirected to the snapshot once and not
//!    retried.
//! 3. In fallback mode the backend is skipped entirely.
//!
//! In-memory state only mutates after the chosen store durably accepted
//! the write; there is no speculative insert-then-rollback. All mutating
//! methods take `&mut self`, so a process cannot interleave two snapshot
//! writes.

use std::collections::HashSet;
use std::fmt::{self, Display, Formatter};
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::events::{EventBus, TreeEvent};
use crate::fallback::FallbackStore;
use crate::note::{Note, NoteDraft};
use crate::note_id::NoteId;
use crate::remote::RemoteStore;
use crate::stats::TreeStats;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
}

pub type Result<T> = std::result::Result<T, ValidationError>;

/// Which store the session currently targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ConnectivityMode {
    /// The backend answered the startup probe.
    Remote,
    /// The backend was unreachable; writes go to the local snapshot.
    LocalFallback,
}

impl Display for ConnectivityMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Remote => f.write_str("connected to database"),
            Self::LocalFallback => f.write_str("offline, using local snapshot"),
        }
    }
}

/// The sync core: in-memory collection, write-path decision, derived
/// counts.
///
/// Constructed explicitly and passed to callers; holds its stores behind
/// the [`RemoteStore`] and [`FallbackStore`] seams so tests and platforms
/// can swap them.
pub struct GratitudeTree<R, F> {
    remote: R,
    fallback: F,
    notes: Vec<Note>,
    mode: ConnectivityMode,
    students: HashSet<String>,
    teachers: HashSet<String>,
    events: Arc<EventBus>,
}

impl<R: RemoteStore, F: FallbackStore> GratitudeTree<R, F> {
    /// Probe the remote store and load the collection.
    ///
    /// A successful probe loads the remote listing and selects remote
    /// mode. Any failure selects fallback mode and loads the persisted
    /// snapshot, degrading to an empty collection when the snapshot is
    /// absent or unreadable. The probe runs once; the mode is not
    /// re-evaluated afterwards.
    pub async fn initialize(remote: R, fallback: F) -> Self {
        let (mode, notes) = match remote.list_recent().await {
            Ok(notes) => {
                info!("Loaded {} notes from the backend", notes.len());
                (ConnectivityMode::Remote, notes)
            }
            Err(err) => {
                warn!("Backend unreachable, using local snapshot: {}", err);
                let notes = match fallback.load().await {
                    Ok(notes) => {
                        info!("Loaded {} notes from the local snapshot", notes.len());
                        notes
                    }
                    Err(err) => {
                        warn!("Local snapshot unreadable, starting empty: {}", err);
                        Vec::new()
                    }
                };
                (ConnectivityMode::LocalFallback, notes)
            }
        };

        let mut tree = Self {
            remote,
            fallback,
            notes,
            mode,
            students: HashSet::new(),
            teachers: HashSet::new(),
            events: Arc::new(EventBus::new()),
        };
        tree.rebuild_distinct_sets();
        tree.events.emit(TreeEvent::Initialized {
            mode,
            count: tree.notes.len(),
        });
        tree
    }

    /// Validate, store, and prepend a new note.
    ///
    /// Returns the finally-stored note (remote- or local-flavored) so the
    /// caller can render immediate feedback.
    pub async fn add_note(
        &mut self,
        student_name: &str,
        teacher_name: &str,
        message: &str,
    ) -> Result<&Note> {
        let student_name = required(student_name, "name")?;
        let teacher_name = required(teacher_name, "teacher")?;
        let message = required(message, "message")?;

        let draft = NoteDraft::styled(student_name, teacher_name, message);
        let provisional_created_at = Utc::now();

        let (note, stored_in) = if self.mode == ConnectivityMode::Remote {
            match self.remote.insert(draft.clone()).await {
                Ok(stored) => (stored, ConnectivityMode::Remote),
                Err(err) => {
                    // One redirect, no retry; the mode stays Remote so the
                    // next write probes the backend again.
                    warn!("Backend write failed, storing locally: {}", err);
                    (
                        draft.into_note(NoteId::generate_local(), provisional_created_at),
                        ConnectivityMode::LocalFallback,
                    )
                }
            }
        } else {
            (
                draft.into_note(NoteId::generate_local(), provisional_created_at),
                ConnectivityMode::LocalFallback,
            )
        };

        let id = note.id;
        self.prepend(note);
        // Remote successes are persisted too, as a consistency backstop.
        self.persist_snapshot().await;

        debug!("Added note {} ({} on the tree)", id, self.notes.len());
        self.events.emit(TreeEvent::NoteAdded { id, stored_in });
        Ok(&self.notes[0])
    }

    /// Resolve a render-layer selection to its note. Linear scan.
    pub fn note_by_id(&self, id: &NoteId) -> Option<&Note> {
        self.notes.iter().find(|n| &n.id == id)
    }

    /// The collection, newest first. Read-only view for the render layer.
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn mode(&self) -> ConnectivityMode {
        self.mode
    }

    /// Counts derived from the current collection. Idempotent between
    /// mutations.
    pub fn stats(&self) -> TreeStats {
        TreeStats {
            total_leaves: self.notes.len(),
            total_students: self.students.len(),
            total_teachers: self.teachers.len(),
        }
    }

    pub fn events(&self) -> &Arc<EventBus> {
        &self.events
    }

    fn prepend(&mut self, note: Note) {
        self.students.insert(note.student_name.clone());
        self.teachers.insert(note.teacher_name.clone());
        self.notes.insert(0, note);
    }

    fn rebuild_distinct_sets(&mut self) {
        self.students.clear();
        self.teachers.clear();
        for note in &self.notes {
            self.students.insert(note.student_name.clone());
            self.teachers.insert(note.teacher_name.clone());
        }
    }

    /// Write the full collection to the fallback store. Failures are
    /// logged and swallowed; the in-memory state stays authoritative.
    async fn persist_snapshot(&self) {
        if let Err(err) = self.fallback.save(&self.notes).await {
            warn!("Failed to persist local snapshot: {}", err);
            self.events.emit(TreeEvent::SnapshotFailed {
                reason: err.to_string(),
            });
        }
    }
}

fn required(value: &str, field: &'static str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ValidationError::MissingField(field))
    } else {
        Ok(trimmed.to_string())
    }
}
