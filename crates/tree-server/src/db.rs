//! The leaves table: relational storage behind the three endpoints.
//!
//! Timestamps are stored as fixed-width RFC 3339 strings (UTC,
//! microsecond precision) so string ordering matches time ordering.

use std::path::Path;

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use rusqlite::Connection;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::info;

use crate::config::LeafDefaults;
use tree_core::{Note, NoteDraft, NoteId, Position, RemoteStats};

#[derive(Debug, Error)]
pub enum DbError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Corrupt row {id}: {reason}")]
    Corrupt { id: i64, reason: String },
}

pub type Result<T> = std::result::Result<T, DbError>;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS leaves (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    teacher TEXT NOT NULL,
    message TEXT NOT NULL,
    x INTEGER NOT NULL,
    y INTEGER NOT NULL,
    type TEXT NOT NULL,
    gradient TEXT NOT NULL,
    created_at TEXT NOT NULL
)";

pub struct Db {
    conn: Mutex<Connection>,
}

impl Db {
    /// Open (or create) the database file and ensure the schema exists.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute(SCHEMA, [])?;
        info!("Opened leaves database at {:?}", path);
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// In-memory database, for tests.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute(SCHEMA, [])?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Insert one leaf, applying column defaults for absent styling
    /// fields, and return the stored row.
    pub async fn insert_leaf(&self, draft: &NoteDraft, defaults: &LeafDefaults) -> Result<Note> {
        let position = Position {
            x: draft.x.unwrap_or(defaults.x),
            y: draft.y.unwrap_or(defaults.y),
        };
        let leaf_type = draft.leaf_type.unwrap_or(defaults.leaf_type);
        let gradient = draft.gradient.unwrap_or(defaults.gradient);
        let created_at = Utc::now();

        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO leaves (name, teacher, message, x, y, type, gradient, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            rusqlite::params![
                draft.student_name,
                draft.teacher_name,
                draft.message,
                position.x,
                position.y,
                leaf_type.as_str(),
                gradient.as_str(),
                timestamp(created_at),
            ],
        )?;
        let id = conn.last_insert_rowid();

        Ok(Note {
            id: NoteId::Remote(id),
            student_name: draft.student_name.clone(),
            teacher_name: draft.teacher_name.clone(),
            message: draft.message.clone(),
            position,
            leaf_type,
            gradient,
            created_at,
        })
    }

    /// The most recently created leaves, newest first, capped.
    pub async fn list_recent(&self, cap: usize) -> Result<Vec<Note>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT id, name, teacher, message, x, y, type, gradient, created_at
             FROM leaves
             ORDER BY created_at DESC, id DESC
             LIMIT ?1",
        )?;
        let rows = stmt.query_map([cap as i64], row_to_note)?;

        let mut notes = Vec::new();
        for row in rows {
            notes.push(row??);
        }
        Ok(notes)
    }

    /// Aggregate counts over the whole table.
    pub async fn stats(&self, recent_window_hours: i64) -> Result<RemoteStats> {
        let now = Utc::now();
        let cutoff = timestamp(now - Duration::hours(recent_window_hours));

        let conn = self.conn.lock().await;
        let total_leaves: u64 =
            conn.query_row("SELECT COUNT(*) FROM leaves", [], |r| r.get(0))?;
        let total_students: u64 =
            conn.query_row("SELECT COUNT(DISTINCT name) FROM leaves", [], |r| r.get(0))?;
        let total_teachers: u64 =
            conn.query_row("SELECT COUNT(DISTINCT teacher) FROM leaves", [], |r| r.get(0))?;
        let recent_leaves: u64 = conn.query_row(
            "SELECT COUNT(*) FROM leaves WHERE created_at >= ?1",
            [cutoff],
            |r| r.get(0),
        )?;

        Ok(RemoteStats {
            total_leaves,
            total_students,
            total_teachers,
            recent_leaves,
            last_updated: now,
        })
    }
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn row_to_note(row: &rusqlite::Row<'_>) -> rusqlite::Result<Result<Note>> {
    let id: i64 = row.get(0)?;
    let leaf_type: String = row.get(6)?;
    let gradient: String = row.get(7)?;
    let created_at: String = row.get(8)?;

    Ok(decode_row(
        id,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        &leaf_type,
        &gradient,
        &created_at,
    ))
}

#[allow(clippy::too_many_arguments)]
fn decode_row(
    id: i64,
    student_name: String,
    teacher_name: String,
    message: String,
    x: i32,
    y: i32,
    leaf_type: &str,
    gradient: &str,
    created_at: &str,
) -> Result<Note> {
    let corrupt = |reason: String| DbError::Corrupt { id, reason };
    Ok(Note {
        id: NoteId::Remote(id),
        student_name,
        teacher_name,
        message,
        position: Position { x, y },
        leaf_type: leaf_type.parse().map_err(|e| corrupt(format!("{}", e)))?,
        gradient: gradient.parse().map_err(|e| corrupt(format!("{}", e)))?,
        created_at: DateTime::parse_from_rfc3339(created_at)
            .map_err(|e| corrupt(format!("bad timestamp: {}", e)))?
            .with_timezone(&Utc),
    })
}
