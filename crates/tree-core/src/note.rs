//! The gratitude note model: one entry on the tree.
//!
//! A note carries who thanks whom, the message itself, and the visual
//! styling used to draw it as a leaf. The wire shape matches the backend
//! rows (`name`, `teacher`, `message`, `x`, `y`, `type`, `gradient`,
//! `created_at`).

use std::fmt::{self, Display, Formatter};
use std::ops::Range;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::note_id::NoteId;

/// Horizontal placement range on the tree canvas, in pixels.
pub const CANVAS_X: Range<i32> = 75..525;
/// Vertical placement range on the tree canvas, in pixels.
pub const CANVAS_Y: Range<i32> = 100..650;

#[derive(Debug, Error)]
#[error("Unknown {kind}: {value}")]
pub struct ParseStyleError {
    kind: &'static str,
    value: String,
}

/// Placement of a leaf on the tree canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    /// Pick a random spot within the canvas bounds.
    pub fn random() -> Self {
        let mut rng = rand::rng();
        Self {
            x: rng.random_range(CANVAS_X),
            y: rng.random_range(CANVAS_Y),
        }
    }
}

/// Leaf silhouette drawn for a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeafType {
    Heart,
    Maple,
    Willow,
    Clover,
}

impl LeafType {
    pub const ALL: [LeafType; 4] = [Self::Heart, Self::Maple, Self::Willow, Self::Clover];

    /// Pick one uniformly at random.
    pub fn random() -> Self {
        Self::ALL[rand::rng().random_range(0..Self::ALL.len())]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Heart => "heart",
            Self::Maple => "maple",
            Self::Willow => "willow",
            Self::Clover => "clover",
        }
    }
}

impl Display for LeafType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LeafType {
    type Err = ParseStyleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ParseStyleError {
                kind: "leaf type",
                value: s.to_string(),
            })
    }
}

/// Color gradient applied to a leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gradient {
    #[serde(rename = "gradient-1")]
    Gradient1,
    #[serde(rename = "gradient-2")]
    Gradient2,
    #[serde(rename = "gradient-3")]
    Gradient3,
    #[serde(rename = "gradient-4")]
    Gradient4,
}

impl Gradient {
    pub const ALL: [Gradient; 4] = [
        Self::Gradient1,
        Self::Gradient2,
        Self::Gradient3,
        Self::Gradient4,
    ];

    /// Pick one uniformly at random.
    pub fn random() -> Self {
        Self::ALL[rand::rng().random_range(0..Self::ALL.len())]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gradient1 => "gradient-1",
            Self::Gradient2 => "gradient-2",
            Self::Gradient3 => "gradient-3",
            Self::Gradient4 => "gradient-4",
        }
    }
}

impl Display for Gradient {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gradient {
    type Err = ParseStyleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|g| g.as_str() == s)
            .ok_or_else(|| ParseStyleError {
                kind: "gradient",
                value: s.to_string(),
            })
    }
}

/// One gratitude note, as stored and rendered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    #[serde(rename = "name")]
    pub student_name: String,
    #[serde(rename = "teacher")]
    pub teacher_name: String,
    pub message: String,
    #[serde(flatten)]
    pub position: Position,
    #[serde(rename = "type")]
    pub leaf_type: LeafType,
    pub gradient: Gradient,
    pub created_at: DateTime<Utc>,
}

/// Fields submitted when creating a note, before any store assigned an id.
///
/// Styling fields are optional on the wire; the backend applies fixed
/// defaults when they are absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteDraft {
    #[serde(rename = "name")]
    pub student_name: String,
    #[serde(rename = "teacher")]
    pub teacher_name: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<i32>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub leaf_type: Option<LeafType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gradient: Option<Gradient>,
}

impl NoteDraft {
    /// Build a draft with randomly assigned placement and styling.
    pub fn styled(student_name: String, teacher_name: String, message: String) -> Self {
        let position = Position::random();
        Self {
            student_name,
            teacher_name,
            message,
            x: Some(position.x),
            y: Some(position.y),
            leaf_type: Some(LeafType::random()),
            gradient: Some(Gradient::random()),
        }
    }

    /// Turn the draft into a note with the given id and timestamp.
    ///
    /// Used on the fallback path; the remote path gets the stored note
    /// back from the backend instead.
    pub fn into_note(self, id: NoteId, created_at: DateTime<Utc>) -> Note {
        Note {
            id,
            student_name: self.student_name,
            teacher_name: self.teacher_name,
            message: self.message,
            position: Position {
                x: self.x.unwrap_or(200),
                y: self.y.unwrap_or(150),
            },
            leaf_type: self.leaf_type.unwrap_or(LeafType::Heart),
            gradient: self.gradient.unwrap_or(Gradient::Gradient1),
            created_at,
        }
    }
}
