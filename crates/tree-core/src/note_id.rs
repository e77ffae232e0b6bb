//! NoteId: Unique identifier for a gratitude note.
//!
//! Ids come from two disjoint namespaces: the backend table assigns
//! integer ids on insert, while the client assigns UUIDs to notes written
//! to the local snapshot. Keeping the namespaces separate means a note
//! created offline can never collide with a server row loaded later.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum NoteIdError {
    #[error("Invalid note ID format: expected an integer or 'local-<uuid>'")]
    InvalidFormat,
    #[error("Invalid UUID in local note ID: {0}")]
    InvalidUuid(#[from] uuid::Error),
}

/// A unique identifier for a note.
///
/// Remote ids serialize as the bare integer the backend row carries;
/// local ids serialize as a `"local-<uuid>"` string.
///
/// # Examples
/// ```
/// use tree_core::NoteId;
///
/// let id: NoteId = "42".parse().unwrap();
/// assert_eq!(id, NoteId::Remote(42));
///
/// let id = NoteId::generate_local();
/// assert!(id.is_local());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoteId {
    /// Assigned by the backend table on insert.
    Remote(i64),
    /// Assigned by the client when the backend is unreachable.
    Local(Uuid),
}

impl NoteId {
    /// Generate a fresh id in the local namespace.
    pub fn generate_local() -> Self {
        Self::Local(Uuid::new_v4())
    }

    pub fn is_local(&self) -> bool {
        matches!(self, Self::Local(_))
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote(_))
    }
}

impl Display for NoteId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Remote(id) => write!(f, "{}", id),
            Self::Local(uuid) => write!(f, "local-{}", uuid),
        }
    }
}

impl FromStr for NoteId {
    type Err = NoteIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(rest) = s.strip_prefix("local-") {
            let uuid = Uuid::parse_str(rest)?;
            return Ok(Self::Local(uuid));
        }
        s.parse::<i64>()
            .map(Self::Remote)
            .map_err(|_| NoteIdError::InvalidFormat)
    }
}

impl From<i64> for NoteId {
    fn from(id: i64) -> Self {
        Self::Remote(id)
    }
}

// Remote ids serialize as the row integer so the wire shape matches the
// backend; local ids serialize as a prefixed string.
impl serde::Serialize for NoteId {
    fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Remote(id) => s.serialize_i64(*id),
            Self::Local(_) => s.serialize_str(&self.to_string()),
        }
    }
}

impl<'de> serde::Deserialize<'de> for NoteId {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        struct NoteIdVisitor;

        impl serde::de::Visitor<'_> for NoteIdVisitor {
            type Value = NoteId;

            fn expecting(&self, f: &mut Formatter<'_>) -> fmt::Result {
                f.write_str("an integer or a 'local-<uuid>' string")
            }

            fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<NoteId, E> {
                Ok(NoteId::Remote(v))
            }

            fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<NoteId, E> {
                i64::try_from(v)
                    .map(NoteId::Remote)
                    .map_err(|_| E::custom("note ID out of range"))
            }

            fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<NoteId, E> {
                v.parse().map_err(E::custom)
            }
        }

        d.deserialize_any(NoteIdVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_remote() {
        assert_eq!(NoteId::Remote(42).to_string(), "42");
    }

    #[test]
    fn test_display_local() {
        let uuid = Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap();
        assert_eq!(
            NoteId::Local(uuid).to_string(),
            "local-550e8400-e29b-41d4-a716-446655440000"
        );
    }

    #[test]
    fn test_parse_remote() {
        let id: NoteId = "123".parse().unwrap();
        assert_eq!(id, NoteId::Remote(123));
    }

    #[test]
    fn test_parse_local() {
        let id: NoteId = "local-550e8400-e29b-41d4-a716-446655440000".parse().unwrap();
        assert!(id.is_local());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("leaf".parse::<NoteId>().is_err());
        assert!("local-not-a-uuid".parse::<NoteId>().is_err());
        assert!("".parse::<NoteId>().is_err());
    }

    #[test]
    fn test_generated_local_ids_are_unique() {
        let a = NoteId::generate_local();
        let b = NoteId::generate_local();
        assert_ne!(a, b);
    }

    #[test]
    fn test_namespaces_are_disjoint() {
        let remote = NoteId::Remote(7);
        let local = NoteId::generate_local();
        assert!(remote.is_remote());
        assert!(!remote.is_local());
        assert_ne!(remote, local);
    }

    #[test]
    fn test_remote_serializes_as_number() {
        let json = serde_json::to_string(&NoteId::Remote(42)).unwrap();
        assert_eq!(json, "42");
    }

    #[test]
    fn test_local_serializes_as_string() {
        let id = NoteId::generate_local();
        let json = serde_json::to_string(&id).unwrap();
        assert!(json.starts_with("\"local-"));
    }

    #[test]
    fn test_serde_roundtrip() {
        for original in [NoteId::Remote(9001), NoteId::generate_local()] {
            let json = serde_json::to_string(&original).unwrap();
            let parsed: NoteId = serde_json::from_str(&json).unwrap();
            assert_eq!(original, parsed);
        }
    }
}
