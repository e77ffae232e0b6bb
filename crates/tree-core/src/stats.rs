//! Derived aggregate counts over the note collection.
//!
//! `TreeStats` is what the sync core derives from its in-memory state;
//! `RemoteStats` is the richer server-side aggregate the stats endpoint
//! serves, never mirrored into client state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Counts derived from the in-memory collection.
///
/// Pure functions of the collection contents; recomputed on demand,
/// never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeStats {
    pub total_leaves: usize,
    pub total_students: usize,
    pub total_teachers: usize,
}

/// Server-side aggregate served by the stats endpoint.
///
/// `recent_leaves` counts notes created within the last 24 hours against
/// the server clock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteStats {
    pub total_leaves: u64,
    pub total_students: u64,
    pub total_teachers: u64,
    pub recent_leaves: u64,
    pub last_updated: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_stats_wire_shape() {
        let stats = RemoteStats {
            total_leaves: 12,
            total_students: 8,
            total_teachers: 3,
            recent_leaves: 2,
            last_updated: "2024-11-20T08:00:00Z".parse().unwrap(),
        };
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["totalLeaves"], 12);
        assert_eq!(json["totalStudents"], 8);
        assert_eq!(json["totalTeachers"], 3);
        assert_eq!(json["recentLeaves"], 2);
        assert!(json["lastUpdated"].is_string());
    }

    #[test]
    fn test_tree_stats_wire_shape() {
        let stats = TreeStats {
            total_leaves: 1,
            total_students: 1,
            total_teachers: 1,
        };
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["totalLeaves"], 1);
    }
}
