//! Favorite exercise models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier for an exercise, assigned by the catalog service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExerciseId(String);

impl ExerciseId {
    /// Wrap a raw identifier string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the string representation of this ID
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExerciseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ExerciseId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ExerciseId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Sync lifecycle of a locally stored favorite.
///
/// Wire spellings match the persisted JSON blob shared with the web client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SyncStatus {
    /// Created offline, never confirmed by the server
    Local,
    /// Confirmed present on the server
    Synced,
    /// Tombstone: marked for removal, awaiting confirmation
    DeleteOnSync,
}

/// A favorite exercise in the local store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteRecord {
    /// Unique key within the store
    pub exercise_id: ExerciseId,
    /// Sync lifecycle state
    pub status: SyncStatus,
    /// Timestamp of the last local mutation, used as the merge version
    pub updated_at: DateTime<Utc>,
}

impl FavoriteRecord {
    /// Create a record for a favorite added offline.
    #[must_use]
    pub fn local(exercise_id: ExerciseId, updated_at: DateTime<Utc>) -> Self {
        Self {
            exercise_id,
            status: SyncStatus::Local,
            updated_at,
        }
    }

    /// Create a record confirmed present on the server.
    #[must_use]
    pub fn synced(exercise_id: ExerciseId, updated_at: DateTime<Utc>) -> Self {
        Self {
            exercise_id,
            status: SyncStatus::Synced,
            updated_at,
        }
    }

    /// Whether this record is a pending delete awaiting confirmation.
    #[must_use]
    pub const fn is_tombstone(&self) -> bool {
        matches!(self.status, SyncStatus::DeleteOnSync)
    }
}

/// The server's view of one favorite, fetched as part of a full snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteFavorite {
    pub exercise_id: ExerciseId,
    pub updated_at: DateTime<Utc>,
}
