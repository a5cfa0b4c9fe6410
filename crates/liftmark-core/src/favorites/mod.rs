//! Local favorite store
//!
//! Durable, synchronous, offline-capable storage of the user's favorite
//! exercises between runs, independent of network availability. Operations
//! never raise: unreadable storage reads as an empty store and persistence
//! failures are logged.

use chrono::Utc;

use crate::db::KvStore;
use crate::models::{ExerciseId, FavoriteRecord, SyncStatus};

/// Storage key for the persisted favorite record list.
pub const FAVORITES_STORAGE_KEY: &str = "favorite_exercises";

/// The local favorite store, backed by a key-value blob primitive.
///
/// The persisted blob is a JSON list of records; see `FavoriteRecord` for
/// the wire shape. At most one record exists per exercise id.
pub struct FavoriteStore<S> {
    storage: S,
}

impl<S: KvStore> FavoriteStore<S> {
    pub const fn new(storage: S) -> Self {
        Self { storage }
    }

    /// All persisted records, tombstones included.
    ///
    /// Unavailable storage or an unparseable blob reads as an empty store.
    pub fn records(&self) -> Vec<FavoriteRecord> {
        let raw = match self.storage.get(FAVORITES_STORAGE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(error) => {
                tracing::warn!("Failed to read favorites: {error}");
                return Vec::new();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(records) => records,
            Err(error) => {
                tracing::warn!("Discarding unparseable favorites blob: {error}");
                Vec::new()
            }
        }
    }

    /// Active favorites in insertion order, excluding pending deletes.
    pub fn list(&self) -> Vec<ExerciseId> {
        self.records()
            .into_iter()
            .filter(|record| !record.is_tombstone())
            .map(|record| record.exercise_id)
            .collect()
    }

    /// Whether `exercise_id` is an active favorite (tombstones excluded).
    pub fn is_favorite(&self, exercise_id: &ExerciseId) -> bool {
        self.records()
            .iter()
            .any(|record| record.exercise_id == *exercise_id && !record.is_tombstone())
    }

    /// Add a favorite.
    ///
    /// Inserts a `Local` record when absent; resurrects a pending delete
    /// back to `Local`. No-op when the record is already `Local` or `Synced`.
    pub fn add(&self, exercise_id: &ExerciseId) {
        let mut records = self.records();
        let now = Utc::now();

        match records
            .iter_mut()
            .find(|record| record.exercise_id == *exercise_id)
        {
            None => records.push(FavoriteRecord::local(exercise_id.clone(), now)),
            Some(existing) if existing.is_tombstone() => {
                // Re-add cancels the pending delete
                existing.status = SyncStatus::Local;
                existing.updated_at = now;
            }
            Some(_) => return,
        }

        self.save_all(&records);
    }

    /// Remove a favorite.
    ///
    /// A `Local` record the server never saw is deleted outright; anything
    /// the server knows about becomes a tombstone with a refreshed
    /// timestamp. No-op when absent.
    pub fn remove(&self, exercise_id: &ExerciseId) {
        let mut records = self.records();
        let Some(index) = records
            .iter()
            .position(|record| record.exercise_id == *exercise_id)
        else {
            return;
        };

        if records[index].status == SyncStatus::Local {
            records.remove(index);
        } else {
            records[index].status = SyncStatus::DeleteOnSync;
            records[index].updated_at = Utc::now();
        }

        self.save_all(&records);
    }

    /// Flip the favorite state of `exercise_id` based on the active view.
    pub fn toggle(&self, exercise_id: &ExerciseId) {
        if self.is_favorite(exercise_id) {
            self.remove(exercise_id);
        } else {
            self.add(exercise_id);
        }
    }

    /// Replace the entire store contents in a single write.
    ///
    /// Persistence is best-effort; failures are logged, never propagated.
    pub fn save_all(&self, records: &[FavoriteRecord]) {
        let payload = match serde_json::to_string(records) {
            Ok(payload) => payload,
            Err(error) => {
                tracing::error!("Failed to serialize favorites: {error}");
                return;
            }
        };

        if let Err(error) = self.storage.set(FAVORITES_STORAGE_KEY, &payload) {
            tracing::error!("Failed to save favorites: {error}");
        }
    }
}
