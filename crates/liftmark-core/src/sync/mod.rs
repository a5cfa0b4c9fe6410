//! Favorites reconciliation between the local store and the remote service.
//!
//! The reconciler converges the two views with last-write-wins and tombstone
//! semantics, persists the converged set locally as `Synced`, then pushes it
//! upstream as a full replacement. Passes are idempotent and opportunistic;
//! a trigger that lands while a pass is in flight is dropped, not queued.

mod remote;

pub use remote::{ApiError, ApiResult, FavoritesApi, HttpFavoritesApi};

use std::collections::HashSet;
use std::sync::Mutex;

use chrono::Utc;

use crate::auth::AuthSession;
use crate::db::KvStore;
use crate::favorites::FavoriteStore;
use crate::models::{ExerciseId, FavoriteRecord, RemoteFavorite, SyncStatus};

/// Result of a single reconciliation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Local and remote converged on this set
    Completed { merged: Vec<ExerciseId> },
    /// No signed-in user; remote sync not attempted
    SkippedNoSession,
    /// Another pass is in flight; this trigger was dropped
    AlreadySyncing,
    /// Fetch or push failed; local state left as last computed
    Failed(String),
}

/// Queryable sync state for UI surfaces.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncState {
    pub is_syncing: bool,
    pub last_error: Option<String>,
}

/// Merge local favorite records with a remote snapshot.
///
/// A pending delete wins when the remote entry is missing or strictly older
/// than the tombstone; a delete that loses the comparison is cancelled and
/// the favorite stays in the merged set. Synced records the server no longer
/// holds are dropped, and remote entries the client never saw are added.
/// The result is deduplicated, preserving first-seen order.
#[must_use]
pub fn merge_favorites(local: &[FavoriteRecord], remote: &[RemoteFavorite]) -> Vec<ExerciseId> {
    let mut merged: Vec<ExerciseId> = local
        .iter()
        .map(|record| record.exercise_id.clone())
        .collect();

    for tombstone in local.iter().filter(|record| record.is_tombstone()) {
        let remote_match = remote
            .iter()
            .find(|entry| entry.exercise_id == tombstone.exercise_id);
        let delete_wins =
            remote_match.map_or(true, |entry| tombstone.updated_at > entry.updated_at);
        if delete_wins {
            merged.retain(|id| *id != tombstone.exercise_id);
        }
    }

    for record in local
        .iter()
        .filter(|record| record.status == SyncStatus::Synced)
    {
        let still_on_server = remote
            .iter()
            .any(|entry| entry.exercise_id == record.exercise_id);
        if !still_on_server {
            merged.retain(|id| *id != record.exercise_id);
        }
    }

    for entry in remote {
        let known_locally = local
            .iter()
            .any(|record| record.exercise_id == entry.exercise_id);
        if !known_locally {
            merged.push(entry.exercise_id.clone());
        }
    }

    let mut seen = HashSet::new();
    merged.retain(|id| seen.insert(id.clone()));
    merged
}

/// Reconciles the local favorite store against the remote service.
pub struct Synchronizer<'a, S, A> {
    store: &'a FavoriteStore<S>,
    api: &'a A,
    state: Mutex<SyncState>,
}

impl<'a, S: KvStore, A: FavoritesApi> Synchronizer<'a, S, A> {
    pub fn new(store: &'a FavoriteStore<S>, api: &'a A) -> Self {
        Self {
            store,
            api,
            state: Mutex::new(SyncState::default()),
        }
    }

    /// Last observed sync state.
    pub fn state(&self) -> SyncState {
        self.state
            .lock()
            .map(|state| state.clone())
            .unwrap_or_default()
    }

    /// Run one reconciliation pass for the given session.
    ///
    /// Failures are recorded in the sync state and reported as a non-fatal
    /// outcome; local state stays as last computed, safe to retry on the
    /// next trigger.
    pub async fn sync(&self, session: Option<&AuthSession>) -> SyncOutcome {
        let Some(session) = session else {
            return SyncOutcome::SkippedNoSession;
        };

        if !self.begin() {
            return SyncOutcome::AlreadySyncing;
        }

        let outcome = self.run_pass(&session.access_token).await;
        self.finish(&outcome);
        outcome
    }

    /// Push the current active set upstream without a reconcile pass.
    ///
    /// Best effort after a local mutation; failures are logged only.
    pub async fn push_local(&self, session: Option<&AuthSession>) {
        let Some(session) = session else { return };

        let active = self.store.list();
        if let Err(error) = self
            .api
            .replace_favorites(&session.access_token, &active)
            .await
        {
            tracing::warn!("Background favorites push failed: {error}");
        }
    }

    async fn run_pass(&self, access_token: &str) -> SyncOutcome {
        let remote = match self.api.fetch_favorites(access_token).await {
            Ok(remote) => remote,
            Err(error) => return SyncOutcome::Failed(error.to_string()),
        };

        let local = self.store.records();
        let merged = merge_favorites(&local, &remote);

        // Every surviving id is now server-confirmed from this client's view
        let now = Utc::now();
        let records: Vec<FavoriteRecord> = merged
            .iter()
            .map(|id| FavoriteRecord::synced(id.clone(), now))
            .collect();
        self.store.save_all(&records);

        if let Err(error) = self.api.replace_favorites(access_token, &merged).await {
            return SyncOutcome::Failed(error.to_string());
        }

        SyncOutcome::Completed { merged }
    }

    fn begin(&self) -> bool {
        let Ok(mut state) = self.state.lock() else {
            return false;
        };
        if state.is_syncing {
            return false;
        }
        state.is_syncing = true;
        state.last_error = None;
        true
    }

    fn finish(&self, outcome: &SyncOutcome) {
        if let Ok(mut state) = self.state.lock() {
            state.is_syncing = false;
            if let SyncOutcome::Failed(message) = outcome {
                tracing::warn!("Favorites sync failed: {message}");
                state.last_error = Some(message.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthUser;
    use crate::db::MemoryKvStore;
    use chrono::{DateTime, TimeZone};
    use pretty_assertions::assert_eq;

    struct FakeApi {
        favorites: Mutex<Vec<RemoteFavorite>>,
        pushed: Mutex<Vec<Vec<ExerciseId>>>,
        fail_fetch: bool,
        fail_push: bool,
    }

    impl FakeApi {
        fn with_favorites(favorites: Vec<RemoteFavorite>) -> Self {
            Self {
                favorites: Mutex::new(favorites),
                pushed: Mutex::new(Vec::new()),
                fail_fetch: false,
                fail_push: false,
            }
        }

        fn pushed(&self) -> Vec<Vec<ExerciseId>> {
            self.pushed.lock().unwrap().clone()
        }
    }

    impl FavoritesApi for FakeApi {
        async fn fetch_favorites(&self, _access_token: &str) -> ApiResult<Vec<RemoteFavorite>> {
            if self.fail_fetch {
                return Err(ApiError::Api("fetch unavailable (503)".to_string()));
            }
            Ok(self.favorites.lock().unwrap().clone())
        }

        async fn replace_favorites(
            &self,
            _access_token: &str,
            exercise_ids: &[ExerciseId],
        ) -> ApiResult<()> {
            if self.fail_push {
                return Err(ApiError::Api("push unavailable (503)".to_string()));
            }

            // Full-replace semantics: the snapshot becomes the pushed set
            *self.favorites.lock().unwrap() = exercise_ids
                .iter()
                .map(|id| remote(id.as_str(), at(23)))
                .collect();
            self.pushed.lock().unwrap().push(exercise_ids.to_vec());
            Ok(())
        }
    }

    fn session() -> AuthSession {
        AuthSession {
            access_token: "token".to_string(),
            refresh_token: "refresh".to_string(),
            expires_at: i64::MAX,
            user: AuthUser {
                id: "user-1".to_string(),
                email: None,
            },
        }
    }

    fn id(raw: &str) -> ExerciseId {
        ExerciseId::new(raw)
    }

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, hour, 0, 0).unwrap()
    }

    fn tombstone(raw: &str, updated_at: DateTime<Utc>) -> FavoriteRecord {
        FavoriteRecord {
            exercise_id: id(raw),
            status: SyncStatus::DeleteOnSync,
            updated_at,
        }
    }

    fn remote(raw: &str, updated_at: DateTime<Utc>) -> RemoteFavorite {
        RemoteFavorite {
            exercise_id: id(raw),
            updated_at,
        }
    }

    #[test]
    fn merge_server_deletion_wins_over_synced_record() {
        let local = vec![FavoriteRecord::synced(id("a"), at(10))];
        assert_eq!(merge_favorites(&local, &[]), Vec::<ExerciseId>::new());
    }

    #[test]
    fn merge_adds_remote_only_favorites() {
        let remote_set = vec![remote("b", at(10))];
        assert_eq!(merge_favorites(&[], &remote_set), vec![id("b")]);
    }

    #[test]
    fn merge_keeps_never_synced_local_favorites() {
        let local = vec![FavoriteRecord::local(id("x"), at(10))];
        assert_eq!(merge_favorites(&local, &[]), vec![id("x")]);
    }

    #[test]
    fn merge_newer_tombstone_wins() {
        let local = vec![tombstone("c", at(12))];
        let remote_set = vec![remote("c", at(10))];
        assert_eq!(merge_favorites(&local, &remote_set), Vec::<ExerciseId>::new());
    }

    #[test]
    fn merge_tombstone_without_remote_match_wins() {
        let local = vec![tombstone("c", at(10))];
        assert_eq!(merge_favorites(&local, &[]), Vec::<ExerciseId>::new());
    }

    // Chosen policy for the ambiguous losing-delete case: the delete is
    // cancelled in the same pass and the favorite is retained (the server's
    // newer write wins in both directions). See DESIGN.md.
    #[test]
    fn merge_stale_tombstone_is_cancelled() {
        let local = vec![tombstone("c", at(10))];
        let remote_set = vec![remote("c", at(12))];
        assert_eq!(merge_favorites(&local, &remote_set), vec![id("c")]);
    }

    #[test]
    fn merge_tie_timestamp_cancels_delete() {
        // "Strictly newer" wins; a tie is not newer
        let local = vec![tombstone("c", at(10))];
        let remote_set = vec![remote("c", at(10))];
        assert_eq!(merge_favorites(&local, &remote_set), vec![id("c")]);
    }

    #[test]
    fn merge_deduplicates_preserving_order() {
        let local = vec![
            FavoriteRecord::synced(id("a"), at(10)),
            FavoriteRecord::local(id("b"), at(10)),
        ];
        let remote_set = vec![remote("a", at(10)), remote("c", at(10))];
        assert_eq!(
            merge_favorites(&local, &remote_set),
            vec![id("a"), id("b"), id("c")]
        );
    }

    #[test]
    fn merge_is_idempotent_over_synced_state() {
        let remote_set = vec![remote("a", at(10)), remote("b", at(10))];
        let first = merge_favorites(&[], &remote_set);

        // State after a pass: every merged id persisted as Synced
        let local: Vec<FavoriteRecord> = first
            .iter()
            .map(|id| FavoriteRecord::synced(id.clone(), at(11)))
            .collect();
        let second = merge_favorites(&local, &remote_set);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn sync_without_session_is_skipped() {
        let store = FavoriteStore::new(MemoryKvStore::new());
        let api = FakeApi::with_favorites(Vec::new());
        let synchronizer = Synchronizer::new(&store, &api);

        let outcome = synchronizer.sync(None).await;
        assert_eq!(outcome, SyncOutcome::SkippedNoSession);
        assert!(api.pushed().is_empty());
    }

    #[tokio::test]
    async fn sync_persists_merged_set_as_synced_and_pushes() {
        let store = FavoriteStore::new(MemoryKvStore::new());
        store.add(&id("bench-press"));

        let api = FakeApi::with_favorites(vec![remote("squat", at(10))]);
        let synchronizer = Synchronizer::new(&store, &api);

        let outcome = synchronizer.sync(Some(&session())).await;
        assert_eq!(
            outcome,
            SyncOutcome::Completed {
                merged: vec![id("bench-press"), id("squat")]
            }
        );

        let records = store.records();
        assert_eq!(records.len(), 2);
        assert!(records
            .iter()
            .all(|record| record.status == SyncStatus::Synced));

        assert_eq!(api.pushed(), vec![vec![id("bench-press"), id("squat")]]);
        assert_eq!(synchronizer.state(), SyncState::default());
    }

    #[tokio::test]
    async fn sync_twice_converges_to_same_set() {
        let store = FavoriteStore::new(MemoryKvStore::new());
        store.add(&id("bench-press"));

        let api = FakeApi::with_favorites(vec![remote("squat", at(10))]);
        let synchronizer = Synchronizer::new(&store, &api);

        let first = synchronizer.sync(Some(&session())).await;
        let second = synchronizer.sync(Some(&session())).await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn fetch_failure_records_error_and_keeps_local_state() {
        let store = FavoriteStore::new(MemoryKvStore::new());
        store.add(&id("bench-press"));
        let before = store.records();

        let mut api = FakeApi::with_favorites(Vec::new());
        api.fail_fetch = true;
        let synchronizer = Synchronizer::new(&store, &api);

        let outcome = synchronizer.sync(Some(&session())).await;
        assert!(matches!(outcome, SyncOutcome::Failed(_)));
        assert_eq!(store.records(), before);

        let state = synchronizer.state();
        assert!(!state.is_syncing);
        assert!(state.last_error.is_some());
    }

    #[tokio::test]
    async fn push_failure_keeps_locally_converged_state() {
        let store = FavoriteStore::new(MemoryKvStore::new());
        store.add(&id("bench-press"));

        let mut api = FakeApi::with_favorites(Vec::new());
        api.fail_push = true;
        let synchronizer = Synchronizer::new(&store, &api);

        let outcome = synchronizer.sync(Some(&session())).await;
        assert!(matches!(outcome, SyncOutcome::Failed(_)));

        // No rollback: the merged set stays persisted as Synced
        let records = store.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, SyncStatus::Synced);
    }

    #[tokio::test]
    async fn retry_after_failure_clears_error() {
        let store = FavoriteStore::new(MemoryKvStore::new());

        let mut api = FakeApi::with_favorites(Vec::new());
        api.fail_fetch = true;
        let synchronizer = Synchronizer::new(&store, &api);
        let outcome = synchronizer.sync(Some(&session())).await;
        assert!(matches!(outcome, SyncOutcome::Failed(_)));

        let api = FakeApi::with_favorites(Vec::new());
        let synchronizer = Synchronizer::new(&store, &api);
        let outcome = synchronizer.sync(Some(&session())).await;
        assert_eq!(outcome, SyncOutcome::Completed { merged: Vec::new() });
        assert_eq!(synchronizer.state().last_error, None);
    }

    #[tokio::test]
    async fn pending_delete_round_trip_removes_remote_favorite() {
        let store = FavoriteStore::new(MemoryKvStore::new());
        // Server knows about "row"; the user unfavorites it offline
        store.save_all(&[FavoriteRecord::synced(id("row"), at(10))]);
        store.remove(&id("row"));

        let api = FakeApi::with_favorites(vec![remote("row", at(9))]);
        let synchronizer = Synchronizer::new(&store, &api);

        let outcome = synchronizer.sync(Some(&session())).await;
        assert_eq!(outcome, SyncOutcome::Completed { merged: Vec::new() });
        assert!(store.records().is_empty());
        assert_eq!(api.pushed(), vec![Vec::<ExerciseId>::new()]);
    }

    #[tokio::test]
    async fn push_local_sends_active_set_only() {
        let store = FavoriteStore::new(MemoryKvStore::new());
        store.save_all(&[FavoriteRecord::synced(id("row"), at(10))]);
        store.add(&id("bench-press"));
        store.remove(&id("row"));

        let api = FakeApi::with_favorites(Vec::new());
        let synchronizer = Synchronizer::new(&store, &api);

        synchronizer.push_local(Some(&session())).await;
        assert_eq!(api.pushed(), vec![vec![id("bench-press")]]);
    }

    #[tokio::test]
    async fn push_local_without_session_is_noop() {
        let store = FavoriteStore::new(MemoryKvStore::new());
        store.add(&id("bench-press"));

        let api = FakeApi::with_favorites(Vec::new());
        let synchronizer = Synchronizer::new(&store, &api);

        synchronizer.push_local(None).await;
        assert!(api.pushed().is_empty());
    }
}
