use std::path::Path;

use chrono::Utc;
use serde::Serialize;

use liftmark_core::db::{Database, SqliteKvStore};
use liftmark_core::favorites::FavoriteStore;
use liftmark_core::models::{ExerciseId, SyncStatus};
use liftmark_core::sync::{HttpFavoritesApi, Synchronizer};

use crate::commands::common::{format_relative_time, open_database, resolve_remote_context};
use crate::error::CliError;

pub async fn run_add(
    exercise_id: &str,
    db_path: &Path,
    global_profile: Option<&str>,
) -> Result<(), CliError> {
    let exercise_id = normalize_exercise_id(exercise_id)?;
    let db = open_database(db_path)?;
    let store = FavoriteStore::new(SqliteKvStore::new(db.connection()));

    store.add(&exercise_id);
    println!("{exercise_id}");

    push_in_background(&db, global_profile).await;
    Ok(())
}

pub async fn run_remove(
    exercise_id: &str,
    db_path: &Path,
    global_profile: Option<&str>,
) -> Result<(), CliError> {
    let exercise_id = normalize_exercise_id(exercise_id)?;
    let db = open_database(db_path)?;
    let store = FavoriteStore::new(SqliteKvStore::new(db.connection()));

    store.remove(&exercise_id);
    println!("{exercise_id}");

    push_in_background(&db, global_profile).await;
    Ok(())
}

pub async fn run_toggle(
    exercise_id: &str,
    db_path: &Path,
    global_profile: Option<&str>,
) -> Result<(), CliError> {
    let exercise_id = normalize_exercise_id(exercise_id)?;
    let db = open_database(db_path)?;
    let store = FavoriteStore::new(SqliteKvStore::new(db.connection()));

    store.toggle(&exercise_id);
    let state = if store.is_favorite(&exercise_id) {
        "favorited"
    } else {
        "unfavorited"
    };
    println!("{exercise_id} {state}");

    push_in_background(&db, global_profile).await;
    Ok(())
}

#[derive(Debug, Serialize)]
struct FavoriteListItem {
    exercise_id: String,
    status: SyncStatus,
    updated_at: String,
    relative_time: String,
}

pub fn run_list(all: bool, as_json: bool, db_path: &Path) -> Result<(), CliError> {
    let db = open_database(db_path)?;
    let store = FavoriteStore::new(SqliteKvStore::new(db.connection()));

    if !all {
        let favorites = store.list();
        if as_json {
            let ids: Vec<&str> = favorites.iter().map(ExerciseId::as_str).collect();
            println!("{}", serde_json::to_string_pretty(&ids)?);
        } else {
            for exercise_id in favorites {
                println!("{exercise_id}");
            }
        }
        return Ok(());
    }

    let now = Utc::now();
    let records = store.records();

    if as_json {
        let items: Vec<FavoriteListItem> = records
            .iter()
            .map(|record| FavoriteListItem {
                exercise_id: record.exercise_id.to_string(),
                status: record.status,
                updated_at: record.updated_at.to_rfc3339(),
                relative_time: format_relative_time(record.updated_at, now),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&items)?);
    } else {
        for record in &records {
            println!(
                "{:<30}  {:<12}  {}",
                record.exercise_id.to_string(),
                status_label(record.status),
                format_relative_time(record.updated_at, now)
            );
        }
    }

    Ok(())
}

const fn status_label(status: SyncStatus) -> &'static str {
    match status {
        SyncStatus::Local => "local",
        SyncStatus::Synced => "synced",
        SyncStatus::DeleteOnSync => "delete-on-sync",
    }
}

/// Best-effort push of the active set after a local mutation.
///
/// Mirrors the optimistic-UI contract: the local mutation already
/// succeeded, so remote failures are logged and swallowed.
async fn push_in_background(db: &Database, global_profile: Option<&str>) {
    let context = match resolve_remote_context(global_profile).await {
        Ok(Some(context)) => context,
        Ok(None) => return,
        Err(error) => {
            tracing::warn!("Skipping background push: {error}");
            return;
        }
    };

    let api = match HttpFavoritesApi::new(&context.api_base_url) {
        Ok(api) => api,
        Err(error) => {
            tracing::warn!("Skipping background push: {error}");
            return;
        }
    };

    let store = FavoriteStore::new(SqliteKvStore::new(db.connection()));
    let synchronizer = Synchronizer::new(&store, &api);
    synchronizer.push_local(Some(&context.session)).await;
}

fn normalize_exercise_id(raw: &str) -> Result<ExerciseId, CliError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        Err(CliError::EmptyExerciseId)
    } else {
        Ok(ExerciseId::new(trimmed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_exercise_id_rejects_empty() {
        assert!(matches!(
            normalize_exercise_id(" \n "),
            Err(CliError::EmptyExerciseId)
        ));
        assert_eq!(
            normalize_exercise_id("  bench-press  ").unwrap(),
            ExerciseId::new("bench-press")
        );
    }

    #[test]
    fn status_labels_are_stable() {
        assert_eq!(status_label(SyncStatus::Local), "local");
        assert_eq!(status_label(SyncStatus::Synced), "synced");
        assert_eq!(status_label(SyncStatus::DeleteOnSync), "delete-on-sync");
    }
}
