use std::path::Path;

use liftmark_core::db::SqliteKvStore;
use liftmark_core::favorites::FavoriteStore;
use liftmark_core::sync::{HttpFavoritesApi, SyncOutcome, Synchronizer};

use crate::commands::common::{open_database, resolve_remote_context};
use crate::error::CliError;

pub async fn run_sync(db_path: &Path, global_profile: Option<&str>) -> Result<(), CliError> {
    let Some(context) = resolve_remote_context(global_profile).await? else {
        return Err(CliError::SyncNotConfigured);
    };

    let api = HttpFavoritesApi::new(&context.api_base_url)
        .map_err(|error| CliError::Sync(error.to_string()))?;
    let db = open_database(db_path)?;
    let store = FavoriteStore::new(SqliteKvStore::new(db.connection()));
    let synchronizer = Synchronizer::new(&store, &api);

    match synchronizer.sync(Some(&context.session)).await {
        SyncOutcome::Completed { merged } => {
            println!("Sync completed ({} favorites)", merged.len());
            Ok(())
        }
        SyncOutcome::AlreadySyncing => {
            println!("Sync already in progress");
            Ok(())
        }
        SyncOutcome::SkippedNoSession => Err(CliError::SyncNotConfigured),
        SyncOutcome::Failed(message) => Err(CliError::Sync(message)),
    }
}
