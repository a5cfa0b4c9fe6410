//! Data models for Liftmark

mod favorite;

pub use favorite::{ExerciseId, FavoriteRecord, RemoteFavorite, SyncStatus};
