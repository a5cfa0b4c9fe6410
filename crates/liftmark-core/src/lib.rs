//! liftmark-core - Core library for Liftmark
//!
//! This crate contains the shared models, local persistence layer, and
//! favorites sync logic used by all Liftmark interfaces.

pub mod auth;
pub mod db;
pub mod error;
pub mod favorites;
pub mod heart_rate;
pub mod heatmap;
pub mod models;
pub mod release_notes;
pub mod sync;
pub mod util;

pub use error::{Error, Result};
pub use models::{ExerciseId, FavoriteRecord, RemoteFavorite, SyncStatus};
