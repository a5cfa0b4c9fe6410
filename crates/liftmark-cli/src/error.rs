use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] liftmark_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("Exercise ID cannot be empty")]
    EmptyExerciseId,
    #[error("Invalid date (expected YYYY-MM-DD): {0}")]
    InvalidDate(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Authentication error: {0}")]
    Auth(String),
    #[error("Sync failed: {0}")]
    Sync(String),
    #[error(
        "Sync is not configured. Run `liftmark config init --api-base-url <URL>` and `liftmark auth login` first."
    )]
    SyncNotConfigured,
}
