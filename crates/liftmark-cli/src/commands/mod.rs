pub mod auth_cmd;
pub mod changelog;
pub mod common;
pub mod completions;
pub mod config;
pub mod favorites;
pub mod stats;
pub mod sync;
pub mod zones;
