//! Local persistence layer for Liftmark

mod connection;
mod kv;
mod migrations;

pub use connection::Database;
pub use kv::{KvStore, MemoryKvStore, SqliteKvStore};
