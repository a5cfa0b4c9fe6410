//! Key-value blob storage primitive

use crate::error::{Error, Result};
use rusqlite::{params, Connection};
use std::collections::HashMap;
use std::sync::Mutex;

/// Trait for persistent string-blob storage by key.
///
/// An implementation may be unavailable or fail on any call (disabled
/// storage, quota, corruption). Callers that need never-fail semantics
/// catch and log instead of propagating (see `favorites::FavoriteStore`).
pub trait KvStore {
    /// Read the blob stored under `key`, `None` when absent
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any existing blob
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// `SQLite` implementation of `KvStore`
pub struct SqliteKvStore<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteKvStore<'a> {
    /// Create a new store with the given connection
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

impl KvStore for SqliteKvStore<'_> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let result = self.conn.query_row(
            "SELECT value FROM kv_store WHERE key = ?",
            params![key],
            |row| row.get(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv_store (key, value) VALUES (?, ?)",
            params![key, value],
        )?;
        Ok(())
    }
}

/// In-memory implementation of `KvStore` for disabled-storage mode and tests
#[derive(Default)]
pub struct MemoryKvStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryKvStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryKvStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self
            .entries
            .lock()
            .map_err(|error| Error::Storage(error.to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|error| Error::Storage(error.to_string()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_sqlite_get_missing_key() {
        let db = Database::open_in_memory().unwrap();
        let store = SqliteKvStore::new(db.connection());
        assert_eq!(store.get("absent").unwrap(), None);
    }

    #[test]
    fn test_sqlite_set_and_get() {
        let db = Database::open_in_memory().unwrap();
        let store = SqliteKvStore::new(db.connection());

        store.set("greeting", "hello").unwrap();
        assert_eq!(store.get("greeting").unwrap(), Some("hello".to_string()));
    }

    #[test]
    fn test_sqlite_set_replaces_existing() {
        let db = Database::open_in_memory().unwrap();
        let store = SqliteKvStore::new(db.connection());

        store.set("key", "first").unwrap();
        store.set("key", "second").unwrap();
        assert_eq!(store.get("key").unwrap(), Some("second".to_string()));
    }

    #[test]
    fn test_memory_store_round_trip() {
        let store = MemoryKvStore::new();
        assert_eq!(store.get("key").unwrap(), None);

        store.set("key", "value").unwrap();
        assert_eq!(store.get("key").unwrap(), Some("value".to_string()));
    }
}
