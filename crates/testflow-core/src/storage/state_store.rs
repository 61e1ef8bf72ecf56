//! Persistence adapter for the wizard state.
//!
//! The controller hands over an already-serialized blob and reads it back
//! verbatim; parsing (and recovery from a corrupt blob) is the controller's
//! job. Writes are synchronous so nothing is lost when the process exits
//! right after an action.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::{params, Connection};

use super::data_dir;
use crate::error::StorageError;

/// Fixed application-scoped key of the persisted record.
pub const DEFAULT_STATE_KEY: &str = "testingState";

/// Load/save/clear of a single persisted record.
pub trait StatePersistence {
    fn load_state(&self) -> Result<Option<String>, StorageError>;

    fn save_state(&self, blob: &str) -> Result<(), StorageError>;

    fn clear_state(&self) -> Result<(), StorageError>;
}

/// SQLite key-value store holding the state under one key.
pub struct SqliteStateStore {
    conn: Connection,
    key: String,
}

impl SqliteStateStore {
    /// Open `~/.config/testflow/testflow.db`.
    ///
    /// # Errors
    /// Returns an error if the data directory or database cannot be opened.
    pub fn open(key: &str) -> Result<Self, StorageError> {
        let path = data_dir()?.join("testflow.db");
        Self::open_at(&path, key)
    }

    /// Open (and create) the database at `path`.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open_at(path: &Path, key: &str) -> Result<Self, StorageError> {
        let conn = Connection::open(path).map_err(|source| StorageError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let store = Self {
            conn,
            key: key.to_string(),
        };
        store.migrate()?;
        Ok(store)
    }

    /// Open an in-memory database.
    pub fn open_memory(key: &str) -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn,
            key: key.to_string(),
        };
        store.migrate()?;
        Ok(store)
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )
    }
}

impl StatePersistence for SqliteStateStore {
    fn load_state(&self) -> Result<Option<String>, StorageError> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let result = stmt.query_row(params![self.key], |row| row.get::<_, String>(0));
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save_state(&self, blob: &str) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![self.key, blob],
        )?;
        Ok(())
    }

    fn clear_state(&self) -> Result<(), StorageError> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![self.key])?;
        Ok(())
    }
}

/// In-memory store for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    blob: Mutex<Option<String>>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with `blob` already stored, as if left by an earlier run.
    pub fn with_blob(blob: impl Into<String>) -> Self {
        Self {
            blob: Mutex::new(Some(blob.into())),
        }
    }

    pub fn snapshot(&self) -> Option<String> {
        self.blob.lock().ok().and_then(|b| b.clone())
    }
}

impl StatePersistence for MemoryStateStore {
    fn load_state(&self) -> Result<Option<String>, StorageError> {
        Ok(self.snapshot())
    }

    fn save_state(&self, blob: &str) -> Result<(), StorageError> {
        if let Ok(mut slot) = self.blob.lock() {
            *slot = Some(blob.to_string());
        }
        Ok(())
    }

    fn clear_state(&self) -> Result<(), StorageError> {
        if let Ok(mut slot) = self.blob.lock() {
            *slot = None;
        }
        Ok(())
    }
}

impl<P: StatePersistence + ?Sized> StatePersistence for &P {
    fn load_state(&self) -> Result<Option<String>, StorageError> {
        (**self).load_state()
    }

    fn save_state(&self, blob: &str) -> Result<(), StorageError> {
        (**self).save_state(blob)
    }

    fn clear_state(&self) -> Result<(), StorageError> {
        (**self).clear_state()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sqlite_store_roundtrip() {
        let store = SqliteStateStore::open_memory(DEFAULT_STATE_KEY).unwrap();
        assert!(store.load_state().unwrap().is_none());
        store.save_state("{\"a\":1}").unwrap();
        store.save_state("{\"a\":2}").unwrap();
        assert_eq!(store.load_state().unwrap().as_deref(), Some("{\"a\":2}"));
        store.clear_state().unwrap();
        assert!(store.load_state().unwrap().is_none());
    }

    #[test]
    fn memory_store_roundtrip() {
        let store = MemoryStateStore::with_blob("x");
        assert_eq!(store.load_state().unwrap().as_deref(), Some("x"));
        store.clear_state().unwrap();
        assert!(store.load_state().unwrap().is_none());
    }

    #[test]
    fn borrowed_store_shares_state() {
        let store = MemoryStateStore::new();
        let borrowed = &store;
        borrowed.save_state("y").unwrap();
        assert_eq!(store.snapshot().as_deref(), Some("y"));
    }
}
