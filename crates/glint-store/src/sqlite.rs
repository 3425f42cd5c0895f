use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;
use rusqlite::Connection;
use tracing::info;

use crate::error::StoreError;
use crate::record::{TakeoverRecord, KEY_PREFIX, RECORD_KEYS};
use crate::StateStore;

const PRAGMAS: &str = "PRAGMA journal_mode = WAL;
PRAGMA synchronous = NORMAL;";

const CREATE_TABLES: &str = "CREATE TABLE IF NOT EXISTS widget_state (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL
);";

/// SQLite-backed key-value store for the takeover record.
/// The mutex makes the connection shareable; rusqlite connections are not Sync.
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
    path: PathBuf,
}

impl SqliteStore {
    /// Open or create a store at the given path.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StoreError::Io(format!("create dir: {e}")))?;
        }

        let conn = Connection::open(path)
            .map_err(|e| StoreError::Database(e.to_string()))?;
        conn.execute_batch(PRAGMAS)
            .map_err(|e| StoreError::Database(format!("pragmas: {e}")))?;
        conn.execute_batch(CREATE_TABLES)
            .map_err(|e| StoreError::Database(format!("schema: {e}")))?;

        info!(path = %path.display(), "state store opened");

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            path: path.to_owned(),
        })
    }

    /// Open an in-memory store (for testing).
    pub fn in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| StoreError::Database(e.to_string()))?;
        conn.execute_batch(CREATE_TABLES)
            .map_err(|e| StoreError::Database(format!("schema: {e}")))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            path: PathBuf::from(":memory:"),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StateStore for SqliteStore {
    fn save(&self, record: &TakeoverRecord) -> Result<(), StoreError> {
        let now = Utc::now().to_rfc3339();
        let conn = self.conn.lock();
        for (key, value) in record.to_pairs() {
            conn.execute(
                "INSERT INTO widget_state (key, value, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET value = ?2, updated_at = ?3",
                rusqlite::params![key, value, now],
            )?;
        }
        Ok(())
    }

    fn load(&self) -> Result<Option<TakeoverRecord>, StoreError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT key, value FROM widget_state WHERE key LIKE ?1",
        )?;
        let rows = stmt
            .query_map([format!("{KEY_PREFIX}%")], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        TakeoverRecord::from_pairs(|key| {
            rows.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
        })
    }

    fn clear(&self) -> Result<(), StoreError> {
        let conn = self.conn.lock();
        for key in RECORD_KEYS {
            conn.execute("DELETE FROM widget_state WHERE key = ?1", [key])?;
        }
        Ok(())
    }
}

impl Clone for SqliteStore {
    fn clone(&self) -> Self {
        Self {
            conn: self.conn.clone(),
            path: self.path.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_load_clear_cycle() {
        let store = SqliteStore::in_memory().unwrap();
        assert!(store.load().unwrap().is_none());

        let record = TakeoverRecord::file("promo.html");
        store.save(&record).unwrap();
        assert_eq!(store.load().unwrap(), Some(record));

        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn save_overwrites_previous_record() {
        let store = SqliteStore::in_memory().unwrap();
        store.save(&TakeoverRecord::file("first.html")).unwrap();
        store.save(&TakeoverRecord::file("second.html")).unwrap();
        let record = store.load().unwrap().unwrap();
        assert_eq!(record.file_ref, "second.html");
    }

    #[test]
    fn clear_on_empty_store_is_ok() {
        let store = SqliteStore::in_memory().unwrap();
        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn open_file_store_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.db");

        {
            let store = SqliteStore::open(&path).unwrap();
            store.save(&TakeoverRecord::file("promo.html")).unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        let record = store.load().unwrap().unwrap();
        assert!(record.active);
        assert_eq!(record.file_ref, "promo.html");
    }

    #[test]
    fn foreign_keys_do_not_leak_into_record() {
        let store = SqliteStore::in_memory().unwrap();
        {
            let conn = store.conn.lock();
            conn.execute(
                "INSERT INTO widget_state (key, value, updated_at) VALUES ('other_key', 'x', '')",
                [],
            )
            .unwrap();
        }
        assert!(store.load().unwrap().is_none());
    }
}
