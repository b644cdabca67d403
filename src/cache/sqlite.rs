use crate::cache::KeyValueStore;
use crate::error::{ChatdeskError, Result};
use anyhow::Context;
use chrono::Utc;
use directories::ProjectDirs;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};

/// Disk-backed key-value store for the local message cache
pub struct SqliteStore {
    db_path: PathBuf,
}

impl SqliteStore {
    /// Open the store in the user's data directory
    ///
    /// `CHATDESK_CACHE_DB` overrides the location, which keeps tests and
    /// scripted runs away from the real cache file.
    pub fn new() -> Result<Self> {
        if let Ok(override_path) = std::env::var("CHATDESK_CACHE_DB") {
            return Self::new_with_path(override_path);
        }

        let proj_dirs = ProjectDirs::from("com", "chatdesk", "chatdesk")
            .ok_or_else(|| ChatdeskError::Cache("Could not determine data directory".into()))?;

        let data_dir = proj_dirs.data_dir();
        std::fs::create_dir_all(data_dir)
            .context("Failed to create data directory")
            .map_err(|e| ChatdeskError::Cache(e.to_string()))?;

        Self::new_with_path(data_dir.join("cache.db"))
    }

    /// Open the store at a specific database path
    ///
    /// # Examples
    ///
    /// ```
    /// use chatdesk::cache::{KeyValueStore, SqliteStore};
    ///
    /// let dir = tempfile::tempdir().unwrap();
    /// let store = SqliteStore::new_with_path(dir.path().join("cache.db")).unwrap();
    /// store.set("k", "[]").unwrap();
    /// assert_eq!(store.get("k").unwrap().as_deref(), Some("[]"));
    /// ```
    pub fn new_with_path<P: Into<PathBuf>>(db_path: P) -> Result<Self> {
        let db_path = db_path.into();

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .context("Failed to create parent directory for database")
                .map_err(|e| ChatdeskError::Cache(e.to_string()))?;
        }

        let store = Self { db_path };
        store.init()?;
        Ok(store)
    }

    /// Location of the database file
    pub fn path(&self) -> &Path {
        &self.db_path
    }

    fn open(&self) -> Result<Connection> {
        Connection::open(&self.db_path)
            .context("Failed to open database")
            .map_err(|e| ChatdeskError::Cache(e.to_string()).into())
    }

    fn init(&self) -> Result<()> {
        let conn = self.open()?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS local_cache (
                key TEXT PRIMARY KEY,
                value JSON NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )
        .context("Failed to create tables")
        .map_err(|e| ChatdeskError::Cache(e.to_string()))?;
        Ok(())
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let conn = self.open()?;
        let value = conn
            .query_row(
                "SELECT value FROM local_cache WHERE key = ?",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .context("Failed to query cache entry")
            .map_err(|e| ChatdeskError::Cache(e.to_string()))?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.open()?;
        conn.execute(
            "INSERT INTO local_cache (key, value, updated_at) VALUES (?, ?, ?)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, Utc::now().to_rfc3339()],
        )
        .context("Failed to write cache entry")
        .map_err(|e| ChatdeskError::Cache(e.to_string()))?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let conn = self.open()?;
        conn.execute("DELETE FROM local_cache WHERE key = ?", params![key])
            .context("Failed to delete cache entry")
            .map_err(|e| ChatdeskError::Cache(e.to_string()))?;
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        let conn = self.open()?;
        let mut stmt = conn
            .prepare("SELECT key FROM local_cache ORDER BY updated_at DESC")
            .context("Failed to prepare statement")
            .map_err(|e| ChatdeskError::Cache(e.to_string()))?;

        let keys = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .context("Failed to query cache keys")
            .map_err(|e| ChatdeskError::Cache(e.to_string()))?
            .flatten()
            .collect();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::tempdir;

    fn create_test_store() -> (SqliteStore, tempfile::TempDir) {
        let dir = tempdir().expect("failed to create tempdir");
        let store =
            SqliteStore::new_with_path(dir.path().join("cache.db")).expect("failed to create store");
        (store, dir)
    }

    #[test]
    fn test_init_creates_table() {
        let (store, _dir) = create_test_store();
        let conn = Connection::open(store.path()).expect("open connection");
        let count: i64 = conn
            .query_row(
                "SELECT count(*) FROM sqlite_master WHERE type='table' AND name='local_cache'",
                [],
                |r| r.get(0),
            )
            .expect("query row");
        assert_eq!(count, 1);
    }

    #[test]
    fn test_get_missing_key_returns_none() {
        let (store, _dir) = create_test_store();
        assert!(store.get("absent").unwrap().is_none());
    }

    #[test]
    fn test_set_overwrites_existing_value() {
        let (store, _dir) = create_test_store();
        store.set("k", "[1]").unwrap();
        store.set("k", "[1,2]").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("[1,2]"));
        assert_eq!(store.keys().unwrap(), vec!["k".to_string()]);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let (store, _dir) = create_test_store();
        store.set("k", "[]").unwrap();
        store.remove("k").unwrap();
        store.remove("k").unwrap();
        assert!(store.get("k").unwrap().is_none());
    }

    #[test]
    fn test_values_survive_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache.db");
        SqliteStore::new_with_path(&path)
            .unwrap()
            .set("k", "[\"x\"]")
            .unwrap();
        let reopened = SqliteStore::new_with_path(&path).unwrap();
        assert_eq!(reopened.get("k").unwrap().as_deref(), Some("[\"x\"]"));
    }

    #[test]
    #[serial]
    fn test_new_respects_env_override() {
        let dir = tempdir().expect("failed to create tempdir");
        let db_path = dir.path().join("nested").join("cache.db");
        std::env::set_var("CHATDESK_CACHE_DB", db_path.to_string_lossy().to_string());

        let store = SqliteStore::new().expect("new failed with env override");
        assert_eq!(store.path(), db_path.as_path());
        assert!(db_path.parent().unwrap().exists());

        std::env::remove_var("CHATDESK_CACHE_DB");
    }
}
