use rusqlite::{params, OptionalExtension};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

use crate::state::DbPool;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("SQL error: {0}")]
    Sql(#[from] rusqlite::Error),

    #[error("Storage lock poisoned")]
    Poisoned,
}

/// Browser-style string key/value storage.
///
/// Batch operations must apply all-or-nothing; the session store relies on
/// that to keep token and role in step.
pub trait LocalStorage: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set_items(&self, items: &[(&str, &str)]) -> Result<(), StorageError>;

    fn remove_items(&self, keys: &[&str]) -> Result<(), StorageError>;

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.set_items(&[(key, value)])
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.remove_items(&[key])
    }
}

/// In-memory storage, shared between clones.
#[derive(Clone, Debug, Default)]
pub struct MemoryStorage {
    items: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.lock().map(|items| items.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl LocalStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let items = self.items.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(items.get(key).cloned())
    }

    fn set_items(&self, pairs: &[(&str, &str)]) -> Result<(), StorageError> {
        let mut items = self.items.lock().map_err(|_| StorageError::Poisoned)?;
        for (key, value) in pairs {
            items.insert(key.to_string(), value.to_string());
        }
        Ok(())
    }

    fn remove_items(&self, keys: &[&str]) -> Result<(), StorageError> {
        let mut items = self.items.lock().map_err(|_| StorageError::Poisoned)?;
        for key in keys {
            items.remove(*key);
        }
        Ok(())
    }
}

/// SQLite-backed storage scoped to one browser id.
#[derive(Clone)]
pub struct SqliteStorage {
    pool: DbPool,
    browser_id: String,
}

impl SqliteStorage {
    pub fn new(pool: DbPool, browser_id: impl Into<String>) -> Self {
        Self {
            pool,
            browser_id: browser_id.into(),
        }
    }

    pub fn browser_id(&self) -> &str {
        &self.browser_id
    }
}

impl LocalStorage for SqliteStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let conn = self.pool.get()?;
        let value = conn
            .query_row(
                "SELECT value FROM local_storage WHERE browser_id = ?1 AND key = ?2",
                params![self.browser_id, key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set_items(&self, items: &[(&str, &str)]) -> Result<(), StorageError> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;
        for (key, value) in items {
            tx.execute(
                "INSERT INTO local_storage (browser_id, key, value) VALUES (?1, ?2, ?3)
                 ON CONFLICT(browser_id, key) DO UPDATE
                 SET value = excluded.value, updated_at = datetime('now')",
                params![self.browser_id, key, value],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    fn remove_items(&self, keys: &[&str]) -> Result<(), StorageError> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;
        for key in keys {
            tx.execute(
                "DELETE FROM local_storage WHERE browser_id = ?1 AND key = ?2",
                params![self.browser_id, key],
            )?;
        }
        tx.commit()?;
        Ok(())
    }
}
