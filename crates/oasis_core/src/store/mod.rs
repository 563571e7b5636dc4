//! Key-value mirror of the state core's collections.
//!
//! Each collection is stored as one JSON array under its own key and rewritten wholesale on every
//! mutation. The store holds no authoritative copy; the state core does.

use std::collections::BTreeMap;
use std::path::Path;

use rusqlite::{Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::AppError;

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, AppError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), AppError>;
    fn remove(&mut self, key: &str) -> Result<(), AppError>;
}

/// SQLite-backed store; the on-device default.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self, AppError> {
        let mut conn = crate::db::open(path)?;
        crate::db::migrate(&mut conn)?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self, AppError> {
        let mut conn = crate::db::open_in_memory()?;
        crate::db::migrate(&mut conn)?;
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        self.conn
            .query_row(
                "SELECT value FROM kv_entries WHERE key = ?1",
                [key],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| {
                AppError::new("DB_QUERY_FAILED", "Failed to read stored entry")
                    .with_details(format!("key={key}; err={e}"))
            })
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), AppError> {
        self.conn
            .execute(
                r#"
      INSERT INTO kv_entries(key, value, updated_at)
      VALUES (?1, ?2, strftime('%Y-%m-%dT%H:%M:%fZ','now'))
      ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
      "#,
                [key, value],
            )
            .map(|_| ())
            .map_err(|e| {
                AppError::new("DB_WRITE_FAILED", "Failed to write stored entry")
                    .with_details(format!("key={key}; err={e}"))
                    .with_retryable(true)
            })
    }

    fn remove(&mut self, key: &str) -> Result<(), AppError> {
        self.conn
            .execute("DELETE FROM kv_entries WHERE key = ?1", [key])
            .map(|_| ())
            .map_err(|e| {
                AppError::new("DB_WRITE_FAILED", "Failed to remove stored entry")
                    .with_details(format!("key={key}; err={e}"))
                    .with_retryable(true)
            })
    }
}

/// Process-local store for tests and throwaway sessions.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), AppError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), AppError> {
        self.entries.remove(key);
        Ok(())
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), AppError> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), AppError> {
        (**self).remove(key)
    }
}

/// Result of reading one collection back from the store.
#[derive(Debug, Clone, PartialEq)]
pub enum Loaded<T> {
    Found(Vec<T>),
    Missing,
    Corrupt { details: String },
    Unreadable(AppError),
}

pub fn load_collection<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Loaded<T> {
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Loaded::Missing,
        Err(e) => return Loaded::Unreadable(e),
    };
    match serde_json::from_str::<Vec<T>>(&raw) {
        Ok(items) => Loaded::Found(items),
        Err(e) => Loaded::Corrupt {
            details: format!("key={key}; err={e}"),
        },
    }
}

pub fn save_collection<T: Serialize>(
    store: &mut dyn KeyValueStore,
    key: &str,
    items: &[T],
) -> Result<(), AppError> {
    let json = serde_json::to_string(items).map_err(|e| {
        AppError::new("STORE_SERIALIZE_FAILED", "Failed to serialize collection")
            .with_details(format!("key={key}; err={e}"))
    })?;
    store.set(key, &json)
}
