use std::path::Path;

use rusqlite::Connection;

use crate::error::AppError;

const SCHEMA_VERSION: i64 = 1;

const KV_ENTRIES_SQL: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../../migrations/0001_kv_entries.sql"
));

pub fn open(path: &Path) -> Result<Connection, AppError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| {
            AppError::new("DB_OPEN_FAILED", "Failed to create database directory")
                .with_details(format!("path={}; err={}", parent.display(), e))
        })?;
    }
    Connection::open(path).map_err(|e| {
        AppError::new("DB_OPEN_FAILED", "Failed to open SQLite database")
            .with_details(format!("path={}; err={}", path.display(), e))
    })
}

pub fn open_in_memory() -> Result<Connection, AppError> {
    Connection::open_in_memory().map_err(|e| {
        AppError::new("DB_OPEN_FAILED", "Failed to open in-memory SQLite database")
            .with_details(e.to_string())
    })
}

/// Brings the schema up to [`SCHEMA_VERSION`], tracked in SQLite's `user_version`.
pub fn migrate(conn: &mut Connection) -> Result<(), AppError> {
    let version: i64 = conn
        .query_row("PRAGMA user_version", [], |row| row.get(0))
        .map_err(|e| {
            AppError::new("DB_QUERY_FAILED", "Failed to read schema version")
                .with_details(e.to_string())
        })?;
    if version >= SCHEMA_VERSION {
        return Ok(());
    }
    log::debug!("upgrading schema from version {version} to {SCHEMA_VERSION}");

    let tx = conn.transaction().map_err(|e| {
        AppError::new("DB_MIGRATION_FAILED", "Failed to start migration transaction")
            .with_details(e.to_string())
    })?;
    tx.execute_batch(KV_ENTRIES_SQL)
        .and_then(|()| tx.pragma_update(None, "user_version", SCHEMA_VERSION))
        .map_err(|e| {
            AppError::new("DB_MIGRATION_FAILED", "Failed to create kv_entries table")
                .with_details(e.to_string())
        })?;
    tx.commit().map_err(|e| {
        AppError::new("DB_MIGRATION_FAILED", "Failed to commit migration transaction")
            .with_details(e.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::OptionalExtension;

    #[test]
    fn migrations_create_kv_table_once() {
        let mut conn = open_in_memory().expect("open");
        migrate(&mut conn).expect("migrate");
        migrate(&mut conn).expect("second migrate is a no-op");

        let name: Option<String> = conn
            .query_row(
                "SELECT name FROM sqlite_master WHERE type='table' AND name='kv_entries'",
                [],
                |row| row.get(0),
            )
            .optional()
            .unwrap();
        assert_eq!(name.as_deref(), Some("kv_entries"));

        let version: i64 = conn
            .query_row("PRAGMA user_version", [], |row| row.get(0))
            .unwrap();
        assert_eq!(version, SCHEMA_VERSION);
    }
}
