//! SQLite inventory store utilities.
//!
//! Runtime defaults are intentionally conservative:
//! - `journal_mode = WAL` to allow concurrent readers while writers commit
//! - `busy_timeout = 5s` to reduce transient lock failures under contention
//! - `foreign_keys = ON` so user/category deletion cascades to items

pub mod categories;
pub mod items;
pub mod migrations;
pub mod schema;
pub mod users;

use anyhow::{Context, Result};
use rusqlite::Connection;
use std::{path::Path, time::Duration};

/// Busy timeout used for store connections.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Open (or create) the inventory store, apply runtime pragmas, and migrate
/// schema to the latest version.
///
/// # Errors
///
/// Returns an error if opening/configuring/migrating the database fails.
pub fn open_store(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create store directory {}", parent.display()))?;
    }

    let mut conn = Connection::open(path)
        .with_context(|| format!("open inventory store {}", path.display()))?;

    configure_connection(&conn).context("configure sqlite pragmas")?;
    migrations::migrate(&mut conn).context("apply store migrations")?;

    Ok(conn)
}

/// Open a fully migrated in-memory store. Intended for tests and tooling.
///
/// # Errors
///
/// Returns an error if configuring or migrating the database fails.
pub fn open_memory_store() -> Result<Connection> {
    let mut conn = Connection::open_in_memory().context("open in-memory store")?;
    configure_connection(&conn).context("configure sqlite pragmas")?;
    migrations::migrate(&mut conn).context("apply store migrations")?;
    Ok(conn)
}

fn configure_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.pragma_update(None, "foreign_keys", "ON")?;
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    let _journal_mode: String =
        conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))?;
    conn.busy_timeout(DEFAULT_BUSY_TIMEOUT)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{DEFAULT_BUSY_TIMEOUT, open_store};
    use crate::db::migrations;
    use tempfile::TempDir;

    fn temp_db_path() -> (TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("larder.sqlite3");
        (dir, path)
    }

    #[test]
    fn open_store_sets_wal_busy_timeout_and_fk() {
        let (_dir, path) = temp_db_path();
        let conn = open_store(&path).expect("open store");

        let journal_mode: String = conn
            .pragma_query_value(None, "journal_mode", |row| row.get(0))
            .expect("query journal_mode");
        assert_eq!(journal_mode.to_ascii_lowercase(), "wal");

        let busy_timeout_ms: u64 = conn
            .pragma_query_value(None, "busy_timeout", |row| row.get(0))
            .expect("query busy_timeout");
        assert_eq!(
            u128::from(busy_timeout_ms),
            DEFAULT_BUSY_TIMEOUT.as_millis()
        );

        let foreign_keys: i64 = conn
            .pragma_query_value(None, "foreign_keys", |row| row.get(0))
            .expect("query foreign_keys");
        assert_eq!(foreign_keys, 1);
    }

    #[test]
    fn open_store_runs_migrations() {
        let (_dir, path) = temp_db_path();
        let conn = open_store(&path).expect("open store");

        let version = migrations::current_schema_version(&conn).expect("schema version query");
        assert_eq!(version, migrations::LATEST_SCHEMA_VERSION);
    }

    #[test]
    fn open_store_creates_missing_parent_dirs() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let nested = dir.path().join("a/b/larder.sqlite3");
        let conn = open_store(&nested).expect("open store");
        drop(conn);
        assert!(nested.exists());
    }
}
