//! Connection setup for the knowledge cache.
//!
//! Every connection gets `foreign_keys = ON`, so a gene can never point at
//! a missing category. File-backed caches also run in WAL mode with a 5s
//! busy timeout so a reader never blocks on a concurrent enrichment commit.

pub mod migrations;
pub mod schema;

use anyhow::{Context, Result};
use rusqlite::Connection;
use std::{path::Path, time::Duration};

/// How long a connection waits on a locked cache before failing.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Open the cache file at `path`, creating it and its directory if needed,
/// and migrate it to the latest schema.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or the file cannot
/// be opened, configured, or migrated.
pub fn open_cache_db(path: &Path) -> Result<Connection> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("create cache directory {}", dir.display()))?;
    }

    let conn = Connection::open(path)
        .with_context(|| format!("open knowledge cache {}", path.display()))?;
    conn.busy_timeout(DEFAULT_BUSY_TIMEOUT)
        .context("set busy timeout")?;
    let mode: String = conn
        .query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))
        .context("enable WAL journal")?;
    tracing::trace!(journal_mode = %mode, path = %path.display(), "cache opened");
    conn.pragma_update(None, "synchronous", "NORMAL")
        .context("set synchronous mode")?;

    prepare(conn)
}

/// A private in-memory cache with the full schema. Used by tests and
/// one-shot analyses.
///
/// # Errors
///
/// Returns an error if migration fails.
pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory().context("open in-memory cache")?;
    prepare(conn)
}

fn prepare(mut conn: Connection) -> Result<Connection> {
    conn.pragma_update(None, "foreign_keys", "ON")
        .context("enable foreign keys")?;
    migrations::migrate(&mut conn).context("apply knowledge cache migrations")?;
    Ok(conn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn pragma<T: rusqlite::types::FromSql>(conn: &Connection, name: &str) -> T {
        conn.pragma_query_value(None, name, |row| row.get(0))
            .unwrap_or_else(|err| panic!("read pragma {name}: {err}"))
    }

    #[test]
    fn file_cache_is_configured_for_concurrent_readers() {
        let dir = TempDir::new().expect("tempdir");
        let conn = open_cache_db(&dir.path().join("a").join("b").join("genes.db")).expect("open");

        assert_eq!(pragma::<String>(&conn, "journal_mode").to_ascii_lowercase(), "wal");
        assert_eq!(pragma::<i64>(&conn, "busy_timeout"), 5000);
        assert_eq!(pragma::<i64>(&conn, "foreign_keys"), 1);
        assert_eq!(
            migrations::current_schema_version(&conn).expect("version"),
            migrations::LATEST_SCHEMA_VERSION
        );
    }

    #[test]
    fn in_memory_cache_enforces_foreign_keys() {
        let conn = open_in_memory().expect("open");
        let orphan = conn.execute(
            "INSERT INTO genes (symbol, category_id) VALUES ('TP53', 9999)",
            [],
        );
        assert!(orphan.is_err());
    }

    #[test]
    fn categories_survive_reopen_and_match_case_insensitively() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("genes.db");
        open_cache_db(&path)
            .expect("open")
            .execute(
                "INSERT INTO categories (name, color) VALUES ('Ion Channel', '#123456')",
                [],
            )
            .expect("insert");

        let conn = open_cache_db(&path).expect("reopen");
        let color: String = conn
            .query_row(
                "SELECT color FROM categories WHERE name = 'ion channel'",
                [],
                |row| row.get(0),
            )
            .expect("category survives reopen");
        assert_eq!(color, "#123456");
    }
}
