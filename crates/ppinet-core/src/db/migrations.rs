//! Versioned schema steps for the knowledge cache, tracked in
//! `PRAGMA user_version`.

use super::schema;
use rusqlite::{Connection, types::Type};

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "categories, genes, default palette",
        sql: schema::MIGRATION_V1_SQL,
    },
    Migration {
        version: 2,
        name: "genes.extended_data",
        sql: schema::MIGRATION_V2_SQL,
    },
];

/// Schema version after every known step has run.
pub const LATEST_SCHEMA_VERSION: u32 = 2;

/// The cache's recorded schema version (0 for a fresh file).
///
/// # Errors
///
/// Returns an error if the pragma cannot be read or is negative.
pub fn current_schema_version(conn: &Connection) -> rusqlite::Result<u32> {
    let raw: i64 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
    u32::try_from(raw)
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(0, Type::Integer, Box::new(err)))
}

/// Bring the schema up to [`LATEST_SCHEMA_VERSION`] and return the version
/// reached.
///
/// A step and its version bump share one transaction; an interrupted
/// upgrade resumes from the last completed step.
///
/// # Errors
///
/// Returns an error if a step fails.
pub fn migrate(conn: &mut Connection) -> rusqlite::Result<u32> {
    let start = current_schema_version(conn)?;
    let mut reached = start;

    for step in MIGRATIONS.iter().filter(|m| m.version > start) {
        let tx = conn.transaction()?;
        tx.execute_batch(step.sql)?;
        tx.pragma_update(None, "user_version", i64::from(step.version))?;
        tx.commit()?;
        tracing::debug!(version = step.version, step = step.name, "knowledge cache migrated");
        reached = step.version;
    }

    if reached > LATEST_SCHEMA_VERSION {
        tracing::warn!(
            version = reached,
            known = LATEST_SCHEMA_VERSION,
            "knowledge cache was written by a newer ppinet"
        );
    }
    Ok(reached)
}

#[cfg(test)]
mod tests {
    use super::{LATEST_SCHEMA_VERSION, MIGRATIONS, current_schema_version, migrate};
    use crate::db::schema;
    use rusqlite::Connection;

    fn has_object(conn: &Connection, kind: &str, name: &str) -> bool {
        conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = ?1 AND name = ?2",
            [kind, name],
            |row| row.get::<_, i64>(0),
        )
        .is_ok_and(|n| n == 1)
    }

    #[test]
    fn steps_are_strictly_ascending_and_end_at_latest() {
        let versions: Vec<u32> = MIGRATIONS.iter().map(|m| m.version).collect();
        assert!(versions.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(versions.last(), Some(&LATEST_SCHEMA_VERSION));
    }

    #[test]
    fn fresh_database_reaches_latest() -> rusqlite::Result<()> {
        let mut conn = Connection::open_in_memory()?;
        assert_eq!(current_schema_version(&conn)?, 0);

        assert_eq!(migrate(&mut conn)?, LATEST_SCHEMA_VERSION);
        assert_eq!(current_schema_version(&conn)?, LATEST_SCHEMA_VERSION);
        assert!(has_object(&conn, "table", "categories"));
        assert!(has_object(&conn, "table", "genes"));
        for index in schema::REQUIRED_INDEXES {
            assert!(has_object(&conn, "index", index), "missing index {index}");
        }
        Ok(())
    }

    #[test]
    fn second_run_applies_nothing_and_seeds_once() -> rusqlite::Result<()> {
        let mut conn = Connection::open_in_memory()?;
        migrate(&mut conn)?;
        migrate(&mut conn)?;

        let seeded: usize = conn.query_row("SELECT COUNT(*) FROM categories", [], |row| row.get(0))?;
        assert_eq!(seeded, schema::SEEDED_CATEGORIES.len());
        Ok(())
    }

    #[test]
    fn v1_cache_upgrades_without_losing_genes() -> rusqlite::Result<()> {
        let mut conn = Connection::open_in_memory()?;
        conn.execute_batch(schema::MIGRATION_V1_SQL)?;
        conn.pragma_update(None, "user_version", 1_i64)?;
        conn.execute(
            "INSERT INTO genes (symbol, category_id, description)
             SELECT 'TP53', id, 'Guardian of the genome'
             FROM categories WHERE name = 'Tumor Suppressor'",
            [],
        )?;

        assert_eq!(migrate(&mut conn)?, LATEST_SCHEMA_VERSION);

        let (description, extended): (String, Option<String>) = conn.query_row(
            "SELECT description, extended_data FROM genes WHERE symbol = 'TP53'",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        assert_eq!(description, "Guardian of the genome");
        assert_eq!(extended, None);
        Ok(())
    }
}
