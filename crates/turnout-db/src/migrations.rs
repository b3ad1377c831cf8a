//! Embedded SQL migration runner.
//!
//! Migration files are compiled into the binary and applied in order. Each
//! one runs inside its own transaction together with the row that records
//! it in `_turnout_migrations`, so a failed migration leaves no trace.

use rusqlite::{Connection, OptionalExtension};
use thiserror::Error;

struct Migration {
    name: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        name: "000_init",
        sql: include_str!("migrations/000_init.sql"),
    },
    Migration {
        name: "001_events",
        sql: include_str!("migrations/001_events.sql"),
    },
    Migration {
        name: "002_registrations",
        sql: include_str!("migrations/002_registrations.sql"),
    },
];

/// Errors that can occur during migration execution.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// A statement inside a migration failed; the migration was rolled back.
    #[error("migration '{name}' failed: {source}")]
    ExecutionFailed {
        /// Name of the failing migration.
        name: &'static str,
        /// The underlying SQLite error.
        source: rusqlite::Error,
    },

    /// The bookkeeping table could not be created or read.
    #[error("failed to read migration state: {0}")]
    StateQuery(#[from] rusqlite::Error),
}

/// Applies every pending migration to `conn`.
///
/// Returns how many migrations were applied by this call; zero when the
/// schema is already current.
///
/// # Errors
///
/// Returns `MigrationError` if bookkeeping fails or a migration's SQL is
/// rejected.
pub fn run_migrations(conn: &Connection) -> Result<usize, MigrationError> {
    apply(conn, MIGRATIONS)
}

fn apply(conn: &Connection, migrations: &[Migration]) -> Result<usize, MigrationError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS _turnout_migrations (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );",
    )?;

    let mut applied = 0;
    for migration in migrations {
        let recorded = conn
            .query_row(
                "SELECT 1 FROM _turnout_migrations WHERE name = ?1",
                [migration.name],
                |_| Ok(()),
            )
            .optional()?
            .is_some();
        if recorded {
            tracing::debug!(migration = migration.name, "migration already applied");
            continue;
        }

        apply_one(conn, migration).map_err(|source| MigrationError::ExecutionFailed {
            name: migration.name,
            source,
        })?;
        tracing::info!(migration = migration.name, "applied migration");
        applied += 1;
    }

    Ok(applied)
}

fn apply_one(conn: &Connection, migration: &Migration) -> rusqlite::Result<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(migration.sql)?;
    tx.execute(
        "INSERT INTO _turnout_migrations (name) VALUES (?1)",
        [migration.name],
    )?;
    tx.commit()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_exists(conn: &Connection, table: &str) -> bool {
        conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1)",
            [table],
            |row| row.get(0),
        )
        .expect("should query sqlite_master")
    }

    #[test]
    fn fresh_database_gets_every_migration() {
        let conn = Connection::open_in_memory().expect("should open in-memory db");
        let applied = run_migrations(&conn).expect("migrations should succeed");
        assert_eq!(applied, MIGRATIONS.len());
        assert!(table_exists(&conn, "events"));
        assert!(table_exists(&conn, "registrations"));
    }

    #[test]
    fn second_run_is_a_no_op() {
        let conn = Connection::open_in_memory().expect("should open in-memory db");
        run_migrations(&conn).expect("first run should succeed");
        let second = run_migrations(&conn).expect("second run should succeed");
        assert_eq!(second, 0);
    }

    #[test]
    fn failed_migration_leaves_no_side_effects() {
        let conn = Connection::open_in_memory().expect("should open in-memory db");
        let broken = [Migration {
            name: "900_broken",
            sql: "CREATE TABLE half_done (id INTEGER PRIMARY KEY);
                  INSERT INTO missing_table VALUES (1);",
        }];

        let err = apply(&conn, &broken).expect_err("broken migration should fail");
        match err {
            MigrationError::ExecutionFailed { name, .. } => assert_eq!(name, "900_broken"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(!table_exists(&conn, "half_done"));

        let recorded: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM _turnout_migrations WHERE name = '900_broken'",
                [],
                |row| row.get(0),
            )
            .expect("should count records");
        assert_eq!(recorded, 0);
    }

    #[test]
    fn schema_rejects_unknown_status_codes() {
        let conn = Connection::open_in_memory().expect("should open in-memory db");
        run_migrations(&conn).expect("migrations should succeed");
        let result = conn.execute(
            "INSERT INTO events (name, format, status) VALUES ('x', 'HYBRID', 'HALF_OPEN')",
            [],
        );
        assert!(result.is_err(), "CHECK constraint should reject the status");
    }
}
