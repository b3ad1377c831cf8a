//! Database layer for Turnout.
//!
//! Provides the SQLite connection pool (via `r2d2`), per-connection PRAGMA
//! setup, and the embedded migrations that create the `events` and
//! `registrations` tables.
//!
//! SQLite runs in WAL mode so advisory reads never wait on the writer that
//! is currently deciding an event's status. Writers serialize on
//! `BEGIN IMMEDIATE`; the configured busy timeout bounds how long one waits.

mod migrations;
mod pool;

pub use migrations::{run_migrations, MigrationError};
pub use pool::{create_pool, DbPool, DbRuntimeSettings, PoolError};
