//! SQLite-backed store.
//!
//! The critical section is a `BEGIN IMMEDIATE` transaction: it takes the
//! database write lock before the event row or its counts are read, and
//! holds it until commit. SQLite's busy handler bounds the wait; when it
//! gives up, the operation fails with `LockTimeout` and nothing is written.
//!
//! SQLite has one write lock per database, not per row. While any event's
//! critical section is open, writers for every other event in the same
//! database wait behind it and can time out too. Reads are unaffected under
//! WAL. Use [`MemoryStore`](super::MemoryStore) when events must not contend
//! with each other.

use std::time::{Duration, Instant};

use rusqlite::{Connection, ErrorCode, TransactionBehavior};
use thiserror::Error;
use turnout_db::{create_pool, run_migrations, DbPool, DbRuntimeSettings, MigrationError, PoolError};
use turnout_events::{EventStoreError, NewEvent};
use turnout_types::{CapacitySnapshot, Event, Registration, RegistrationStatus, SeatFormat};

use super::{CapacityStore, EventTransaction};
use crate::error::CapacityError;

/// Errors that can occur while opening a [`SqliteStore`].
#[derive(Debug, Error)]
pub enum StoreInitError {
    #[error(transparent)]
    Pool(#[from] PoolError),

    #[error("failed to check out a connection for migrations: {0}")]
    Checkout(#[from] r2d2::Error),

    #[error(transparent)]
    Migration(#[from] MigrationError),
}

/// Capacity store on top of a pooled SQLite database.
#[derive(Clone)]
pub struct SqliteStore {
    pool: DbPool,
    busy_timeout: Duration,
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore")
            .field("pool_max_size", &self.pool.max_size())
            .field("busy_timeout", &self.busy_timeout)
            .finish()
    }
}

impl SqliteStore {
    /// Wraps an existing pool whose schema is already migrated.
    ///
    /// `busy_timeout` is restored on each connection after a locked call
    /// has temporarily replaced it with the caller's lock timeout.
    pub fn new(pool: DbPool, busy_timeout: Duration) -> Self {
        Self { pool, busy_timeout }
    }

    /// Opens (or creates) the database at `db_path` and migrates it.
    ///
    /// # Errors
    ///
    /// Returns `StoreInitError` if the pool cannot be built or a migration
    /// fails.
    pub fn open(db_path: &str, settings: DbRuntimeSettings) -> Result<Self, StoreInitError> {
        let pool = create_pool(db_path, settings)?;
        {
            let conn = pool.get()?;
            let applied = run_migrations(&conn)?;
            tracing::debug!(path = db_path, applied, "capacity store schema ready");
        }
        Ok(Self::new(pool, Duration::from_millis(settings.busy_timeout_ms)))
    }

    /// The underlying connection pool.
    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    /// Creates an event. Stands in for the event management service that
    /// normally owns this.
    ///
    /// # Errors
    ///
    /// Returns `CapacityError::Storage` if the definition is invalid or the
    /// insert fails.
    pub fn create_event(&self, new: &NewEvent) -> Result<Event, CapacityError> {
        let conn = self.pool.get()?;
        Ok(turnout_events::create_event(&conn, new)?)
    }
}

fn run_locked<T, F>(conn: &mut Connection, event_id: i64, work: F) -> Result<T, CapacityError>
where
    F: FnOnce(&mut dyn EventTransaction) -> Result<T, CapacityError>,
{
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let value = work(&mut SqliteTransaction { conn: &tx, event_id })?;
    tx.commit()?;
    Ok(value)
}

fn is_busy(err: &CapacityError) -> bool {
    let sqlite = match err {
        CapacityError::Database(e) | CapacityError::Storage(EventStoreError::Database(e)) => e,
        _ => return false,
    };
    matches!(
        sqlite,
        rusqlite::Error::SqliteFailure(e, _)
            if matches!(e.code, ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked)
    )
}

fn millis(timeout: Duration) -> u64 {
    u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX)
}

impl CapacityStore for SqliteStore {
    fn with_event<T, F>(&self, event_id: i64, timeout: Duration, work: F) -> Result<T, CapacityError>
    where
        F: FnOnce(&mut dyn EventTransaction) -> Result<T, CapacityError>,
    {
        let timed_out = || CapacityError::LockTimeout {
            event_id,
            timeout_ms: millis(timeout),
        };

        let started = Instant::now();
        let mut conn = self.pool.get_timeout(timeout).map_err(|_| timed_out())?;
        conn.busy_timeout(timeout.saturating_sub(started.elapsed()))?;

        let outcome = run_locked(&mut conn, event_id, work).map_err(|err| {
            if is_busy(&err) {
                timed_out()
            } else {
                err
            }
        });

        if let Err(err) = conn.busy_timeout(self.busy_timeout) {
            tracing::warn!(error = %err, "failed to restore connection busy timeout");
        }
        outcome
    }

    fn find_registration(
        &self,
        registration_id: &str,
    ) -> Result<Option<Registration>, CapacityError> {
        let conn = self.pool.get()?;
        match turnout_events::get_registration(&conn, registration_id) {
            Ok(registration) => Ok(Some(registration)),
            Err(EventStoreError::RegistrationNotFound(_)) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn snapshot(&self, event_id: i64) -> Result<(Event, CapacitySnapshot), CapacityError> {
        let conn = self.pool.get()?;
        // A deferred read transaction keeps the event row and the counts
        // from the same WAL snapshot without blocking writers.
        let tx = conn.unchecked_transaction()?;
        let event = turnout_events::get_event(&tx, event_id)?;
        let counts = turnout_events::count_by_format(&tx, event_id)?;
        tx.finish()?;
        Ok((event, counts))
    }

    fn registrations(&self, event_id: i64) -> Result<Vec<Registration>, CapacityError> {
        let conn = self.pool.get()?;
        turnout_events::get_event(&conn, event_id)?;
        Ok(turnout_events::list_registrations(&conn, event_id)?)
    }
}

struct SqliteTransaction<'a> {
    conn: &'a Connection,
    event_id: i64,
}

impl EventTransaction for SqliteTransaction<'_> {
    fn event(&self) -> Result<Event, CapacityError> {
        Ok(turnout_events::get_event(self.conn, self.event_id)?)
    }

    fn count_by_format(&self) -> Result<CapacitySnapshot, CapacityError> {
        Ok(turnout_events::count_by_format(self.conn, self.event_id)?)
    }

    fn update_status(&mut self, status: RegistrationStatus) -> Result<(), CapacityError> {
        Ok(turnout_events::update_event_status(self.conn, self.event_id, status)?)
    }

    fn create_registration(&mut self, format: SeatFormat) -> Result<Registration, CapacityError> {
        Ok(turnout_events::insert_registration(self.conn, self.event_id, format)?)
    }

    fn delete_registration(&mut self, registration_id: &str) -> Result<(), CapacityError> {
        let registration = turnout_events::get_registration(self.conn, registration_id)?;
        if registration.event_id != self.event_id {
            return Err(CapacityError::RegistrationNotFound(
                registration_id.to_string(),
            ));
        }
        Ok(turnout_events::delete_registration(self.conn, registration_id)?)
    }
}
