//! Storage seam for the controller.
//!
//! A [`CapacityStore`] owns the per-event critical section. Everything the
//! controller does to one event happens inside
//! [`CapacityStore::with_event`], through an [`EventTransaction`] scoped to
//! that event: either all of it becomes visible or none of it does.

mod memory;
mod sqlite;

use std::time::Duration;

use turnout_types::{CapacitySnapshot, Event, Registration, RegistrationStatus, SeatFormat};

use crate::error::CapacityError;

pub use memory::MemoryStore;
pub use sqlite::{SqliteStore, StoreInitError};

/// Repository calls available inside one event's critical section.
pub trait EventTransaction {
    /// The event as it is right now, inside the lock.
    fn event(&self) -> Result<Event, CapacityError>;

    /// Live registration counts for the event.
    fn count_by_format(&self) -> Result<CapacitySnapshot, CapacityError>;

    /// Stages a new status for the event.
    fn update_status(&mut self, status: RegistrationStatus) -> Result<(), CapacityError>;

    /// Stages a new registration for the event.
    fn create_registration(&mut self, format: SeatFormat) -> Result<Registration, CapacityError>;

    /// Stages removal of one of the event's registrations.
    ///
    /// Fails with `RegistrationNotFound` if it is already gone.
    fn delete_registration(&mut self, registration_id: &str) -> Result<(), CapacityError>;
}

/// Backing store for events and registrations with per-event locking.
pub trait CapacityStore: Send + Sync {
    /// Runs `work` with exclusive access to `event_id`.
    ///
    /// Waits at most `timeout` to enter; on expiry returns
    /// `CapacityError::LockTimeout` without running `work`. If `work`
    /// returns an error, every change it staged is discarded.
    fn with_event<T, F>(&self, event_id: i64, timeout: Duration, work: F) -> Result<T, CapacityError>
    where
        F: FnOnce(&mut dyn EventTransaction) -> Result<T, CapacityError>;

    /// Looks up a registration without taking any event lock.
    fn find_registration(&self, registration_id: &str)
        -> Result<Option<Registration>, CapacityError>;

    /// Reads an event and its counts without taking its lock.
    ///
    /// The result is advisory; it may already be stale when returned.
    fn snapshot(&self, event_id: i64) -> Result<(Event, CapacitySnapshot), CapacityError>;

    /// Lists an event's registrations in acceptance order, unlocked.
    fn registrations(&self, event_id: i64) -> Result<Vec<Registration>, CapacityError>;
}
