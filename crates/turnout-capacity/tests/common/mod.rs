#![allow(dead_code)]

use std::time::Duration;

use tempfile::TempDir;
use turnout_capacity::{CapacityStore, MemoryStore, RegistrationController, SqliteStore};
use turnout_db::DbRuntimeSettings;
use turnout_events::NewEvent;
use turnout_types::{Event, EventFormat};

/// Stores that tests can seed with events.
pub trait TestStore: CapacityStore + Sized {
    fn seed(&self, new: &NewEvent) -> Event;
}

impl TestStore for MemoryStore {
    fn seed(&self, new: &NewEvent) -> Event {
        self.create_event(new).expect("should create event")
    }
}

impl TestStore for SqliteStore {
    fn seed(&self, new: &NewEvent) -> Event {
        self.create_event(new).expect("should create event")
    }
}

pub fn memory_controller(lock_timeout: Duration) -> RegistrationController<MemoryStore> {
    RegistrationController::new(MemoryStore::new(), lock_timeout)
}

/// A controller over a file-backed database. Keep the `TempDir` alive for
/// as long as the controller is used.
pub fn sqlite_controller(lock_timeout: Duration) -> (TempDir, RegistrationController<SqliteStore>) {
    let dir = tempfile::tempdir().expect("should create tempdir");
    let path = dir.path().join("turnout.db");
    let settings = DbRuntimeSettings {
        busy_timeout_ms: 10_000,
        pool_max_size: 8,
        checkout_timeout_ms: 10_000,
    };
    let store = SqliteStore::open(path.to_str().expect("utf-8 path"), settings)
        .expect("should open sqlite store");
    (dir, RegistrationController::new(store, lock_timeout))
}

pub fn strict(name: &str, format: EventFormat, limit: Option<u32>) -> NewEvent {
    let (offline_limit, online_limit) = match format {
        EventFormat::Offline => (limit, None),
        EventFormat::Online => (None, limit),
        EventFormat::Hybrid => panic!("use hybrid() for hybrid events"),
    };
    NewEvent {
        name: name.to_string(),
        format,
        offline_limit,
        online_limit,
    }
}

pub fn hybrid(name: &str, offline_limit: Option<u32>, online_limit: Option<u32>) -> NewEvent {
    NewEvent {
        name: name.to_string(),
        format: EventFormat::Hybrid,
        offline_limit,
        online_limit,
    }
}
