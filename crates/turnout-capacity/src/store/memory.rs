//! In-process store with one mutex per event.
//!
//! Each event has a gate mutex that is the single writer for that event;
//! different events never share a gate. Work runs against a staged copy of
//! the event's state and is published only when it succeeds, so a failed
//! operation leaves nothing behind. Advisory reads go to a separately
//! published view and never wait on a gate.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use turnout_events::NewEvent;
use turnout_types::{CapacitySnapshot, Event, Registration, RegistrationStatus, SeatFormat};
use uuid::Uuid;

use super::{CapacityStore, EventTransaction};
use crate::error::CapacityError;

#[derive(Debug, Clone)]
struct EventState {
    event: Event,
    registrations: Vec<Registration>,
}

impl EventState {
    fn counts(&self) -> CapacitySnapshot {
        self.registrations
            .iter()
            .fold(CapacitySnapshot::default(), |snap, r| snap.with_added(r.format))
    }
}

#[derive(Debug)]
struct EventCell {
    gate: Mutex<EventState>,
    view: RwLock<EventState>,
}

/// Capacity store kept entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    events: RwLock<HashMap<i64, Arc<EventCell>>>,
    index: RwLock<HashMap<String, Registration>>,
    next_event_id: AtomicI64,
    next_registration_id: AtomicI64,
}

fn now() -> String {
    chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an event with status `OPEN`.
    ///
    /// # Errors
    ///
    /// Returns `CapacityError::Storage` if the definition is invalid.
    pub fn create_event(&self, new: &NewEvent) -> Result<Event, CapacityError> {
        new.validate()?;

        let event = Event {
            id: self.next_event_id.fetch_add(1, Ordering::Relaxed) + 1,
            name: new.name.clone(),
            format: new.format,
            offline_limit: new.offline_limit,
            online_limit: new.online_limit,
            status: RegistrationStatus::Open,
            created_at: now(),
        };
        let state = EventState {
            event: event.clone(),
            registrations: Vec::new(),
        };
        let cell = EventCell {
            gate: Mutex::new(state.clone()),
            view: RwLock::new(state),
        };
        self.events.write().insert(event.id, Arc::new(cell));
        Ok(event)
    }

    fn cell(&self, event_id: i64) -> Result<Arc<EventCell>, CapacityError> {
        self.events
            .read()
            .get(&event_id)
            .cloned()
            .ok_or(CapacityError::EventNotFound(event_id))
    }
}

impl CapacityStore for MemoryStore {
    fn with_event<T, F>(&self, event_id: i64, timeout: Duration, work: F) -> Result<T, CapacityError>
    where
        F: FnOnce(&mut dyn EventTransaction) -> Result<T, CapacityError>,
    {
        let cell = self.cell(event_id)?;
        let Some(mut current) = cell.gate.try_lock_for(timeout) else {
            return Err(CapacityError::LockTimeout {
                event_id,
                timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            });
        };

        let mut staged = MemoryTransaction {
            state: current.clone(),
            next_id: &self.next_registration_id,
            added: Vec::new(),
            removed: Vec::new(),
        };
        let value = work(&mut staged)?;

        {
            let mut index = self.index.write();
            for registration_id in &staged.removed {
                index.remove(registration_id);
            }
            for registration in staged.added {
                index.insert(registration.registration_id.clone(), registration);
            }
        }
        *cell.view.write() = staged.state.clone();
        *current = staged.state;
        Ok(value)
    }

    fn find_registration(
        &self,
        registration_id: &str,
    ) -> Result<Option<Registration>, CapacityError> {
        Ok(self.index.read().get(registration_id).cloned())
    }

    fn snapshot(&self, event_id: i64) -> Result<(Event, CapacitySnapshot), CapacityError> {
        let cell = self.cell(event_id)?;
        let view = cell.view.read();
        Ok((view.event.clone(), view.counts()))
    }

    fn registrations(&self, event_id: i64) -> Result<Vec<Registration>, CapacityError> {
        let cell = self.cell(event_id)?;
        let view = cell.view.read();
        Ok(view.registrations.clone())
    }
}

struct MemoryTransaction<'a> {
    state: EventState,
    next_id: &'a AtomicI64,
    added: Vec<Registration>,
    removed: Vec<String>,
}

impl EventTransaction for MemoryTransaction<'_> {
    fn event(&self) -> Result<Event, CapacityError> {
        Ok(self.state.event.clone())
    }

    fn count_by_format(&self) -> Result<CapacitySnapshot, CapacityError> {
        Ok(self.state.counts())
    }

    fn update_status(&mut self, status: RegistrationStatus) -> Result<(), CapacityError> {
        self.state.event.status = status;
        Ok(())
    }

    fn create_registration(&mut self, format: SeatFormat) -> Result<Registration, CapacityError> {
        let registration = Registration {
            id: self.next_id.fetch_add(1, Ordering::Relaxed) + 1,
            registration_id: Uuid::new_v4().to_string(),
            event_id: self.state.event.id,
            format,
            created_at: now(),
        };
        self.state.registrations.push(registration.clone());
        self.added.push(registration.clone());
        Ok(registration)
    }

    fn delete_registration(&mut self, registration_id: &str) -> Result<(), CapacityError> {
        let position = self
            .state
            .registrations
            .iter()
            .position(|r| r.registration_id == registration_id)
            .ok_or_else(|| CapacityError::RegistrationNotFound(registration_id.to_string()))?;
        self.state.registrations.remove(position);
        self.added.retain(|r| r.registration_id != registration_id);
        self.removed.push(registration_id.to_string());
        Ok(())
    }
}
