//! Event repository.

use rusqlite::{params, Connection, OptionalExtension, Row};
use turnout_types::{Event, EventFormat, RegistrationStatus};

use crate::error::EventStoreError;
use crate::row::code;

/// Parameters for creating a new event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEvent {
    pub name: String,
    pub format: EventFormat,
    pub offline_limit: Option<u32>,
    pub online_limit: Option<u32>,
}

impl NewEvent {
    /// Checks the definition before it is stored.
    ///
    /// Limits must be positive when set. A hybrid event must carry at least
    /// one limit; the status rules have no meaning for a hybrid event that
    /// can never fill up on either side.
    ///
    /// # Errors
    ///
    /// Returns `EventStoreError::InvalidEvent` describing the first problem.
    pub fn validate(&self) -> Result<(), EventStoreError> {
        if self.name.trim().is_empty() {
            return Err(EventStoreError::InvalidEvent(
                "event name must not be empty".to_string(),
            ));
        }
        if self.offline_limit == Some(0) || self.online_limit == Some(0) {
            return Err(EventStoreError::InvalidEvent(
                "participant limits must be positive".to_string(),
            ));
        }
        if self.format == EventFormat::Hybrid
            && self.offline_limit.is_none()
            && self.online_limit.is_none()
        {
            return Err(EventStoreError::InvalidEvent(
                "a hybrid event needs an offline or an online limit".to_string(),
            ));
        }
        Ok(())
    }
}

const EVENT_COLUMNS: &str =
    "id, name, format, offline_limit, online_limit, status, created_at";

fn map_row_to_event(row: &Row<'_>) -> rusqlite::Result<Event> {
    Ok(Event {
        id: row.get(0)?,
        name: row.get(1)?,
        format: code(row, 2)?,
        offline_limit: row.get(3)?,
        online_limit: row.get(4)?,
        status: code(row, 5)?,
        created_at: row.get(6)?,
    })
}

/// Creates a new event with status `OPEN`.
///
/// # Errors
///
/// Returns `EventStoreError::InvalidEvent` if validation fails, or
/// `EventStoreError::Database` if the insert is rejected (for example a
/// duplicate name).
pub fn create_event(conn: &Connection, new: &NewEvent) -> Result<Event, EventStoreError> {
    new.validate()?;

    let event = conn.query_row(
        &format!(
            "INSERT INTO events (name, format, offline_limit, online_limit, status)
             VALUES (?1, ?2, ?3, ?4, ?5)
             RETURNING {EVENT_COLUMNS}"
        ),
        params![
            new.name,
            new.format.as_str(),
            new.offline_limit,
            new.online_limit,
            RegistrationStatus::Open.as_str(),
        ],
        map_row_to_event,
    )?;

    tracing::debug!(event_id = event.id, format = %event.format, "event created");
    Ok(event)
}

/// Loads an event by ID.
///
/// # Errors
///
/// Returns `EventStoreError::EventNotFound` if no such event exists.
pub fn get_event(conn: &Connection, event_id: i64) -> Result<Event, EventStoreError> {
    conn.query_row(
        &format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = ?1"),
        [event_id],
        map_row_to_event,
    )
    .optional()?
    .ok_or(EventStoreError::EventNotFound(event_id))
}

/// Lists every event, oldest first.
///
/// # Errors
///
/// Returns `EventStoreError::Database` on SQL failure.
pub fn list_events(conn: &Connection) -> Result<Vec<Event>, EventStoreError> {
    let mut stmt = conn.prepare(&format!("SELECT {EVENT_COLUMNS} FROM events ORDER BY id ASC"))?;
    let rows = stmt.query_map([], map_row_to_event)?;
    let mut events = Vec::new();
    for row in rows {
        events.push(row?);
    }
    Ok(events)
}

/// Overwrites an event's status.
///
/// This is the only column the capacity controller ever mutates.
///
/// # Errors
///
/// Returns `EventStoreError::EventNotFound` if no row was updated.
pub fn update_event_status(
    conn: &Connection,
    event_id: i64,
    status: RegistrationStatus,
) -> Result<(), EventStoreError> {
    let count = conn.execute(
        "UPDATE events SET status = ?1 WHERE id = ?2",
        params![status.as_str(), event_id],
    )?;
    if count == 0 {
        return Err(EventStoreError::EventNotFound(event_id));
    }
    Ok(())
}
