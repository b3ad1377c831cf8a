//! Registration repository.

use rusqlite::{params, Connection, OptionalExtension, Row};
use turnout_types::{CapacitySnapshot, Registration, SeatFormat};
use uuid::Uuid;

use crate::error::EventStoreError;
use crate::row::code;

const REGISTRATION_COLUMNS: &str = "id, registration_id, event_id, format, created_at";

fn map_row_to_registration(row: &Row<'_>) -> rusqlite::Result<Registration> {
    Ok(Registration {
        id: row.get(0)?,
        registration_id: row.get(1)?,
        event_id: row.get(2)?,
        format: code(row, 3)?,
        created_at: row.get(4)?,
    })
}

/// Inserts a registration for `event_id` and returns it.
///
/// The public ID is a fresh UUID v4.
///
/// # Errors
///
/// Returns `EventStoreError::Database` on SQL failure, including a foreign
/// key violation when the event does not exist.
pub fn insert_registration(
    conn: &Connection,
    event_id: i64,
    format: SeatFormat,
) -> Result<Registration, EventStoreError> {
    let registration_id = Uuid::new_v4().to_string();
    let registration = conn.query_row(
        &format!(
            "INSERT INTO registrations (registration_id, event_id, format)
             VALUES (?1, ?2, ?3)
             RETURNING {REGISTRATION_COLUMNS}"
        ),
        params![registration_id, event_id, format.as_str()],
        map_row_to_registration,
    )?;
    Ok(registration)
}

/// Loads a registration by its public ID.
///
/// # Errors
///
/// Returns `EventStoreError::RegistrationNotFound` if it does not exist.
pub fn get_registration(
    conn: &Connection,
    registration_id: &str,
) -> Result<Registration, EventStoreError> {
    conn.query_row(
        &format!("SELECT {REGISTRATION_COLUMNS} FROM registrations WHERE registration_id = ?1"),
        [registration_id],
        map_row_to_registration,
    )
    .optional()?
    .ok_or_else(|| EventStoreError::RegistrationNotFound(registration_id.to_string()))
}

/// Deletes a registration by its public ID.
///
/// # Errors
///
/// Returns `EventStoreError::RegistrationNotFound` if nothing was deleted.
pub fn delete_registration(conn: &Connection, registration_id: &str) -> Result<(), EventStoreError> {
    let count = conn.execute(
        "DELETE FROM registrations WHERE registration_id = ?1",
        [registration_id],
    )?;
    if count == 0 {
        return Err(EventStoreError::RegistrationNotFound(
            registration_id.to_string(),
        ));
    }
    Ok(())
}

/// Counts the live registrations of an event, grouped by seat format.
///
/// # Errors
///
/// Returns `EventStoreError::Database` on SQL failure.
pub fn count_by_format(conn: &Connection, event_id: i64) -> Result<CapacitySnapshot, EventStoreError> {
    let mut stmt = conn.prepare(
        "SELECT format, COUNT(*) FROM registrations WHERE event_id = ?1 GROUP BY format",
    )?;
    let rows = stmt.query_map([event_id], |row| {
        Ok((code::<SeatFormat>(row, 0)?, row.get::<_, u32>(1)?))
    })?;

    let mut snapshot = CapacitySnapshot::default();
    for row in rows {
        match row? {
            (SeatFormat::Offline, n) => snapshot.offline = n,
            (SeatFormat::Online, n) => snapshot.online = n,
        }
    }
    Ok(snapshot)
}

/// Lists the registrations of an event in the order they were accepted.
///
/// # Errors
///
/// Returns `EventStoreError::Database` on SQL failure.
pub fn list_registrations(
    conn: &Connection,
    event_id: i64,
) -> Result<Vec<Registration>, EventStoreError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {REGISTRATION_COLUMNS} FROM registrations WHERE event_id = ?1 ORDER BY id ASC"
    ))?;
    let rows = stmt.query_map([event_id], map_row_to_registration)?;
    let mut registrations = Vec::new();
    for row in rows {
        registrations.push(row?);
    }
    Ok(registrations)
}
