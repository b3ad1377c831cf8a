//! Error types for the capacity controller.

use turnout_events::EventStoreError;
use turnout_types::{RegistrationStatus, SeatFormat};

/// Errors returned by [`RegistrationController`](crate::RegistrationController)
/// and the stores behind it.
#[derive(Debug, thiserror::Error)]
pub enum CapacityError {
    /// The event's status already refuses seats of the requested format.
    #[error("registration for {format} seats at event {event_id} is closed (status {status})")]
    EventClosed {
        event_id: i64,
        format: SeatFormat,
        status: RegistrationStatus,
    },

    /// The limit for the requested format is already reached even though
    /// the status had not caught up yet.
    #[error("no {format} seats left at event {event_id} ({count} of {limit} taken)")]
    CapacityExceeded {
        event_id: i64,
        format: SeatFormat,
        count: u32,
        limit: u32,
    },

    /// No registration exists with the given public ID.
    #[error("registration not found: {0}")]
    RegistrationNotFound(String),

    /// No event exists with the given ID.
    #[error("event not found: {0}")]
    EventNotFound(i64),

    /// The event's critical section could not be entered in time.
    #[error("timed out after {timeout_ms} ms waiting for exclusive access to event {event_id}")]
    LockTimeout { event_id: i64, timeout_ms: u64 },

    /// No pooled connection was available outside the critical section.
    #[error("database connection unavailable: {0}")]
    Unavailable(#[from] r2d2::Error),

    /// Opening, committing or rolling back a transaction failed.
    #[error("capacity database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A repository call failed for a reason other than a missing row.
    #[error(transparent)]
    Storage(EventStoreError),
}

impl CapacityError {
    /// Whether the caller may retry the same operation after a backoff.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::LockTimeout { .. } | Self::Unavailable(_))
    }
}

impl From<EventStoreError> for CapacityError {
    fn from(err: EventStoreError) -> Self {
        match err {
            EventStoreError::EventNotFound(id) => Self::EventNotFound(id),
            EventStoreError::RegistrationNotFound(id) => Self::RegistrationNotFound(id),
            other => Self::Storage(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_rows_keep_their_meaning() {
        let err: CapacityError = EventStoreError::RegistrationNotFound("abc".to_string()).into();
        assert!(matches!(err, CapacityError::RegistrationNotFound(ref id) if id == "abc"));

        let err: CapacityError = EventStoreError::EventNotFound(4).into();
        assert!(matches!(err, CapacityError::EventNotFound(4)));
    }

    #[test]
    fn only_contention_is_retryable() {
        let timeout = CapacityError::LockTimeout {
            event_id: 1,
            timeout_ms: 50,
        };
        assert!(timeout.is_retryable());

        let closed = CapacityError::EventClosed {
            event_id: 1,
            format: SeatFormat::Online,
            status: RegistrationStatus::Closed,
        };
        assert!(!closed.is_retryable());
        assert_eq!(
            closed.to_string(),
            "registration for ONLINE seats at event 1 is closed (status CLOSED)"
        );
    }
}
