//! Error types for event and registration persistence.

/// Errors that can occur while reading or writing events and registrations.
#[derive(Debug, thiserror::Error)]
pub enum EventStoreError {
    /// A database operation failed.
    #[error("event store database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// No event exists with the given ID.
    #[error("event not found: {0}")]
    EventNotFound(i64),

    /// No registration exists with the given public ID.
    #[error("registration not found: {0}")]
    RegistrationNotFound(String),

    /// The event definition is malformed and was not stored.
    #[error("invalid event: {0}")]
    InvalidEvent(String),
}
