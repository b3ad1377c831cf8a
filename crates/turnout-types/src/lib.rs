//! Shared types for the Turnout registration platform.
//!
//! This crate holds the vocabulary every other Turnout crate speaks: the
//! delivery formats an event can run in, the seat format a participant
//! commits to, the event's admission status, and the plain records for
//! events, registrations and capacity snapshots.
//!
//! All enums carry a stable SCREAMING_SNAKE_CASE code. The same code is used
//! for serde, for `Display`/`FromStr`, and for the text columns in SQLite,
//! so a value written by one layer is always readable by another.

mod format;
mod model;

pub use format::{EventFormat, ParseCodeError, RegistrationStatus, SeatFormat};
pub use model::{limit_reached, CapacitySnapshot, Event, Registration};
