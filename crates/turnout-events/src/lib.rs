//! Event and registration persistence for Turnout.
//!
//! These are the repositories the capacity controller works through. Every
//! function takes a plain `&Connection`, so it runs inside whatever
//! transaction the caller has open on that connection. Nothing here locks
//! or decides status; it only reads and writes rows.

mod error;
mod event;
mod registration;
mod row;

pub use error::EventStoreError;
pub use event::{create_event, get_event, list_events, update_event_status, NewEvent};
pub use registration::{
    count_by_format, delete_registration, get_registration, insert_registration,
    list_registrations,
};
