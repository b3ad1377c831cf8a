//! Registration capacity control for Turnout events.
//!
//! Events run online, offline or hybrid, with an optional seat limit per
//! format. After every accepted or withdrawn registration the event's
//! status may have to change: closing a side that just filled up, or
//! reopening a side that just got a seat back. This crate owns that
//! decision and makes it safe under concurrent registrations.
//!
//! # Pieces
//!
//! - [`evaluator`]: the two pure status rules, [`closure`](evaluator::closure)
//!   and [`reopen`](evaluator::reopen).
//! - [`store`]: the [`CapacityStore`] seam and its two implementations.
//!   [`SqliteStore`] serializes writers with `BEGIN IMMEDIATE`;
//!   [`MemoryStore`] gives each event its own mutex.
//! - [`RegistrationController`]: `accept` and `withdraw`, each one atomic
//!   unit under the event's lock with a bounded wait.
//!
//! # Usage
//!
//! ```rust,ignore
//! use turnout_capacity::{RegistrationController, SqliteStore};
//! use turnout_types::SeatFormat;
//!
//! let config = turnout_capacity::config::load_config(Some("turnout.toml"))?;
//! let store = SqliteStore::open(&config.database.path, config.database.runtime_settings())?;
//! let controller = RegistrationController::new(store, config.capacity.lock_timeout());
//!
//! let registration = controller.accept(event_id, SeatFormat::Offline)?;
//! controller.withdraw(&registration.registration_id)?;
//! ```

pub mod config;
mod controller;
mod error;
pub mod evaluator;
pub mod logging;
mod notify;
pub mod store;

pub use controller::{Availability, RegistrationController};
pub use error::CapacityError;
pub use notify::{ChannelListener, NotifyError, RegistrationListener, RegistrationNotice};
pub use store::{CapacityStore, EventTransaction, MemoryStore, SqliteStore, StoreInitError};
