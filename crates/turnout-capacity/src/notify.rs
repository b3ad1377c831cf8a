//! Hand-off to whatever sends confirmation emails and the like.
//!
//! The controller tells a [`RegistrationListener`] about each committed
//! change. Listeners must return quickly; [`ChannelListener`] just queues the
//! notice for a worker elsewhere. A failing listener is logged and ignored:
//! the registration it describes has already been committed.

use std::sync::mpsc::Sender;

use serde::Serialize;
use thiserror::Error;
use turnout_types::{Registration, RegistrationStatus};

/// A committed change to an event's registrations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RegistrationNotice {
    /// A registration was accepted.
    Accepted {
        registration: Registration,
        /// Event status after the acceptance.
        status: RegistrationStatus,
    },
    /// A registration was withdrawn.
    Withdrawn {
        registration: Registration,
        /// Event status after the withdrawal.
        status: RegistrationStatus,
    },
}

impl RegistrationNotice {
    /// The registration this notice is about.
    pub fn registration(&self) -> &Registration {
        match self {
            Self::Accepted { registration, .. } | Self::Withdrawn { registration, .. } => {
                registration
            }
        }
    }
}

/// Errors a listener can report back.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The receiving side has gone away.
    #[error("notification queue is closed")]
    QueueClosed,

    /// Delivery failed for a listener-specific reason.
    #[error("notification delivery failed: {0}")]
    Delivery(String),
}

/// Receives notices after changes commit.
pub trait RegistrationListener: Send + Sync {
    /// Accepts one notice. Must not block on delivery.
    fn notify(&self, notice: &RegistrationNotice) -> Result<(), NotifyError>;
}

/// Listener that forwards notices onto an `mpsc` queue.
#[derive(Debug, Clone)]
pub struct ChannelListener {
    sender: Sender<RegistrationNotice>,
}

impl ChannelListener {
    pub fn new(sender: Sender<RegistrationNotice>) -> Self {
        Self { sender }
    }
}

impl RegistrationListener for ChannelListener {
    fn notify(&self, notice: &RegistrationNotice) -> Result<(), NotifyError> {
        self.sender
            .send(notice.clone())
            .map_err(|_| NotifyError::QueueClosed)
    }
}
