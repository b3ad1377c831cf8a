//! The registration capacity controller.

use std::sync::Arc;
use std::time::Duration;

use turnout_types::{
    limit_reached, CapacitySnapshot, Event, Registration, RegistrationStatus, SeatFormat,
};

use crate::error::CapacityError;
use crate::evaluator;
use crate::notify::{RegistrationListener, RegistrationNotice};
use crate::store::CapacityStore;

/// Advisory view of an event's capacity, read without locking.
///
/// Good enough to render "full" in a listing; [`RegistrationController::accept`]
/// re-checks everything under the lock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Availability {
    pub event: Event,
    pub counts: CapacitySnapshot,
}

impl Availability {
    /// Whether a new registration of `seat` format would currently be taken.
    pub fn accepts(&self, seat: SeatFormat) -> bool {
        self.event.format.admits(seat)
            && !self.event.status.blocks(seat)
            && !limit_reached(self.counts.count(seat), self.event.limit_for(seat))
    }

    /// Seats of `seat` format still free, or `None` when unlimited.
    pub fn remaining(&self, seat: SeatFormat) -> Option<u32> {
        self.event
            .limit_for(seat)
            .map(|limit| limit.saturating_sub(self.counts.count(seat)))
    }

    /// Whether no format can take another registration right now.
    pub fn is_full(&self) -> bool {
        !self.accepts(SeatFormat::Offline) && !self.accepts(SeatFormat::Online)
    }
}

/// Decides event status as registrations come and go.
///
/// Every `accept` and `withdraw` for one event runs inside that event's
/// critical section in the store, so the count it checks, the row it writes
/// and the status it sets commit together or not at all.
pub struct RegistrationController<S> {
    store: S,
    lock_timeout: Duration,
    listener: Option<Arc<dyn RegistrationListener>>,
}

impl<S: std::fmt::Debug> std::fmt::Debug for RegistrationController<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistrationController")
            .field("store", &self.store)
            .field("lock_timeout", &self.lock_timeout)
            .field("listener", &self.listener.is_some())
            .finish()
    }
}

impl<S: CapacityStore> RegistrationController<S> {
    pub fn new(store: S, lock_timeout: Duration) -> Self {
        Self {
            store,
            lock_timeout,
            listener: None,
        }
    }

    /// Attaches a listener that hears about every committed change.
    #[must_use]
    pub fn with_listener(mut self, listener: Arc<dyn RegistrationListener>) -> Self {
        self.listener = Some(listener);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Registers a participant for `event_id` in `format`.
    ///
    /// Format compatibility with the event is the caller's job; strict events
    /// are assumed to receive only their own format.
    ///
    /// # Errors
    ///
    /// - `EventClosed` if the status already refuses this format.
    /// - `CapacityExceeded` if the format's limit is already reached.
    /// - `EventNotFound` if the event does not exist.
    /// - `LockTimeout` if the event's lock could not be taken in time.
    pub fn accept(&self, event_id: i64, format: SeatFormat) -> Result<Registration, CapacityError> {
        let (registration, status) = self
            .store
            .with_event(event_id, self.lock_timeout, |tx| {
                let event = tx.event()?;
                debug_assert!(
                    event.format.admits(format),
                    "{format} seat submitted to {} event {event_id}",
                    event.format
                );

                if event.status.blocks(format) {
                    return Err(CapacityError::EventClosed {
                        event_id,
                        format,
                        status: event.status,
                    });
                }

                let count = tx.count_by_format()?.count(format);
                if let Some(limit) = event.limit_for(format) {
                    if limit_reached(count, Some(limit)) {
                        return Err(CapacityError::CapacityExceeded {
                            event_id,
                            format,
                            count,
                            limit,
                        });
                    }
                }

                let registration = tx.create_registration(format)?;
                let next = evaluator::closure(&event, tx.count_by_format()?);
                if next != event.status {
                    tx.update_status(next)?;
                    tracing::debug!(
                        event_id,
                        from = %event.status,
                        to = %next,
                        "registration status closed after acceptance"
                    );
                }
                Ok((registration, next))
            })
            .inspect_err(|err| self.log_rejection("accept", event_id, err))?;

        tracing::debug!(
            event_id,
            registration_id = %registration.registration_id,
            format = %format,
            "registration accepted"
        );
        self.notify(RegistrationNotice::Accepted {
            registration: registration.clone(),
            status,
        });
        Ok(registration)
    }

    /// Withdraws a registration and frees its seat.
    ///
    /// Returns the removed registration.
    ///
    /// # Errors
    ///
    /// - `RegistrationNotFound` if it does not exist (or was withdrawn
    ///   concurrently).
    /// - `LockTimeout` if the event's lock could not be taken in time.
    pub fn withdraw(&self, registration_id: &str) -> Result<Registration, CapacityError> {
        let registration = self
            .store
            .find_registration(registration_id)?
            .ok_or_else(|| CapacityError::RegistrationNotFound(registration_id.to_string()))?;
        let event_id = registration.event_id;

        let status = self
            .store
            .with_event(event_id, self.lock_timeout, |tx| {
                tx.delete_registration(registration_id)?;
                let event = tx.event()?;
                let next = evaluator::reopen(&event, registration.format);
                if next != event.status {
                    tx.update_status(next)?;
                    tracing::debug!(
                        event_id,
                        from = %event.status,
                        to = %next,
                        "registration status reopened after withdrawal"
                    );
                }
                Ok(next)
            })
            .inspect_err(|err| self.log_rejection("withdraw", event_id, err))?;

        tracing::debug!(
            event_id,
            registration_id,
            format = %registration.format,
            "registration withdrawn"
        );
        self.notify(RegistrationNotice::Withdrawn {
            registration: registration.clone(),
            status,
        });
        Ok(registration)
    }

    /// Sets an event's status by hand, bypassing the rules.
    ///
    /// Taken under the event lock so it cannot interleave with an
    /// acceptance or withdrawal. Later rule evaluations start from whatever
    /// is set here.
    ///
    /// # Errors
    ///
    /// Returns `EventNotFound` or `LockTimeout`.
    pub fn override_status(
        &self,
        event_id: i64,
        status: RegistrationStatus,
    ) -> Result<Event, CapacityError> {
        self.store.with_event(event_id, self.lock_timeout, |tx| {
            let event = tx.event()?;
            if event.status != status {
                tx.update_status(status)?;
                tracing::info!(
                    event_id,
                    from = %event.status,
                    to = %status,
                    "registration status overridden"
                );
            }
            Ok(Event { status, ..event })
        })
    }

    /// Reads the event and its counts without locking.
    ///
    /// # Errors
    ///
    /// Returns `EventNotFound` if the event does not exist.
    pub fn availability(&self, event_id: i64) -> Result<Availability, CapacityError> {
        let (event, counts) = self.store.snapshot(event_id)?;
        Ok(Availability { event, counts })
    }

    /// Lists an event's live registrations in acceptance order.
    ///
    /// # Errors
    ///
    /// Returns `EventNotFound` if the event does not exist.
    pub fn registrations(&self, event_id: i64) -> Result<Vec<Registration>, CapacityError> {
        self.store.registrations(event_id)
    }

    fn notify(&self, notice: RegistrationNotice) {
        let Some(listener) = &self.listener else {
            return;
        };
        if let Err(err) = listener.notify(&notice) {
            tracing::warn!(
                registration_id = %notice.registration().registration_id,
                error = %err,
                "registration notice was not delivered"
            );
        }
    }

    fn log_rejection(&self, operation: &'static str, event_id: i64, err: &CapacityError) {
        match err {
            CapacityError::LockTimeout { timeout_ms, .. } => {
                tracing::warn!(operation, event_id, timeout_ms, "event lock timed out");
            }
            CapacityError::EventClosed { .. }
            | CapacityError::CapacityExceeded { .. }
            | CapacityError::RegistrationNotFound(_)
            | CapacityError::EventNotFound(_) => {
                tracing::debug!(operation, event_id, reason = %err, "registration rejected");
            }
            _ => {
                tracing::error!(operation, event_id, error = %err, "registration failed");
            }
        }
    }
}
