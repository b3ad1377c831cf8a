//! Event, registration and capacity records.

use serde::{Deserialize, Serialize};

use crate::format::{EventFormat, RegistrationStatus, SeatFormat};

/// Whether `count` live registrations reach an optional seat limit.
///
/// An unset limit is never reached. The comparison is `>=` so that a count
/// pushed past the limit by a race is still reported as reached.
pub fn limit_reached(count: u32, limit: Option<u32>) -> bool {
    limit.is_some_and(|limit| count >= limit)
}

/// An event participants register for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Internal database ID.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Delivery format.
    pub format: EventFormat,
    /// Maximum live in-person registrations (None = unlimited).
    pub offline_limit: Option<u32>,
    /// Maximum live remote registrations (None = unlimited).
    pub online_limit: Option<u32>,
    /// Current admission status.
    pub status: RegistrationStatus,
    /// Creation timestamp (ISO 8601).
    pub created_at: String,
}

impl Event {
    /// The limit that applies to seats of `seat` format.
    pub fn limit_for(&self, seat: SeatFormat) -> Option<u32> {
        match seat {
            SeatFormat::Offline => self.offline_limit,
            SeatFormat::Online => self.online_limit,
        }
    }
}

/// One participant's seat at one event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    /// Internal database ID.
    pub id: i64,
    /// Unique public ID (UUID v4).
    pub registration_id: String,
    /// Owning event.
    pub event_id: i64,
    /// Seat format the participant committed to.
    pub format: SeatFormat,
    /// Creation timestamp (ISO 8601).
    pub created_at: String,
}

/// Live registration counts for one event, grouped by seat format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CapacitySnapshot {
    /// Live in-person registrations.
    pub offline: u32,
    /// Live remote registrations.
    pub online: u32,
}

impl CapacitySnapshot {
    /// Count for one seat format.
    pub fn count(&self, seat: SeatFormat) -> u32 {
        match seat {
            SeatFormat::Offline => self.offline,
            SeatFormat::Online => self.online,
        }
    }

    /// The snapshot with one more registration of `seat` format.
    #[must_use]
    pub fn with_added(self, seat: SeatFormat) -> Self {
        match seat {
            SeatFormat::Offline => Self {
                offline: self.offline.saturating_add(1),
                ..self
            },
            SeatFormat::Online => Self {
                online: self.online.saturating_add(1),
                ..self
            },
        }
    }

    /// Total live registrations.
    pub fn total(&self) -> u32 {
        self.offline.saturating_add(self.online)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_limit_is_never_reached() {
        assert!(!limit_reached(0, None));
        assert!(!limit_reached(u32::MAX, None));
    }

    #[test]
    fn limit_is_reached_at_and_beyond() {
        assert!(!limit_reached(1, Some(2)));
        assert!(limit_reached(2, Some(2)));
        assert!(limit_reached(3, Some(2)));
    }

    #[test]
    fn with_added_touches_one_side() {
        let snap = CapacitySnapshot {
            offline: 2,
            online: 5,
        };
        assert_eq!(
            snap.with_added(SeatFormat::Offline),
            CapacitySnapshot {
                offline: 3,
                online: 5
            }
        );
        assert_eq!(snap.with_added(SeatFormat::Online).count(SeatFormat::Online), 6);
        assert_eq!(snap.total(), 7);
    }
}
