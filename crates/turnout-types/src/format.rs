//! Delivery formats and admission status codes.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The way an event is delivered to participants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventFormat {
    /// Participants attend remotely only.
    Online,
    /// Participants attend in person only.
    Offline,
    /// Both in-person and remote seats, each with its own limit.
    Hybrid,
}

impl EventFormat {
    /// Returns the canonical code for this format.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Online => "ONLINE",
            Self::Offline => "OFFLINE",
            Self::Hybrid => "HYBRID",
        }
    }

    /// Whether a participant may take a seat of `seat` format at an event of
    /// this format. Hybrid events admit both; strict events only their own.
    pub fn admits(self, seat: SeatFormat) -> bool {
        match self {
            Self::Hybrid => true,
            Self::Online => seat == SeatFormat::Online,
            Self::Offline => seat == SeatFormat::Offline,
        }
    }
}

/// The format a single registration commits to.
///
/// Kept separate from [`EventFormat`] so that a `HYBRID` registration cannot
/// be expressed at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SeatFormat {
    /// A remote seat.
    Online,
    /// An in-person seat.
    Offline,
}

impl SeatFormat {
    /// Returns the canonical code for this seat format.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Online => "ONLINE",
            Self::Offline => "OFFLINE",
        }
    }
}

/// Admission state of an event.
///
/// Automatic transitions only ever produce `Open` and `Closed` for strict
/// events, but operators may set any value by hand, so every consumer must
/// accept all four.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RegistrationStatus {
    /// Registration is open for every format the event runs.
    #[default]
    Open,
    /// In-person registration is closed; remote seats may still be taken.
    OfflineClosed,
    /// Remote registration is closed; in-person seats may still be taken.
    OnlineClosed,
    /// Registration is closed for every format.
    Closed,
}

impl RegistrationStatus {
    /// Returns the canonical code for this status.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::OfflineClosed => "OFFLINE_CLOSED",
            Self::OnlineClosed => "ONLINE_CLOSED",
            Self::Closed => "CLOSED",
        }
    }

    /// Whether this status refuses new registrations of `seat` format.
    pub fn blocks(self, seat: SeatFormat) -> bool {
        match self {
            Self::Open => false,
            Self::Closed => true,
            Self::OfflineClosed => seat == SeatFormat::Offline,
            Self::OnlineClosed => seat == SeatFormat::Online,
        }
    }
}

/// Error returned when a stored or submitted code is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} code: {code}")]
pub struct ParseCodeError {
    /// Which enum was being parsed.
    pub kind: &'static str,
    /// The offending input.
    pub code: String,
}

macro_rules! impl_code {
    ($ty:ty, $kind:literal, [$($code:literal => $variant:expr),+ $(,)?]) => {
        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $ty {
            type Err = ParseCodeError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($code => Ok($variant),)+
                    _ => Err(ParseCodeError {
                        kind: $kind,
                        code: s.to_string(),
                    }),
                }
            }
        }
    };
}

impl_code!(EventFormat, "event format", [
    "ONLINE" => EventFormat::Online,
    "OFFLINE" => EventFormat::Offline,
    "HYBRID" => EventFormat::Hybrid,
]);

impl_code!(SeatFormat, "seat format", [
    "ONLINE" => SeatFormat::Online,
    "OFFLINE" => SeatFormat::Offline,
]);

impl_code!(RegistrationStatus, "registration status", [
    "OPEN" => RegistrationStatus::Open,
    "OFFLINE_CLOSED" => RegistrationStatus::OfflineClosed,
    "ONLINE_CLOSED" => RegistrationStatus::OnlineClosed,
    "CLOSED" => RegistrationStatus::Closed,
]);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_parse_back() {
        for status in [
            RegistrationStatus::Open,
            RegistrationStatus::OfflineClosed,
            RegistrationStatus::OnlineClosed,
            RegistrationStatus::Closed,
        ] {
            assert_eq!(status.as_str().parse::<RegistrationStatus>(), Ok(status));
        }
    }

    #[test]
    fn hybrid_is_not_a_seat_format() {
        let err = "HYBRID".parse::<SeatFormat>().unwrap_err();
        assert_eq!(err.kind, "seat format");
        assert_eq!(err.to_string(), "unknown seat format code: HYBRID");
    }

    #[test]
    fn lowercase_codes_are_rejected() {
        assert!("open".parse::<RegistrationStatus>().is_err());
        assert!("online".parse::<EventFormat>().is_err());
    }

    #[test]
    fn partial_closure_blocks_one_side_only() {
        assert!(RegistrationStatus::OfflineClosed.blocks(SeatFormat::Offline));
        assert!(!RegistrationStatus::OfflineClosed.blocks(SeatFormat::Online));
        assert!(RegistrationStatus::OnlineClosed.blocks(SeatFormat::Online));
        assert!(!RegistrationStatus::OnlineClosed.blocks(SeatFormat::Offline));
        assert!(RegistrationStatus::Closed.blocks(SeatFormat::Online));
        assert!(!RegistrationStatus::Open.blocks(SeatFormat::Offline));
    }

    #[test]
    fn strict_events_admit_their_own_format() {
        assert!(EventFormat::Online.admits(SeatFormat::Online));
        assert!(!EventFormat::Online.admits(SeatFormat::Offline));
        assert!(EventFormat::Offline.admits(SeatFormat::Offline));
        assert!(EventFormat::Hybrid.admits(SeatFormat::Online));
        assert!(EventFormat::Hybrid.admits(SeatFormat::Offline));
    }
}
