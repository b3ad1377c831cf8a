//! Status rules applied after a registration is accepted or withdrawn.
//!
//! Both functions are pure: they look only at the event's format, limits and
//! current status plus the facts of the change, and return the status the
//! event should have next. Returning the current status means "leave it
//! alone", which is also how manual operator overrides survive.

use turnout_types::{
    limit_reached, CapacitySnapshot, Event, EventFormat, RegistrationStatus, SeatFormat,
};

/// Status after a new registration has been counted in `counts`.
///
/// Only ever moves toward closure. Rules, first match wins:
///
/// 1. `CLOSED` stays `CLOSED`.
/// 2. Hybrid, offline full, online not full: `OFFLINE_CLOSED`.
/// 3. Hybrid, online full, offline not full: `ONLINE_CLOSED`.
/// 4. `CLOSED` when a strict event's own limit is full, or when a hybrid
///    event already closed on one side fills the other.
/// 5. Otherwise unchanged.
pub fn closure(event: &Event, counts: CapacitySnapshot) -> RegistrationStatus {
    use EventFormat::{Hybrid, Offline, Online};
    use RegistrationStatus::{Closed, OfflineClosed, OnlineClosed};

    debug_assert!(
        event.format != Hybrid
            || event.offline_limit.is_some()
            || event.online_limit.is_some(),
        "hybrid event {} has no participant limits",
        event.id
    );

    let offline_full = limit_reached(counts.offline, event.offline_limit);
    let online_full = limit_reached(counts.online, event.online_limit);

    match (event.format, event.status) {
        (_, Closed) => Closed,
        (Hybrid, _) if offline_full && !online_full => OfflineClosed,
        (Hybrid, _) if online_full && !offline_full => OnlineClosed,
        (Offline, _) if offline_full => Closed,
        (Online, _) if online_full => Closed,
        (Hybrid, OfflineClosed) if online_full => Closed,
        (Hybrid, OnlineClosed) if offline_full => Closed,
        (_, status) => status,
    }
}

/// Status after a registration of `withdrawn` format has been removed.
///
/// A strict event reopens fully as soon as any seat frees. A hybrid event
/// only reopens the side whose limit was the reason it closed; withdrawing
/// from the other side changes nothing.
pub fn reopen(event: &Event, withdrawn: SeatFormat) -> RegistrationStatus {
    use EventFormat::Hybrid;
    use RegistrationStatus::{Closed, OfflineClosed, Open, OnlineClosed};

    let offline_set = event.offline_limit.is_some();
    let online_set = event.online_limit.is_some();

    match (event.format, event.status, withdrawn) {
        (format, Closed, _) if format != Hybrid => Open,
        (Hybrid, OfflineClosed, SeatFormat::Offline) if offline_set => Open,
        (Hybrid, OnlineClosed, SeatFormat::Online) if online_set => Open,
        (Hybrid, Closed, SeatFormat::Offline) if offline_set && !online_set => Open,
        (Hybrid, Closed, SeatFormat::Online) if online_set && !offline_set => Open,
        (Hybrid, Closed, SeatFormat::Online) if offline_set && online_set => OfflineClosed,
        (Hybrid, Closed, SeatFormat::Offline) if offline_set && online_set => OnlineClosed,
        (_, status, _) => status,
    }
}
