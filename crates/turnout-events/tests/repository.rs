use rusqlite::Connection;
use turnout_events::{
    count_by_format, create_event, delete_registration, get_event, get_registration,
    insert_registration, list_events, list_registrations, update_event_status, EventStoreError,
    NewEvent,
};
use turnout_types::{EventFormat, RegistrationStatus, SeatFormat};

fn test_db() -> Connection {
    let conn = Connection::open_in_memory().expect("should open in-memory db");
    conn.pragma_update(None, "foreign_keys", "ON")
        .expect("should enable foreign keys");
    turnout_db::run_migrations(&conn).expect("migrations should succeed");
    conn
}

fn hybrid(name: &str, offline: Option<u32>, online: Option<u32>) -> NewEvent {
    NewEvent {
        name: name.to_string(),
        format: EventFormat::Hybrid,
        offline_limit: offline,
        online_limit: online,
    }
}

#[test]
fn created_event_starts_open_and_reads_back() {
    let conn = test_db();
    let created = create_event(&conn, &hybrid("conf", Some(20), None)).expect("create");
    assert_eq!(created.status, RegistrationStatus::Open);

    let loaded = get_event(&conn, created.id).expect("get");
    assert_eq!(loaded, created);
    assert_eq!(loaded.offline_limit, Some(20));
    assert_eq!(loaded.online_limit, None);
}

#[test]
fn hybrid_event_without_limits_is_rejected() {
    let conn = test_db();
    let err = create_event(&conn, &hybrid("boundless", None, None)).unwrap_err();
    assert!(matches!(err, EventStoreError::InvalidEvent(_)), "got {err:?}");
    assert!(list_events(&conn).expect("list").is_empty());
}

#[test]
fn strict_event_without_limit_is_unlimited() {
    let conn = test_db();
    let event = create_event(
        &conn,
        &NewEvent {
            name: "stream".to_string(),
            format: EventFormat::Online,
            offline_limit: None,
            online_limit: None,
        },
    )
    .expect("an unlimited online event is valid");
    assert_eq!(event.format, EventFormat::Online);
}

#[test]
fn zero_limit_is_rejected() {
    let conn = test_db();
    let err = create_event(&conn, &hybrid("zero", Some(0), Some(5))).unwrap_err();
    assert!(matches!(err, EventStoreError::InvalidEvent(_)));
}

#[test]
fn missing_event_is_not_found() {
    let conn = test_db();
    assert!(matches!(
        get_event(&conn, 42),
        Err(EventStoreError::EventNotFound(42))
    ));
    assert!(matches!(
        update_event_status(&conn, 42, RegistrationStatus::Closed),
        Err(EventStoreError::EventNotFound(42))
    ));
}

#[test]
fn status_update_persists_any_value() {
    let conn = test_db();
    let event = create_event(&conn, &hybrid("manual", Some(3), Some(3))).expect("create");

    update_event_status(&conn, event.id, RegistrationStatus::OnlineClosed).expect("update");
    assert_eq!(
        get_event(&conn, event.id).expect("get").status,
        RegistrationStatus::OnlineClosed
    );
}

#[test]
fn counts_are_grouped_by_format() {
    let conn = test_db();
    let event = create_event(&conn, &hybrid("counted", Some(10), Some(10))).expect("create");
    let other = create_event(&conn, &hybrid("other", Some(10), None)).expect("create other");

    insert_registration(&conn, event.id, SeatFormat::Offline).expect("offline 1");
    insert_registration(&conn, event.id, SeatFormat::Offline).expect("offline 2");
    insert_registration(&conn, event.id, SeatFormat::Online).expect("online 1");
    insert_registration(&conn, other.id, SeatFormat::Offline).expect("other event");

    let snap = count_by_format(&conn, event.id).expect("count");
    assert_eq!(snap.offline, 2);
    assert_eq!(snap.online, 1);

    let empty = create_event(&conn, &hybrid("empty", None, Some(1))).expect("create empty");
    assert_eq!(count_by_format(&conn, empty.id).expect("count").total(), 0);
}

#[test]
fn registration_round_trip_and_delete() {
    let conn = test_db();
    let event = create_event(&conn, &hybrid("rt", Some(2), None)).expect("create");

    let reg = insert_registration(&conn, event.id, SeatFormat::Online).expect("insert");
    assert_eq!(reg.event_id, event.id);
    assert_eq!(reg.registration_id.len(), 36, "public id should be a UUID");

    let loaded = get_registration(&conn, &reg.registration_id).expect("get");
    assert_eq!(loaded, reg);

    delete_registration(&conn, &reg.registration_id).expect("delete");
    assert!(matches!(
        get_registration(&conn, &reg.registration_id),
        Err(EventStoreError::RegistrationNotFound(_))
    ));
    assert!(matches!(
        delete_registration(&conn, &reg.registration_id),
        Err(EventStoreError::RegistrationNotFound(_))
    ));
}

#[test]
fn registrations_list_in_acceptance_order() {
    let conn = test_db();
    let event = create_event(&conn, &hybrid("ordered", Some(5), Some(5))).expect("create");

    let first = insert_registration(&conn, event.id, SeatFormat::Online).expect("first");
    let second = insert_registration(&conn, event.id, SeatFormat::Offline).expect("second");

    let listed = list_registrations(&conn, event.id).expect("list");
    let ids: Vec<_> = listed.iter().map(|r| r.registration_id.as_str()).collect();
    assert_eq!(
        ids,
        vec![first.registration_id.as_str(), second.registration_id.as_str()]
    );
}

#[test]
fn registration_for_missing_event_violates_foreign_key() {
    let conn = test_db();
    let err = insert_registration(&conn, 999, SeatFormat::Offline).unwrap_err();
    assert!(matches!(err, EventStoreError::Database(_)));
}
