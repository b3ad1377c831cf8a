use turnout_db::{create_pool, run_migrations, DbRuntimeSettings};

#[test]
fn pooled_connections_share_a_file_database() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("shared.db");
    let pool = create_pool(path.to_str().expect("utf-8 path"), DbRuntimeSettings::default())
        .expect("failed to create pool");

    {
        let conn = pool.get().expect("failed to get connection");
        run_migrations(&conn).expect("failed to run migrations");
        conn.execute(
            "INSERT INTO events (name, format, offline_limit) VALUES ('meetup', 'OFFLINE', 10)",
            [],
        )
        .expect("insert event");
    }

    let other = pool.get().expect("failed to get second connection");
    let name: String = other
        .query_row("SELECT name FROM events WHERE offline_limit = 10", [], |row| {
            row.get(0)
        })
        .expect("event should be visible from another connection");
    assert_eq!(name, "meetup");
}

#[test]
fn deleting_an_event_cascades_to_registrations() {
    let pool = create_pool(":memory:", DbRuntimeSettings::default()).expect("pool");
    let conn = pool.get().expect("connection");
    run_migrations(&conn).expect("migrations");

    conn.execute("INSERT INTO events (name) VALUES ('cascade')", [])
        .expect("insert event");
    let event_id = conn.last_insert_rowid();
    conn.execute(
        "INSERT INTO registrations (registration_id, event_id, format) VALUES ('r-1', ?1, 'ONLINE')",
        [event_id],
    )
    .expect("insert registration");

    conn.execute("DELETE FROM events WHERE id = ?1", [event_id])
        .expect("delete event");
    let left: i64 = conn
        .query_row("SELECT COUNT(*) FROM registrations", [], |row| row.get(0))
        .expect("count");
    assert_eq!(left, 0);
}

#[test]
fn zero_limits_are_rejected_by_the_schema() {
    let pool = create_pool(":memory:", DbRuntimeSettings::default()).expect("pool");
    let conn = pool.get().expect("connection");
    run_migrations(&conn).expect("migrations");

    let result = conn.execute(
        "INSERT INTO events (name, format, online_limit) VALUES ('zero', 'ONLINE', 0)",
        [],
    );
    assert!(result.is_err());
}
