mod helpers;

use cogcommit::db;
use cogcommit::db::migrations::{get_schema_version, run_migrations, CURRENT_SCHEMA_VERSION};

#[test]
fn fresh_db_migrates_to_current_version() {
    let conn = helpers::test_db();
    assert_eq!(get_schema_version(&conn).unwrap(), CURRENT_SCHEMA_VERSION);
}

#[test]
fn migrations_are_idempotent() {
    let conn = helpers::test_db();
    // Running again should be a no-op
    run_migrations(&conn).unwrap();
    assert_eq!(get_schema_version(&conn).unwrap(), CURRENT_SCHEMA_VERSION);
}

#[test]
fn v1_db_with_rows_upgrades_and_marks_them_pending() {
    let conn = rusqlite::Connection::open_in_memory().unwrap();
    conn.pragma_update(None, "foreign_keys", "ON").unwrap();
    db::schema::init_schema(&conn).unwrap();
    assert_eq!(get_schema_version(&conn).unwrap(), 1);

    conn.execute(
        "INSERT INTO cognitive_commits \
         (id, started_at, closed_at, closed_by, files_read, files_changed, source, created_at) \
         VALUES ('old', '2024-01-01T00:00:00Z', '2024-01-01T01:00:00Z', 'session_end', '[]', '[]', \
                 'claude_code', '2024-01-01T01:00:00Z')",
        [],
    )
    .unwrap();

    run_migrations(&conn).unwrap();

    assert_eq!(get_schema_version(&conn).unwrap(), CURRENT_SCHEMA_VERSION);
    let status: String = conn
        .query_row(
            "SELECT sync_status FROM cognitive_commits WHERE id = 'old'",
            [],
            |r| r.get(0),
        )
        .unwrap();
    assert_eq!(status, "pending");
}

#[test]
fn file_database_reopens_cleanly() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("data.db");

    {
        let mut conn = db::open_database(&path).unwrap();
        helpers::insert(
            &mut conn,
            &helpers::simple_commit("c1", "demo", "hello", "2025-01-15T10:00:00Z"),
        );
    }

    let conn = db::open_database(&path).unwrap();
    let report = db::check_database_health(&conn).unwrap();
    assert_eq!(report.schema_version, CURRENT_SCHEMA_VERSION);
    assert_eq!(report.commit_count, 1);
    assert_eq!(report.turn_count, 2);
    assert!(report.integrity_ok);
}
