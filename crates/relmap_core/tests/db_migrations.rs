use relmap_core::db::migrations::latest_version;
use relmap_core::db::{open_db, open_db_in_memory, DbError};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().expect("in-memory store");

    assert_eq!(schema_version(&conn), latest_version());
    assert_sqlite_object_exists(&conn, "table", "type_reference_snapshots");
    assert_sqlite_object_exists(&conn, "index", "idx_type_reference_snapshots_representation");
}

#[test]
fn reopening_a_store_keeps_schema_and_rows() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("types.db");

    let first = open_db(&path).expect("first open");
    first
        .execute(
            "INSERT INTO type_reference_snapshots (name, representation, type_code)
             VALUES ('string', 'string', 12);",
            [],
        )
        .expect("insert row");
    drop(first);

    let second = open_db(&path).expect("second open");
    assert_eq!(schema_version(&second), latest_version());
    let count: i64 = second
        .query_row("SELECT COUNT(*) FROM type_reference_snapshots;", [], |row| {
            row.get(0)
        })
        .expect("count rows");
    assert_eq!(count, 1);
}

#[test]
fn upgrading_from_first_schema_adds_index() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("v1.db");

    let conn = Connection::open(&path).expect("raw open");
    conn.execute_batch(
        "CREATE TABLE type_reference_snapshots (
            name TEXT PRIMARY KEY NOT NULL,
            representation TEXT NOT NULL,
            type_code INTEGER NOT NULL,
            converter TEXT,
            force_immutable INTEGER NOT NULL DEFAULT 0 CHECK (force_immutable IN (0, 1)),
            saved_at INTEGER NOT NULL DEFAULT (strftime('%s', 'now') * 1000)
        );
        PRAGMA user_version = 1;",
    )
    .expect("seed v1 schema");
    drop(conn);

    let upgraded = open_db(&path).expect("upgrade");
    assert_eq!(schema_version(&upgraded), latest_version());
    assert_sqlite_object_exists(
        &upgraded,
        "index",
        "idx_type_reference_snapshots_representation",
    );
}

#[test]
fn failed_migration_reports_its_version_and_rolls_back() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("broken-v1.db");

    // Claims schema 1 without the snapshot table, so the index migration fails.
    let conn = Connection::open(&path).expect("raw open");
    conn.execute_batch("PRAGMA user_version = 1;")
        .expect("set version without schema");
    drop(conn);

    let err = open_db(&path).expect_err("index on a missing table must fail");
    assert!(matches!(err, DbError::Migration { version: 2, .. }));
    assert!(err.to_string().contains("migration 2"));

    let conn = Connection::open(&path).expect("raw reopen");
    assert_eq!(schema_version(&conn), 1);
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).expect("raw open");
    conn.execute_batch("PRAGMA user_version = 999;")
        .expect("set future version");
    drop(conn);

    let err = open_db(&path).expect_err("newer schema must be rejected");
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .expect("read user_version")
}

fn assert_sqlite_object_exists(conn: &Connection, kind: &str, name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = ?1 AND name = ?2
            );",
            [kind, name],
            |row| row.get(0),
        )
        .expect("query sqlite_master");
    assert_eq!(exists, 1, "{kind} {name} does not exist");
}
