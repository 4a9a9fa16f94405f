use gigbook_core::db::open_db_in_memory;
use gigbook_core::{RepoError, SqliteClientRepository, SqliteTaskRepository};
use rusqlite::Connection;

#[test]
fn repositories_reject_unmigrated_connections() {
    let conn = Connection::open_in_memory().unwrap();

    let err = SqliteClientRepository::try_new(&conn).unwrap_err();
    assert!(matches!(
        err,
        RepoError::UninitializedConnection {
            actual_version: 0,
            ..
        }
    ));
}

#[test]
fn repositories_reject_missing_required_table() {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch("DROP TABLE clients;").unwrap();

    let err = SqliteClientRepository::try_new(&conn).unwrap_err();
    assert!(matches!(err, RepoError::MissingRequiredTable("clients")));
}

#[test]
fn repositories_reject_missing_required_column() {
    let mut conn = open_db_in_memory().unwrap();
    conn.execute_batch("ALTER TABLE tasks DROP COLUMN is_visible;")
        .unwrap();

    let err = SqliteTaskRepository::try_new(&mut conn).unwrap_err();
    assert!(matches!(
        err,
        RepoError::MissingRequiredColumn {
            table: "tasks",
            column: "is_visible",
        }
    ));
}

#[test]
fn ready_connection_constructs_repositories() {
    let conn = open_db_in_memory().unwrap();
    assert!(SqliteClientRepository::try_new(&conn).is_ok());
}
