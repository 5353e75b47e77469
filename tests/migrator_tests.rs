//! Integration tests for startup schema repair: fresh creation, idempotence,
//! in-place column additions, and the backup-rename rebuild path.

use std::path::PathBuf;

use atlas::db::migrator::{self, ACTIVITIES, ALL_TABLES, USERS};
use atlas::db::{NewUser, Store};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

fn temp_db_path(tag: &str) -> PathBuf {
    std::env::temp_dir().join(format!("atlas-migrator-{tag}-{}.db", uuid::Uuid::new_v4()))
}

fn db_url(path: &PathBuf) -> String {
    format!("sqlite:{}", path.display())
}

/// Opens a raw connection for seeding legacy shapes before the store runs.
async fn raw_conn(path: &PathBuf) -> DatabaseConnection {
    if !path.exists() {
        std::fs::File::create(path).expect("failed to create db file");
    }
    Database::connect(db_url(path))
        .await
        .expect("failed to open raw connection")
}

async fn column_names(conn: &DatabaseConnection, table: &str) -> Vec<String> {
    let backend = conn.get_database_backend();
    let rows = conn
        .query_all(Statement::from_string(
            backend,
            format!("PRAGMA table_info({table})"),
        ))
        .await
        .expect("pragma failed");
    rows.iter()
        .map(|row| row.try_get::<String>("", "name").expect("missing name"))
        .collect()
}

#[tokio::test]
async fn fresh_store_schema_is_current() {
    let path = temp_db_path("fresh");
    let store = Store::new(&db_url(&path)).await.expect("store failed");

    for spec in ALL_TABLES {
        let needs = migrator::needs_migration(&store.conn, spec)
            .await
            .expect("inspection failed");
        assert!(!needs, "table `{}` should be current", spec.name);
    }
}

#[tokio::test]
async fn missing_table_reports_needs_migration() {
    let path = temp_db_path("missing");
    let conn = raw_conn(&path).await;

    let needs = migrator::needs_migration(&conn, &USERS)
        .await
        .expect("inspection failed");
    assert!(needs);
}

#[tokio::test]
async fn second_run_is_idempotent() {
    let path = temp_db_path("idempotent");
    let store = Store::new(&db_url(&path)).await.expect("store failed");

    store
        .insert_user(NewUser {
            email: "keep@example.com".to_string(),
            username: "keeper1".to_string(),
            password_hash: "unused-hash".to_string(),
            first_name: "Keep".to_string(),
            last_name: "Me".to_string(),
            phone: "5551234567".to_string(),
            is_admin: false,
            created_at: 1_700_000_000_000,
        })
        .await
        .expect("insert failed");

    let columns_before = column_names(&store.conn, "users").await;

    // Running the whole pass again must change nothing structurally and must
    // not drop rows.
    migrator::ensure_schema(&store.conn).await;

    let columns_after = column_names(&store.conn, "users").await;
    assert_eq!(columns_before, columns_after);

    let users = store.list_users().await.expect("listing failed");
    assert!(users.iter().any(|u| u.email == "keep@example.com"));
}

#[tokio::test]
async fn legacy_activities_table_upgrades_in_place() {
    let path = temp_db_path("legacy-activities");
    let conn = raw_conn(&path).await;

    // First-release shape: no user_id, no is_protected.
    conn.execute_unprepared(
        "CREATE TABLE activities (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            steps INTEGER NOT NULL,
            date INTEGER NOT NULL
        )",
    )
    .await
    .expect("create failed");
    conn.execute_unprepared(
        "INSERT INTO activities (steps, date) VALUES (4200, 1700000000), (8100, 1700086400)",
    )
    .await
    .expect("seed failed");
    conn.close().await.expect("close failed");

    let store = Store::new(&db_url(&path)).await.expect("store failed");

    let needs = migrator::needs_migration(&store.conn, &ACTIVITIES)
        .await
        .expect("inspection failed");
    assert!(!needs);

    // Rows survive with the default owner and unprotected.
    let rows = store
        .list_activities_for_user(0)
        .await
        .expect("listing failed");
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r| !r.is_protected));
    assert!(rows.iter().any(|r| r.steps == 4200));
}

#[tokio::test]
async fn legacy_users_table_rebuilds_with_placeholder_names() {
    let path = temp_db_path("legacy-users");
    let conn = raw_conn(&path).await;

    // Early shape without name columns: cannot be reconciled column by
    // column, so the store rebuilds the table and carries rows across.
    conn.execute_unprepared(
        "CREATE TABLE users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            email TEXT UNIQUE NOT NULL,
            username TEXT UNIQUE NOT NULL,
            password_hash TEXT NOT NULL,
            phone TEXT NOT NULL,
            is_admin BOOLEAN NOT NULL,
            created_at INTEGER NOT NULL
        )",
    )
    .await
    .expect("create failed");
    conn.execute_unprepared(
        "INSERT INTO users (email, username, password_hash, phone, is_admin, created_at)
         VALUES ('old@example.com', 'olduser1', 'legacy-hash', '5550001111', 0, 1600000000000)",
    )
    .await
    .expect("seed failed");
    conn.close().await.expect("close failed");

    let store = Store::new(&db_url(&path)).await.expect("store failed");

    let needs = migrator::needs_migration(&store.conn, &USERS)
        .await
        .expect("inspection failed");
    assert!(!needs);

    let users = store.list_users().await.expect("listing failed");
    let carried = users
        .iter()
        .find(|u| u.email == "old@example.com")
        .expect("legacy row was lost");
    assert_eq!(carried.first_name, "User");
    assert_eq!(carried.last_name, "Name");
    assert_eq!(carried.username, "olduser1");

    // The backup table must not linger after the rebuild.
    let backend = store.conn.get_database_backend();
    let leftover = store
        .conn
        .query_one(Statement::from_string(
            backend,
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name = 'users_backup'"
                .to_string(),
        ))
        .await
        .expect("query failed");
    assert!(leftover.is_none());
}
