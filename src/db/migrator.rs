//! Runtime schema inspection and repair for the on-device store.
//!
//! The persisted schema has changed shape across app versions, so instead of a
//! versioned migration ledger the store sniffs each table's actual column set
//! at startup and brings it up to the current shape. Failures here are logged
//! and swallowed by the caller: a half-migrated table must never block startup.

use std::collections::HashSet;

use sea_orm::{ConnectionTrait, DatabaseConnection, DbErr, Schema, Statement};
use tracing::{info, warn};

use crate::entities::{activities, archived_activities, password_reset_requests, users};

pub struct ColumnSpec {
    pub name: &'static str,

    /// DDL used to add this column in place via `ALTER TABLE ... ADD COLUMN`.
    /// `None` marks columns that cannot be bolted onto an existing table
    /// (UNIQUE constraints, NOT NULL text with no usable default); a missing
    /// column of that kind forces a full table rebuild.
    pub add_ddl: Option<&'static str>,

    /// SQL literal substituted for this column when copying rows out of a
    /// backup table that does not have it.
    pub copy_default: &'static str,
}

pub struct TableSpec {
    pub name: &'static str,
    pub columns: &'static [ColumnSpec],
}

const fn col(
    name: &'static str,
    add_ddl: Option<&'static str>,
    copy_default: &'static str,
) -> ColumnSpec {
    ColumnSpec {
        name,
        add_ddl,
        copy_default,
    }
}

/// Early user tables had no name fields; missing `first_name`/`last_name`
/// therefore lands on the rebuild path with placeholder names.
pub const USERS: TableSpec = TableSpec {
    name: "users",
    columns: &[
        col("id", None, "NULL"),
        col("email", None, "''"),
        col("username", None, "''"),
        col("password_hash", None, "''"),
        col("first_name", None, "'User'"),
        col("last_name", None, "'Name'"),
        col("phone", Some("TEXT NOT NULL DEFAULT ''"), "''"),
        col("is_admin", Some("BOOLEAN NOT NULL DEFAULT FALSE"), "FALSE"),
        col("created_at", Some("INTEGER NOT NULL DEFAULT 0"), "0"),
    ],
};

pub const PASSWORD_RESET_REQUESTS: TableSpec = TableSpec {
    name: "password_reset_requests",
    columns: &[
        col("id", None, "NULL"),
        col("user_id", None, "0"),
        col("username", None, "''"),
        col("email", None, "''"),
        col("requested_at", Some("INTEGER NOT NULL DEFAULT 0"), "0"),
        col("status", Some("TEXT NOT NULL DEFAULT 'pending'"), "'pending'"),
        col("approved_by", Some("INTEGER"), "NULL"),
        col("approved_at", Some("INTEGER"), "NULL"),
        col("completed_at", Some("INTEGER"), "NULL"),
    ],
};

/// `user_id` and `is_protected` arrived after the first release; both carry
/// safe defaults so old tables upgrade in place without losing rows.
pub const ACTIVITIES: TableSpec = TableSpec {
    name: "activities",
    columns: &[
        col("id", None, "NULL"),
        col("steps", None, "0"),
        col("date", None, "0"),
        col("user_id", Some("INTEGER NOT NULL DEFAULT 0"), "0"),
        col("is_protected", Some("BOOLEAN NOT NULL DEFAULT FALSE"), "FALSE"),
    ],
};

pub const ARCHIVED_ACTIVITIES: TableSpec = TableSpec {
    name: "archived_activities",
    columns: &[
        col("id", None, "NULL"),
        col("steps", None, "0"),
        col("date", None, "0"),
        col("archived_at", Some("INTEGER NOT NULL DEFAULT 0"), "0"),
        col("user_id", Some("INTEGER NOT NULL DEFAULT 0"), "0"),
    ],
};

pub const ALL_TABLES: &[&TableSpec] = &[
    &USERS,
    &PASSWORD_RESET_REQUESTS,
    &ACTIVITIES,
    &ARCHIVED_ACTIVITIES,
];

/// Brings every table up to the current shape. Never returns an error: a table
/// that cannot be migrated is logged and left as-is so the app still starts.
pub async fn ensure_schema(conn: &DatabaseConnection) {
    for spec in ALL_TABLES {
        match needs_migration(conn, spec).await {
            Ok(true) => {
                if let Err(e) = migrate(conn, spec).await {
                    warn!(
                        "Migration of `{}` failed, continuing with existing shape: {e}",
                        spec.name
                    );
                }
            }
            Ok(false) => {}
            Err(e) => warn!("Could not inspect `{}`: {e}", spec.name),
        }
    }
}

/// True when the table is absent or any expected column is missing. A missing
/// table and a stale table are handled identically by [`migrate`].
pub async fn needs_migration(conn: &DatabaseConnection, spec: &TableSpec) -> Result<bool, DbErr> {
    if !table_exists(conn, spec.name).await? {
        return Ok(true);
    }

    let existing = existing_columns(conn, spec.name).await?;
    Ok(spec
        .columns
        .iter()
        .any(|c| !existing.contains(c.name)))
}

/// Evolves one table to the current shape.
///
/// Missing table: created fresh from the entity definition. Missing columns
/// that all have an in-place DDL form: added one by one, never dropping
/// anything. Anything else: backup-rename rebuild with a best-effort
/// column-mapped copy; if the copy fails the new table starts empty.
pub async fn migrate(conn: &DatabaseConnection, spec: &TableSpec) -> Result<(), DbErr> {
    if !table_exists(conn, spec.name).await? {
        create_table(conn, spec).await?;
        info!("Created table `{}`", spec.name);
        return Ok(());
    }

    let existing = existing_columns(conn, spec.name).await?;
    let missing: Vec<&ColumnSpec> = spec
        .columns
        .iter()
        .filter(|c| !existing.contains(c.name))
        .collect();

    if missing.is_empty() {
        return Ok(());
    }

    if missing.iter().all(|c| c.add_ddl.is_some()) {
        for column in &missing {
            let Some(ddl) = column.add_ddl else { continue };
            conn.execute_unprepared(&format!(
                "ALTER TABLE {} ADD COLUMN {} {}",
                spec.name, column.name, ddl
            ))
            .await?;
        }
        info!(
            "Added {} missing column(s) to `{}`",
            missing.len(),
            spec.name
        );
        return Ok(());
    }

    rebuild(conn, spec, &existing).await
}

/// Backup-rename fallback for shapes that cannot be reconciled column by
/// column. Rows are copied back with placeholder literals standing in for
/// columns the old shape never had.
async fn rebuild(
    conn: &DatabaseConnection,
    spec: &TableSpec,
    existing: &HashSet<String>,
) -> Result<(), DbErr> {
    let backup = format!("{}_backup", spec.name);

    conn.execute_unprepared(&format!("DROP TABLE IF EXISTS {backup}"))
        .await?;
    conn.execute_unprepared(&format!("ALTER TABLE {} RENAME TO {backup}", spec.name))
        .await?;

    create_table(conn, spec).await?;

    let columns = spec
        .columns
        .iter()
        .map(|c| c.name)
        .collect::<Vec<_>>()
        .join(", ");
    let sources = spec
        .columns
        .iter()
        .map(|c| {
            if existing.contains(c.name) {
                c.name.to_string()
            } else {
                c.copy_default.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(", ");

    let copy = format!(
        "INSERT INTO {} ({columns}) SELECT {sources} FROM {backup}",
        spec.name
    );
    if let Err(e) = conn.execute_unprepared(&copy).await {
        warn!(
            "Could not carry rows into rebuilt `{}`, starting empty: {e}",
            spec.name
        );
    } else {
        info!("Rebuilt table `{}` and carried existing rows over", spec.name);
    }

    conn.execute_unprepared(&format!("DROP TABLE IF EXISTS {backup}"))
        .await?;

    Ok(())
}

async fn create_table(conn: &DatabaseConnection, spec: &TableSpec) -> Result<(), DbErr> {
    let backend = conn.get_database_backend();
    let schema = Schema::new(backend);

    let mut stmt = match spec.name {
        "users" => schema.create_table_from_entity(users::Entity),
        "password_reset_requests" => {
            schema.create_table_from_entity(password_reset_requests::Entity)
        }
        "activities" => schema.create_table_from_entity(activities::Entity),
        "archived_activities" => schema.create_table_from_entity(archived_activities::Entity),
        other => return Err(DbErr::Custom(format!("unknown table `{other}`"))),
    };

    conn.execute(backend.build(stmt.if_not_exists())).await?;
    Ok(())
}

async fn table_exists(conn: &DatabaseConnection, table: &str) -> Result<bool, DbErr> {
    let backend = conn.get_database_backend();
    let row = conn
        .query_one(Statement::from_sql_and_values(
            backend,
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?",
            [table.into()],
        ))
        .await?;
    Ok(row.is_some())
}

async fn existing_columns(
    conn: &DatabaseConnection,
    table: &str,
) -> Result<HashSet<String>, DbErr> {
    let backend = conn.get_database_backend();
    let rows = conn
        .query_all(Statement::from_string(
            backend,
            format!("PRAGMA table_info({table})"),
        ))
        .await?;

    rows.iter().map(|row| row.try_get("", "name")).collect()
}
