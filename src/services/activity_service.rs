//! Domain service for the step-count log.
//!
//! Every operation consults the shared session: non-admin actors only see and
//! touch their own rows; admins can reach any row by id. Bulk deletes stay
//! scoped to the acting user's own rows regardless of role.

use thiserror::Error;

use crate::db::Activity;

/// Errors specific to activity operations.
#[derive(Debug, Error)]
pub enum ActivityError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Not signed in")]
    Unauthorized,

    #[error("Activity {0} does not exist")]
    NotFound(i32),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sea_orm::DbErr> for ActivityError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

/// Domain service trait for the activity log.
#[async_trait::async_trait]
pub trait ActivityService: Send + Sync {
    /// Records a step count owned by the signed-in user. `date` defaults to
    /// now (unix epoch seconds) when not given.
    ///
    /// # Errors
    ///
    /// Returns [`ActivityError::Validation`] for a negative step count.
    async fn add_activity(&self, steps: i64, date: Option<i64>) -> Result<Activity, ActivityError>;

    /// Replaces the step count of one row.
    async fn update_activity(&self, id: i32, steps: i64) -> Result<(), ActivityError>;

    /// Deletes one row. Deleting an already-gone row is a no-op, so two rapid
    /// calls on the same id do not error.
    async fn delete_activity(&self, id: i32) -> Result<(), ActivityError>;

    /// Deletes all of the acting user's rows (admins included — this never
    /// reaches across users). Returns the number of rows removed.
    async fn delete_all_activities(&self) -> Result<u64, ActivityError>;

    /// Deletes the acting user's unprotected rows only. Protected rows
    /// survive. Returns the number of rows removed.
    async fn delete_all_unprotected(&self) -> Result<u64, ActivityError>;

    /// Marks one row as exempt from `delete_all_unprotected`.
    async fn protect_activity(&self, id: i32) -> Result<(), ActivityError>;

    async fn unprotect_activity(&self, id: i32) -> Result<(), ActivityError>;

    /// The signed-in user's rows, most recent first. Refreshes the in-memory
    /// cache.
    async fn list_activities(&self) -> Result<Vec<Activity>, ActivityError>;

    /// Cross-user accessor for admin views: takes an explicit target id
    /// instead of the session id and leaves the cache alone.
    async fn get_activities_by_user_id(
        &self,
        user_id: i32,
    ) -> Result<Vec<Activity>, ActivityError>;

    /// Snapshot of the cache as of the last awaited read or mutation.
    fn activities(&self) -> Vec<Activity>;
}
