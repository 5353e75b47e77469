//! Domain service for archived (soft-deleted) activities.
//!
//! The archive is a parallel store with its own id sequence. Moving an
//! activity here is the caller's two-step copy: insert into the archive, then
//! delete the original. Restoring is the mirror image — the archive never
//! recreates activity rows on its own.

use thiserror::Error;

use crate::db::ArchivedActivity;

/// Errors specific to archive operations.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Not signed in")]
    Unauthorized,

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sea_orm::DbErr> for ArchiveError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

/// Domain service trait for the archive.
#[async_trait::async_trait]
pub trait ArchiveService: Send + Sync {
    /// Inserts an archived row owned by the signed-in user, stamped with the
    /// current archival time.
    async fn archive_activity(
        &self,
        steps: i64,
        date: i64,
    ) -> Result<ArchivedActivity, ArchiveError>;

    /// Removes a row from the archive as part of a restore. At the store
    /// level this is a plain delete; re-creating the activity is the
    /// caller's responsibility.
    async fn unarchive_activity(&self, id: i32) -> Result<(), ArchiveError>;

    /// Removes a row from the archive permanently.
    async fn delete_archived_activity(&self, id: i32) -> Result<(), ArchiveError>;

    /// Deletes all of the acting user's archived rows (admins included).
    /// Returns the number of rows removed.
    async fn delete_all_archived(&self) -> Result<u64, ArchiveError>;

    /// The signed-in user's archived rows, most recently archived first.
    /// Refreshes the in-memory cache.
    async fn list_archived(&self) -> Result<Vec<ArchivedActivity>, ArchiveError>;

    /// Cross-user accessor for admin views; leaves the cache alone.
    async fn get_archived_by_user_id(
        &self,
        user_id: i32,
    ) -> Result<Vec<ArchivedActivity>, ArchiveError>;

    /// Snapshot of the cache as of the last awaited read or mutation.
    fn archived(&self) -> Vec<ArchivedActivity>;
}
