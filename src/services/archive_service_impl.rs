//! `SeaORM` implementation of the `ArchiveService` trait.

use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;

use crate::db::{ArchivedActivity, Store};
use crate::services::archive_service::{ArchiveError, ArchiveService};
use crate::services::session::{Session, SessionUser};

pub struct SeaOrmArchiveService {
    store: Store,
    session: Arc<Session>,
    cache: RwLock<Vec<ArchivedActivity>>,
}

impl SeaOrmArchiveService {
    #[must_use]
    pub fn new(store: Store, session: Arc<Session>) -> Self {
        Self {
            store,
            session,
            cache: RwLock::new(Vec::new()),
        }
    }

    fn actor(&self) -> Result<SessionUser, ArchiveError> {
        self.session.user().ok_or(ArchiveError::Unauthorized)
    }

    fn owner_filter(actor: &SessionUser) -> Option<i32> {
        if actor.is_admin { None } else { Some(actor.id) }
    }

    async fn refresh_cache(&self, user_id: i32) -> Result<Vec<ArchivedActivity>, ArchiveError> {
        let rows = self.store.list_archived_for_user(user_id).await?;
        *self.cache.write().unwrap_or_else(PoisonError::into_inner) = rows.clone();
        Ok(rows)
    }
}

#[async_trait]
impl ArchiveService for SeaOrmArchiveService {
    async fn archive_activity(
        &self,
        steps: i64,
        date: i64,
    ) -> Result<ArchivedActivity, ArchiveError> {
        let actor = self.actor()?;

        let archived_at = chrono::Utc::now().timestamp();
        let row = self
            .store
            .insert_archived_activity(actor.id, steps, date, archived_at)
            .await?;

        self.refresh_cache(actor.id).await?;
        Ok(row)
    }

    async fn unarchive_activity(&self, id: i32) -> Result<(), ArchiveError> {
        let actor = self.actor()?;

        self.store
            .delete_archived_activity(id, Self::owner_filter(&actor))
            .await?;

        self.refresh_cache(actor.id).await?;
        Ok(())
    }

    async fn delete_archived_activity(&self, id: i32) -> Result<(), ArchiveError> {
        let actor = self.actor()?;

        self.store
            .delete_archived_activity(id, Self::owner_filter(&actor))
            .await?;

        self.refresh_cache(actor.id).await?;
        Ok(())
    }

    async fn delete_all_archived(&self) -> Result<u64, ArchiveError> {
        let actor = self.actor()?;

        let removed = self.store.delete_all_archived_for_user(actor.id).await?;

        self.refresh_cache(actor.id).await?;
        Ok(removed)
    }

    async fn list_archived(&self) -> Result<Vec<ArchivedActivity>, ArchiveError> {
        let actor = self.actor()?;
        self.refresh_cache(actor.id).await
    }

    async fn get_archived_by_user_id(
        &self,
        user_id: i32,
    ) -> Result<Vec<ArchivedActivity>, ArchiveError> {
        self.actor()?;
        Ok(self.store.list_archived_for_user(user_id).await?)
    }

    fn archived(&self) -> Vec<ArchivedActivity> {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
