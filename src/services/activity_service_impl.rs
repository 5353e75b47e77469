//! `SeaORM` implementation of the `ActivityService` trait.

use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;

use crate::db::{Activity, Store};
use crate::services::activity_service::{ActivityError, ActivityService};
use crate::services::session::{Session, SessionUser};

pub struct SeaOrmActivityService {
    store: Store,
    session: Arc<Session>,
    cache: RwLock<Vec<Activity>>,
}

impl SeaOrmActivityService {
    #[must_use]
    pub fn new(store: Store, session: Arc<Session>) -> Self {
        Self {
            store,
            session,
            cache: RwLock::new(Vec::new()),
        }
    }

    fn actor(&self) -> Result<SessionUser, ActivityError> {
        self.session.user().ok_or(ActivityError::Unauthorized)
    }

    /// `None` lifts the ownership constraint for admins.
    fn owner_filter(actor: &SessionUser) -> Option<i32> {
        if actor.is_admin { None } else { Some(actor.id) }
    }

    /// Re-reads the acting user's rows so the cache always reflects the most
    /// recently awaited mutation.
    async fn refresh_cache(&self, user_id: i32) -> Result<Vec<Activity>, ActivityError> {
        let rows = self.store.list_activities_for_user(user_id).await?;
        *self.cache.write().unwrap_or_else(PoisonError::into_inner) = rows.clone();
        Ok(rows)
    }
}

#[async_trait]
impl ActivityService for SeaOrmActivityService {
    async fn add_activity(&self, steps: i64, date: Option<i64>) -> Result<Activity, ActivityError> {
        let actor = self.actor()?;

        if steps < 0 {
            return Err(ActivityError::Validation(
                "Steps must be a non-negative number".to_string(),
            ));
        }

        let date = date.unwrap_or_else(|| chrono::Utc::now().timestamp());
        let activity = self.store.insert_activity(actor.id, steps, date).await?;

        self.refresh_cache(actor.id).await?;
        Ok(activity)
    }

    async fn update_activity(&self, id: i32, steps: i64) -> Result<(), ActivityError> {
        let actor = self.actor()?;

        if steps < 0 {
            return Err(ActivityError::Validation(
                "Steps must be a non-negative number".to_string(),
            ));
        }

        let rows = self
            .store
            .update_activity_steps(id, steps, Self::owner_filter(&actor))
            .await?;
        if rows == 0 {
            return Err(ActivityError::NotFound(id));
        }

        self.refresh_cache(actor.id).await?;
        Ok(())
    }

    async fn delete_activity(&self, id: i32) -> Result<(), ActivityError> {
        let actor = self.actor()?;

        self.store
            .delete_activity(id, Self::owner_filter(&actor))
            .await?;

        self.refresh_cache(actor.id).await?;
        Ok(())
    }

    async fn delete_all_activities(&self) -> Result<u64, ActivityError> {
        let actor = self.actor()?;

        let removed = self.store.delete_all_activities_for_user(actor.id).await?;

        self.refresh_cache(actor.id).await?;
        Ok(removed)
    }

    async fn delete_all_unprotected(&self) -> Result<u64, ActivityError> {
        let actor = self.actor()?;

        let removed = self
            .store
            .delete_unprotected_activities_for_user(actor.id)
            .await?;

        self.refresh_cache(actor.id).await?;
        Ok(removed)
    }

    async fn protect_activity(&self, id: i32) -> Result<(), ActivityError> {
        let actor = self.actor()?;

        let rows = self
            .store
            .set_activity_protected(id, true, Self::owner_filter(&actor))
            .await?;
        if rows == 0 {
            return Err(ActivityError::NotFound(id));
        }

        self.refresh_cache(actor.id).await?;
        Ok(())
    }

    async fn unprotect_activity(&self, id: i32) -> Result<(), ActivityError> {
        let actor = self.actor()?;

        let rows = self
            .store
            .set_activity_protected(id, false, Self::owner_filter(&actor))
            .await?;
        if rows == 0 {
            return Err(ActivityError::NotFound(id));
        }

        self.refresh_cache(actor.id).await?;
        Ok(())
    }

    async fn list_activities(&self) -> Result<Vec<Activity>, ActivityError> {
        let actor = self.actor()?;
        self.refresh_cache(actor.id).await
    }

    async fn get_activities_by_user_id(
        &self,
        user_id: i32,
    ) -> Result<Vec<Activity>, ActivityError> {
        self.actor()?;
        Ok(self.store.list_activities_for_user(user_id).await?)
    }

    fn activities(&self) -> Vec<Activity> {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
