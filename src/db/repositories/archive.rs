use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set,
};

use crate::entities::archived_activities;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchivedActivity {
    pub id: i32,
    pub steps: i64,
    /// Original activity date, unix epoch seconds
    pub date: i64,
    /// Unix epoch seconds of archival
    pub archived_at: i64,
    pub user_id: i32,
}

impl From<archived_activities::Model> for ArchivedActivity {
    fn from(model: archived_activities::Model) -> Self {
        Self {
            id: model.id,
            steps: model.steps,
            date: model.date,
            archived_at: model.archived_at,
            user_id: model.user_id,
        }
    }
}

/// Row-level access to the archive. The owner constraint works the same way
/// as in the activity repository.
pub struct ArchiveRepository {
    conn: DatabaseConnection,
}

impl ArchiveRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn insert(
        &self,
        user_id: i32,
        steps: i64,
        date: i64,
        archived_at: i64,
    ) -> Result<ArchivedActivity, DbErr> {
        let active = archived_activities::ActiveModel {
            steps: Set(steps),
            date: Set(date),
            archived_at: Set(archived_at),
            user_id: Set(user_id),
            ..Default::default()
        };

        let model = active.insert(&self.conn).await?;
        Ok(model.into())
    }

    /// One user's archived rows, most recently archived first.
    pub async fn list_for_user(&self, user_id: i32) -> Result<Vec<ArchivedActivity>, DbErr> {
        let rows = archived_activities::Entity::find()
            .filter(archived_activities::Column::UserId.eq(user_id))
            .order_by_desc(archived_activities::Column::ArchivedAt)
            .order_by_desc(archived_activities::Column::Id)
            .all(&self.conn)
            .await?;
        Ok(rows.into_iter().map(ArchivedActivity::from).collect())
    }

    pub async fn delete(&self, id: i32, owner: Option<i32>) -> Result<u64, DbErr> {
        let mut delete = archived_activities::Entity::delete_many()
            .filter(archived_activities::Column::Id.eq(id));
        if let Some(user_id) = owner {
            delete = delete.filter(archived_activities::Column::UserId.eq(user_id));
        }

        let result = delete.exec(&self.conn).await?;
        Ok(result.rows_affected)
    }

    pub async fn delete_all_for_user(&self, user_id: i32) -> Result<u64, DbErr> {
        let result = archived_activities::Entity::delete_many()
            .filter(archived_activities::Column::UserId.eq(user_id))
            .exec(&self.conn)
            .await?;
        Ok(result.rows_affected)
    }
}
