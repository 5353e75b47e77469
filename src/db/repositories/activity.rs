use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set,
};

use crate::entities::activities;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Activity {
    pub id: i32,
    pub steps: i64,
    /// Logical activity date, unix epoch seconds
    pub date: i64,
    pub user_id: i32,
    pub is_protected: bool,
}

impl From<activities::Model> for Activity {
    fn from(model: activities::Model) -> Self {
        Self {
            id: model.id,
            steps: model.steps,
            date: model.date,
            user_id: model.user_id,
            is_protected: model.is_protected,
        }
    }
}

/// Row-level access to the step log. Single-row mutations take an optional
/// `owner` constraint: `Some(user_id)` restricts the statement to rows owned
/// by that user, `None` (admin callers) matches on id alone. The returned
/// row count tells the caller whether anything was actually touched.
pub struct ActivityRepository {
    conn: DatabaseConnection,
}

impl ActivityRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn insert(&self, user_id: i32, steps: i64, date: i64) -> Result<Activity, DbErr> {
        let active = activities::ActiveModel {
            steps: Set(steps),
            date: Set(date),
            user_id: Set(user_id),
            is_protected: Set(false),
            ..Default::default()
        };

        let model = active.insert(&self.conn).await?;
        Ok(model.into())
    }

    /// One user's rows, most recent activity date first.
    pub async fn list_for_user(&self, user_id: i32) -> Result<Vec<Activity>, DbErr> {
        let rows = activities::Entity::find()
            .filter(activities::Column::UserId.eq(user_id))
            .order_by_desc(activities::Column::Date)
            .order_by_desc(activities::Column::Id)
            .all(&self.conn)
            .await?;
        Ok(rows.into_iter().map(Activity::from).collect())
    }

    pub async fn update_steps(
        &self,
        id: i32,
        steps: i64,
        owner: Option<i32>,
    ) -> Result<u64, DbErr> {
        let mut update = activities::Entity::update_many()
            .col_expr(activities::Column::Steps, Expr::value(steps))
            .filter(activities::Column::Id.eq(id));
        if let Some(user_id) = owner {
            update = update.filter(activities::Column::UserId.eq(user_id));
        }

        let result = update.exec(&self.conn).await?;
        Ok(result.rows_affected)
    }

    pub async fn set_protected(
        &self,
        id: i32,
        protected: bool,
        owner: Option<i32>,
    ) -> Result<u64, DbErr> {
        let mut update = activities::Entity::update_many()
            .col_expr(activities::Column::IsProtected, Expr::value(protected))
            .filter(activities::Column::Id.eq(id));
        if let Some(user_id) = owner {
            update = update.filter(activities::Column::UserId.eq(user_id));
        }

        let result = update.exec(&self.conn).await?;
        Ok(result.rows_affected)
    }

    pub async fn delete(&self, id: i32, owner: Option<i32>) -> Result<u64, DbErr> {
        let mut delete =
            activities::Entity::delete_many().filter(activities::Column::Id.eq(id));
        if let Some(user_id) = owner {
            delete = delete.filter(activities::Column::UserId.eq(user_id));
        }

        let result = delete.exec(&self.conn).await?;
        Ok(result.rows_affected)
    }

    pub async fn delete_all_for_user(&self, user_id: i32) -> Result<u64, DbErr> {
        let result = activities::Entity::delete_many()
            .filter(activities::Column::UserId.eq(user_id))
            .exec(&self.conn)
            .await?;
        Ok(result.rows_affected)
    }

    /// Bulk delete that leaves protected rows in place.
    pub async fn delete_unprotected_for_user(&self, user_id: i32) -> Result<u64, DbErr> {
        let result = activities::Entity::delete_many()
            .filter(activities::Column::UserId.eq(user_id))
            .filter(activities::Column::IsProtected.eq(false))
            .exec(&self.conn)
            .await?;
        Ok(result.rows_affected)
    }
}
