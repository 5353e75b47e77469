use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};

use crate::entities::password_reset_requests;

/// Lifecycle of a reset request: pending -> approved -> completed, or
/// cancelled at any point before completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetStatus {
    Pending,
    Approved,
    Completed,
    Cancelled,
}

impl ResetStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Unrecognized values read back from storage are treated as cancelled so
    /// they can never re-enter the active workflow.
    #[must_use]
    pub fn from_db(value: &str) -> Self {
        match value {
            "pending" => Self::Pending,
            "approved" => Self::Approved,
            "completed" => Self::Completed,
            _ => Self::Cancelled,
        }
    }
}

impl std::fmt::Display for ResetStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetRequest {
    pub id: i32,
    pub user_id: i32,
    pub username: String,
    pub email: String,
    pub requested_at: i64,
    pub status: ResetStatus,
    pub approved_by: Option<i32>,
    pub approved_at: Option<i64>,
    pub completed_at: Option<i64>,
}

impl From<password_reset_requests::Model> for ResetRequest {
    fn from(model: password_reset_requests::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            username: model.username,
            email: model.email,
            requested_at: model.requested_at,
            status: ResetStatus::from_db(&model.status),
            approved_by: model.approved_by,
            approved_at: model.approved_at,
            completed_at: model.completed_at,
        }
    }
}

pub struct ResetRequestRepository {
    conn: DatabaseConnection,
}

impl ResetRequestRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn pending_exists(&self, user_id: i32) -> Result<bool, DbErr> {
        let count = password_reset_requests::Entity::find()
            .filter(password_reset_requests::Column::UserId.eq(user_id))
            .filter(password_reset_requests::Column::Status.eq(ResetStatus::Pending.as_str()))
            .count(&self.conn)
            .await?;
        Ok(count > 0)
    }

    pub async fn insert_pending(
        &self,
        user_id: i32,
        username: String,
        email: String,
        requested_at: i64,
    ) -> Result<ResetRequest, DbErr> {
        let active = password_reset_requests::ActiveModel {
            user_id: Set(user_id),
            username: Set(username),
            email: Set(email),
            requested_at: Set(requested_at),
            status: Set(ResetStatus::Pending.as_str().to_string()),
            approved_by: Set(None),
            approved_at: Set(None),
            completed_at: Set(None),
            ..Default::default()
        };

        let model = active.insert(&self.conn).await?;
        Ok(model.into())
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<ResetRequest>, DbErr> {
        let request = password_reset_requests::Entity::find_by_id(id)
            .one(&self.conn)
            .await?;
        Ok(request.map(ResetRequest::from))
    }

    /// All pending requests, newest first.
    pub async fn list_pending(&self) -> Result<Vec<ResetRequest>, DbErr> {
        let rows = password_reset_requests::Entity::find()
            .filter(password_reset_requests::Column::Status.eq(ResetStatus::Pending.as_str()))
            .order_by_desc(password_reset_requests::Column::RequestedAt)
            .all(&self.conn)
            .await?;
        Ok(rows.into_iter().map(ResetRequest::from).collect())
    }

    /// The approved request matching this username+email pair, if any.
    pub async fn find_approved(
        &self,
        username: &str,
        email: &str,
    ) -> Result<Option<ResetRequest>, DbErr> {
        let request = password_reset_requests::Entity::find()
            .filter(password_reset_requests::Column::Username.eq(username))
            .filter(password_reset_requests::Column::Email.eq(email))
            .filter(password_reset_requests::Column::Status.eq(ResetStatus::Approved.as_str()))
            .one(&self.conn)
            .await?;
        Ok(request.map(ResetRequest::from))
    }

    pub async fn mark_approved(
        &self,
        id: i32,
        approved_by: i32,
        approved_at: i64,
    ) -> Result<u64, DbErr> {
        let Some(model) = password_reset_requests::Entity::find_by_id(id)
            .one(&self.conn)
            .await?
        else {
            return Ok(0);
        };

        let mut active: password_reset_requests::ActiveModel = model.into();
        active.status = Set(ResetStatus::Approved.as_str().to_string());
        active.approved_by = Set(Some(approved_by));
        active.approved_at = Set(Some(approved_at));
        active.update(&self.conn).await?;

        Ok(1)
    }

    pub async fn mark_completed(&self, id: i32, completed_at: i64) -> Result<u64, DbErr> {
        let Some(model) = password_reset_requests::Entity::find_by_id(id)
            .one(&self.conn)
            .await?
        else {
            return Ok(0);
        };

        let mut active: password_reset_requests::ActiveModel = model.into();
        active.status = Set(ResetStatus::Completed.as_str().to_string());
        active.completed_at = Set(Some(completed_at));
        active.update(&self.conn).await?;

        Ok(1)
    }

    /// Removes every request owned by a user; called when the account is
    /// deleted.
    pub async fn delete_for_user(&self, user_id: i32) -> Result<u64, DbErr> {
        let result = password_reset_requests::Entity::delete_many()
            .filter(password_reset_requests::Column::UserId.eq(user_id))
            .exec(&self.conn)
            .await?;
        Ok(result.rows_affected)
    }
}
