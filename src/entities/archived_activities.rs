use sea_orm::entity::prelude::*;

/// Archived rows carry their own id sequence; an archived activity is a new
/// logical entity, not a foreign key back to the original activity row.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "archived_activities")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub steps: i64,

    /// Original activity date, unix epoch seconds
    pub date: i64,

    /// Unix epoch seconds of archival
    pub archived_at: i64,

    pub user_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
