use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "activities")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub steps: i64,

    /// The activity's logical date, unix epoch seconds (not creation time)
    pub date: i64,

    pub user_id: i32,

    /// Protected rows are exempt from "delete all unprotected"
    #[sea_orm(default_value = false)]
    pub is_protected: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
