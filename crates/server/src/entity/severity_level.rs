use sea_orm::entity::prelude::*;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, ToSchema)]
#[sea_orm(table_name = "severity_levels")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub severity_id: i32,
    pub severity_name: String, // "Critical", "High", "Medium", "Low"
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
