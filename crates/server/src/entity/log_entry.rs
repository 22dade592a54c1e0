use sea_orm::entity::prelude::*;
use serde::Serialize;
use time::OffsetDateTime;
use utoipa::ToSchema;

/// Raw log store the analysts pivot into from an alert.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, ToSchema)]
#[sea_orm(table_name = "log_management")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub log_id: i32,
    pub event_id: i64,
    pub log_source: Option<String>,
    pub source_ip: Option<String>,
    pub destination_ip: Option<String>,
    pub source_port: Option<i32>,
    pub destination_port: Option<i32>,
    pub log_time: OffsetDateTime,
    pub raw_log: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
