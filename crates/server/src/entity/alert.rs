use sea_orm::entity::prelude::*;
use serde::Serialize;
use time::OffsetDateTime;
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, ToSchema)]
#[sea_orm(table_name = "alerts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub alert_id: i32,
    pub event_id: i64,
    pub event_time: OffsetDateTime,
    pub rule_name: String,
    pub severity_id: i32,
    pub alert_type_id: Option<i32>,
    pub source_ip: Option<String>,
    pub destination_ip: Option<String>,
    pub protocol: Option<String>,
    pub raw_message: Option<String>,
    pub status: String, // "Open", "Under Investigation", "Closed"
    pub is_closed: bool,
    pub closed_at: Option<OffsetDateTime>,
    pub closed_by: Option<i32>,
    pub closure_reason: Option<String>,
    pub closure_result: Option<String>,
    pub user_assessment_correct: Option<bool>,
    pub expected_result: Option<String>,
    pub malicious_entity: Option<String>,
    pub feedback: Option<String>,
    pub answers_provided: bool,
    pub answers_correct: bool,
    pub answers_summary: Option<Json>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::severity_level::Entity",
        from = "Column::SeverityId",
        to = "super::severity_level::Column::SeverityId"
    )]
    Severity,
    #[sea_orm(
        belongs_to = "super::alert_type::Entity",
        from = "Column::AlertTypeId",
        to = "super::alert_type::Column::TypeId"
    )]
    AlertType,
    #[sea_orm(has_many = "super::alert_investigation::Entity")]
    Investigations,
    #[sea_orm(has_many = "super::alert_detail::Entity")]
    Details,
}

impl ActiveModelBehavior for ActiveModel {}
