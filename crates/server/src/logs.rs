//! Paginated search over the raw log store.

use crate::entity::log_entry;
use crate::error::ApiError;
use sea_orm::sea_query::{Alias, Expr, Func, SimpleExpr};
use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Columns the search endpoint may filter on. Anything else is ignored, so a
/// crafted `field` value can never reach the query as an identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogField {
    SourceIp,
    DestinationIp,
    LogSource,
    EventId,
    RawLog,
}

impl LogField {
    pub fn parse(raw: &str) -> Option<LogField> {
        match raw {
            "source_ip" => Some(LogField::SourceIp),
            "destination_ip" => Some(LogField::DestinationIp),
            "log_source" => Some(LogField::LogSource),
            "event_id" => Some(LogField::EventId),
            "raw_log" => Some(LogField::RawLog),
            _ => None,
        }
    }

    /// Column expression the operator applies to. `event_id` is numeric and
    /// goes through a text cast so it matches like the string columns.
    fn expr(self) -> SimpleExpr {
        match self {
            LogField::SourceIp => {
                Expr::col((log_entry::Entity, log_entry::Column::SourceIp)).into()
            }
            LogField::DestinationIp => {
                Expr::col((log_entry::Entity, log_entry::Column::DestinationIp)).into()
            }
            LogField::LogSource => {
                Expr::col((log_entry::Entity, log_entry::Column::LogSource)).into()
            }
            LogField::EventId => Expr::col((log_entry::Entity, log_entry::Column::EventId))
                .cast_as(Alias::new("text")),
            LogField::RawLog => Expr::col((log_entry::Entity, log_entry::Column::RawLog)).into(),
        }
    }
}

/// Match operators. `equals` compares exactly and case-sensitively; the
/// pattern operators are case-insensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogOp {
    Equals,
    #[default]
    Contains,
    StartsWith,
    EndsWith,
}

impl LogOp {
    /// Unrecognised operators fall back to `contains`.
    pub fn parse(raw: &str) -> LogOp {
        match raw {
            "equals" => LogOp::Equals,
            "startswith" => LogOp::StartsWith,
            "endswith" => LogOp::EndsWith,
            _ => LogOp::Contains,
        }
    }
}

fn condition(field: LogField, op: LogOp, value: &str) -> SimpleExpr {
    let lowered = value.to_lowercase();
    let pattern = match op {
        LogOp::Equals => return Expr::expr(field.expr()).eq(value),
        LogOp::Contains => format!("%{lowered}%"),
        LogOp::StartsWith => format!("{lowered}%"),
        LogOp::EndsWith => format!("%{lowered}"),
    };
    Expr::expr(Func::lower(field.expr())).like(pattern)
}

/// Query parameters accepted by the log search endpoint.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct LogQuery {
    /// Column to filter on; unknown names disable filtering.
    pub field: Option<String>,
    /// One of `equals`, `contains`, `startswith`, `endswith`.
    pub op: Option<String>,
    pub value: Option<String>,
    /// 1-based page number.
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

/// One page of log rows plus the unpaginated total.
#[derive(Debug, Serialize, ToSchema)]
pub struct LogPage {
    pub rows: Vec<log_entry::Model>,
    pub total: u64,
}

/// Search the log store, newest first. A filter only applies when both a
/// known field and a non-empty value are supplied.
pub async fn search_logs(db: &DatabaseConnection, query: &LogQuery) -> Result<LogPage, ApiError> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(10).max(1);

    let mut select = log_entry::Entity::find().order_by_desc(log_entry::Column::LogTime);

    let value = query.value.as_deref().unwrap_or("");
    if !value.is_empty() {
        if let Some(field) = query.field.as_deref().and_then(LogField::parse) {
            let op = query.op.as_deref().map(LogOp::parse).unwrap_or_default();
            select = select.filter(condition(field, op, value));
        }
    }

    let paginator = select.paginate(db, limit);
    let total = paginator.num_items().await?;
    let rows = paginator.fetch_page(page - 1).await?;
    Ok(LogPage { rows, total })
}

/// Fetch one raw log row by id.
pub async fn find_log(db: &DatabaseConnection, log_id: i32) -> Result<log_entry::Model, ApiError> {
    log_entry::Entity::find_by_id(log_id)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Log not found".into()))
}
