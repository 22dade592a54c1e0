//! Backend for a SOC analyst training range.
//!
//! Serves the alert queues, investigation lifecycle, case questionnaires,
//! raw log search and threat-intelligence lookups that a training cohort
//! works through, backed by SeaORM and exposed over an axum HTTP API.

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::config::AppConfig;
use crate::intel::IntelClient;
use crate::lifecycle::InvestigationLifecycle;

pub mod api;
pub mod auth;
pub mod config;
pub mod entity;
pub mod error;
pub mod intel;
pub mod lifecycle;
pub mod logs;
pub mod queues;

#[derive(Clone, Debug)]
pub struct AppResources {
    pub db: Arc<DatabaseConnection>,
    pub config: Arc<AppConfig>,
    pub lifecycle: Arc<InvestigationLifecycle>,
    pub intel: Arc<IntelClient>,
}
