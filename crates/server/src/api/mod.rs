//! API module providing the HTTP endpoints of the SOC range.
//!
//! This module is organized into submodules:
//! - `accounts` - Registration, login and account management (/register, /login, /api/*)
//! - `alerts` - Alert queues and drill-down (/api/alerts, /api/investigation-alerts)
//! - `investigations` - Investigation lifecycle (/api/alerts/{id}/*, /api/reset-alerts)
//! - `cases` - Case queue and questionnaire answers (/api/cases/*)
//! - `logs` - Raw log search (/api/logs/*)
//! - `intel` - Threat-intelligence lookups (/api/intel/scan)
//! - `auth` - Bearer token extractor shared by the protected endpoints
//! - `health` - Health check endpoint (/healthz)
//! - `openapi` - OpenAPI/Utoipa configuration

pub mod accounts;
pub mod alerts;
pub mod auth;
pub mod cases;
pub mod health;
pub mod intel;
pub mod investigations;
pub mod logs;
pub mod openapi;

// Re-export commonly used items
pub use accounts::ACCOUNTS_TAG;
pub use alerts::ALERTS_TAG;
pub use cases::CASES_TAG;
pub use health::MISC_TAG;
pub use intel::INTEL_TAG;
pub use investigations::INVESTIGATIONS_TAG;
pub use logs::LOGS_TAG;

use crate::AppResources;
use serde::Serialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::{OpenApi, ToSchema};
use utoipa_axum::{router::OpenApiRouter, routes};
use utoipa_redoc::{Redoc, Servable};

/// Plain acknowledgement body shared by endpoints that only confirm an action.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Builds the application router with every route and middleware layer attached.
///
/// Split out from [`start_webserver`] so integration tests can drive the full
/// router in-process without binding a socket.
#[tracing::instrument(skip(app_resources))]
pub fn build_router(app_resources: AppResources) -> axum::Router {
    let (router, api) = OpenApiRouter::with_openapi(openapi::ApiDoc::openapi())
        .routes(routes!(accounts::register))
        .routes(routes!(accounts::login))
        .routes(routes!(accounts::check_username))
        .routes(routes!(accounts::forgot_password))
        .routes(routes!(accounts::change_password))
        .routes(routes!(accounts::update_email))
        .routes(routes!(accounts::delete_account))
        .routes(routes!(alerts::main_queue))
        .routes(routes!(alerts::my_queue))
        .routes(routes!(alerts::alert_detail))
        .routes(routes!(investigations::start_investigation))
        .routes(routes!(investigations::unassign))
        .routes(routes!(investigations::create_case))
        .routes(routes!(investigations::close_alert))
        .routes(routes!(investigations::reopen_case))
        .routes(routes!(investigations::reset_alerts))
        .routes(routes!(cases::list_cases))
        .routes(routes!(cases::save_answers))
        .routes(routes!(logs::search_logs))
        .routes(routes!(logs::log_detail))
        .routes(routes!(intel::scan))
        .routes(routes!(health::health))
        // Attach application resources, CORS and the standard TraceLayer.
        .layer(axum::Extension(app_resources))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .split_for_parts();

    router.merge(Redoc::with_url("/api-docs", api))
}

/// Starts the web server with all configured routes.
#[tracing::instrument(skip(app_resources))]
pub async fn start_webserver(app_resources: AppResources) -> color_eyre::Result<()> {
    let router = build_router(app_resources);

    let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
    tracing::info!(addr = "0.0.0.0:8080", "server listening");
    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .await
    .map_err(|e| color_eyre::Report::msg(format!("Failed to start server: {e}")))?;

    Ok(())
}
