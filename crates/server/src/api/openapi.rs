//! OpenAPI/Utoipa configuration.

use crate::api::{
    accounts::ACCOUNTS_TAG, alerts::ALERTS_TAG, cases::CASES_TAG, health::MISC_TAG,
    intel::INTEL_TAG, investigations::INVESTIGATIONS_TAG, logs::LOGS_TAG,
};
use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

/// Security addon for OpenAPI documentation.
pub struct SecurityAddon;

impl Modify for SecurityAddon {
    #[tracing::instrument(skip(self, openapi))]
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            let bearer = HttpBuilder::new()
                .scheme(HttpAuthScheme::Bearer)
                .bearer_format("JWT")
                .description(Some(
                    "Use the session token obtained from the `/login` endpoint to authenticate.",
                ))
                .build();
            components.add_security_scheme("Authorization", SecurityScheme::Http(bearer));
        }
    }
}

/// OpenAPI documentation configuration.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "SOC Range API",
        version = "1.0.0",
        description = "Backend API for the SOC analyst training range."
    ),
    tags(
        (name = MISC_TAG, description = "Miscellaneous endpoints"),
        (name = ACCOUNTS_TAG, description = "Registration, login and account management"),
        (name = ALERTS_TAG, description = "Alert queues and drill-down"),
        (name = INVESTIGATIONS_TAG, description = "Alert investigation lifecycle"),
        (name = CASES_TAG, description = "Case queue and questionnaire answers"),
        (name = LOGS_TAG, description = "Raw log search"),
        (name = INTEL_TAG, description = "Threat-intelligence lookups")
    )
)]
pub struct ApiDoc;
