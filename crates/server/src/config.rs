use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration build error: {0}")]
    Build(#[from] config::ConfigError),
    #[error("Invalid configuration: {0}")]
    Validation(String),
}

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    /// HMAC secret used to sign session tokens.
    pub jwt_secret: String,
    /// Session token lifetime in minutes.
    #[serde(default = "default_token_ttl_minutes")]
    pub token_ttl_minutes: i64,
    #[serde(default)]
    pub intel: IntelConfig,
}

/// Upstream threat-intelligence API. Defaults target VirusTotal v3.
#[derive(Clone, Debug, Deserialize)]
pub struct IntelConfig {
    /// Sent as the `x-apikey` header. Lookups fail upstream without one.
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_intel_api_base")]
    pub api_base: String,
}

impl Default for IntelConfig {
    fn default() -> Self {
        IntelConfig {
            api_key: String::new(),
            api_base: default_intel_api_base(),
        }
    }
}

fn default_token_ttl_minutes() -> i64 {
    60
}

fn default_intel_api_base() -> String {
    "https://www.virustotal.com/api/v3".into()
}

fn validate(app: &AppConfig) -> Result<(), ConfigError> {
    if app.jwt_secret.len() < 32 {
        return Err(ConfigError::Validation(
            "jwt_secret must be at least 32 characters".into(),
        ));
    }
    if app.token_ttl_minutes <= 0 {
        return Err(ConfigError::Validation(
            "token_ttl_minutes must be > 0".into(),
        ));
    }
    Ok(())
}

/// Load application configuration from `config.yaml` + environment overrides.
///
/// Environment variable override convention (current): any var matching the key path
/// separated by double underscores (e.g. `INTEL__API_KEY`) *without* a prefix will
/// override the file value. A future iteration may introduce a prefix (e.g. `APP__`).
///
/// Returns a `ConfigError` instead of panicking so the caller can decide how to fail.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    use config::{Config, Environment, File};
    let cfg = Config::builder()
        .add_source(File::with_name("config.yaml"))
        .add_source(Environment::default().separator("__"))
        .build()?;

    let app: AppConfig = cfg.try_deserialize()?;
    validate(&app)?;
    Ok(app)
}

/// Convenience helper for binaries wanting the old panic-on-error behaviour.
pub fn load_config_or_panic() -> AppConfig {
    match load_config() {
        Ok(c) => c,
        Err(e) => panic!("Failed to load configuration: {e}"),
    }
}
