use rustls::crypto;
use rustls::crypto::CryptoProvider;
use sea_orm::Database;
use soc_range::AppResources;
use soc_range::api::start_webserver;
use soc_range::config::load_config_or_panic;
use soc_range::intel::IntelClient;
use soc_range::lifecycle::InvestigationLifecycle;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

fn initialize_standard_tracing() {
    let default_directives = "soc_range=info,hyper=warn,sea_orm=info";
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives));

    let registry = tracing_subscriber::registry().with(env_filter);
    let layer = fmt::layer().with_target(true).with_level(true);

    registry.with(layer).init();
}

#[tokio::main]
async fn main() -> color_eyre::eyre::Result<()> {
    color_eyre::install().expect("Failed to install `color_eyre::install`");

    initialize_standard_tracing();

    // Load .env before the config layer reads the environment.
    dotenvy::dotenv().ok();
    let config = Arc::new(load_config_or_panic());

    let ring_provider = crypto::ring::default_provider();
    CryptoProvider::install_default(ring_provider).expect("Failed to install crypto provider");

    // Set up SeaORM database connection
    let db = Arc::new(
        Database::connect(&config.database_url)
            .await
            .expect("Failed to connect to database"),
    );

    // Resolving the Open case status up front doubles as a schema sanity check.
    let lifecycle = Arc::new(
        InvestigationLifecycle::init(db.clone())
            .await
            .expect("Failed to initialize the investigation lifecycle"),
    );
    let intel = Arc::new(IntelClient::new(&config.intel));

    let resources = AppResources {
        db,
        config,
        lifecycle,
        intel,
    };

    start_webserver(resources).await?;
    Ok(())
}
