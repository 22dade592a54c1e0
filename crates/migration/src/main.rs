use config::Config;
use sea_orm_migration::prelude::*;
use std::env;

#[tokio::main]
async fn main() {
    // DATABASE_URL from the environment wins; fall back to config.yaml so the
    // CLI works from a checkout without extra setup. A missing or unreadable
    // config file is not fatal here, the CLI reports the absent URL itself.
    if env::var("DATABASE_URL").is_err() {
        let settings = Config::builder()
            .add_source(config::File::with_name("config.yaml"))
            .build();
        if let Ok(url) = settings.and_then(|s| s.get_string("database_url")) {
            env::set_var("DATABASE_URL", url);
        }
    }
    cli::run_cli(migration::Migrator).await;
}
