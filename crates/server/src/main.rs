use alert_state_history::AppResources;
use alert_state_history::api::start_webserver;
use alert_state_history::config::load_config;
use migration::{Migrator, MigratorTrait};
use sea_orm::Database;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

fn initialize_tracing() {
    let default_directives = "alert_state_history=info,tower_http=info,sea_orm=info";
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives));

    let layer = fmt::layer().with_target(true).with_level(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(layer)
        .init();
}

#[tokio::main]
async fn main() -> color_eyre::eyre::Result<()> {
    color_eyre::install()?;

    // A missing .env file is fine; real deployments set the environment directly.
    let _ = dotenvy::dotenv();

    initialize_tracing();

    let config = load_config()?;
    let addr = config.socket_addr()?;

    let db = Arc::new(Database::connect(&config.database_url).await?);

    if config.run_migrations {
        Migrator::up(db.as_ref(), None).await?;
        tracing::info!("Database migrations applied");
    }

    let resources = AppResources::new(db);
    start_webserver(resources, addr).await
}
