//! FleetGate server — application entry point.

use fleetgate_db::{DbConfig, DbManager};
use tracing_subscriber::EnvFilter;

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.into())
}

fn config_from_env() -> DbConfig {
    let defaults = DbConfig::default();
    DbConfig {
        url: env_or("FLEETGATE_DB_URL", &defaults.url),
        namespace: env_or("FLEETGATE_DB_NAMESPACE", &defaults.namespace),
        database: env_or("FLEETGATE_DB_NAME", &defaults.database),
        username: env_or("FLEETGATE_DB_USER", &defaults.username),
        password: env_or("FLEETGATE_DB_PASSWORD", &defaults.password),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("fleetgate=info".parse()?),
        )
        .json()
        .init();

    tracing::info!("Starting FleetGate server...");

    let config = config_from_env();
    let manager = DbManager::connect(&config).await?;
    fleetgate_db::run_migrations(manager.client()).await?;

    // TODO: Start REST API server

    tracing::info!("FleetGate server stopped.");
    Ok(())
}
