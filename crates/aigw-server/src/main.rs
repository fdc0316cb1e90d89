//! aigw admin server: application entry point.

use aigw_db::{DbConfig, DbManager};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("aigw=info".parse()?))
        .json()
        .init();

    tracing::info!("Starting aigw admin server...");

    let db = DbManager::connect(&DbConfig::from_env()).await?;
    db.migrate().await?;

    tokio::signal::ctrl_c().await?;

    tracing::info!("aigw admin server stopped.");
    Ok(())
}
