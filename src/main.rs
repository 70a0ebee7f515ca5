use anyhow::Context;
use mc_manager::config::{self, ManagerConfig};
use mc_manager::data::{BackupManager, ModCatalog, PropertiesStore, RosterStore};
use mc_manager::logs::LogStore;
use mc_manager::server::Supervisor;
use mc_manager::web::{self, AppState};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "manager.json".to_string());
    let config = ManagerConfig::from_file(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path))?;
    config::validate_config(&config).context("Invalid configuration")?;

    let logs = Arc::new(LogStore::with_mirror(
        config.log_capacity,
        &config.server_dir,
    ));
    let properties = Arc::new(
        PropertiesStore::load(&config.server_dir).context("Failed to load server.properties")?,
    );
    let roster = Arc::new(RosterStore::load(&config.server_dir));
    let backups = Arc::new(BackupManager::new(&config.server_dir));
    let mods = Arc::new(ModCatalog::new(&config.server_dir));

    let http = config.http.clone();
    let supervisor = Arc::new(Supervisor::new(config, logs));

    let state = AppState {
        supervisor,
        properties,
        roster,
        backups,
        mods,
    };

    let server = web::build_server(&http, state).context("Failed to start management API")?;
    server.await.context("Management API server error")?;

    tracing::info!("Manager shut down");
    Ok(())
}
