use crate::LibraryArgs;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use tracing::{error, info};
use trailer_sync_config::{Config, CredentialStore, PathManager};
use trailer_sync_core::{CacheStore, IdResolver, RefreshOrchestrator, RefreshSettings};
use trailer_sync_sources::SourceSet;

/// Load the config file (or defaults), apply env overrides, then CLI flags.
pub fn load_config(paths: &PathManager, library: &LibraryArgs) -> Result<Config> {
    let config_file = paths.config_file();
    let mut config = Config::load_or_default(&config_file)
        .map_err(|e| eyre!("Failed to load config from {}: {}", config_file.display(), e))?;

    if let Some(dir) = &library.dir {
        config.library.scan_path = dir.clone();
    }
    if let Some(workers) = library.workers {
        config.refresh.workers = workers;
    }

    config
        .validate()
        .map_err(|e| eyre!("Invalid configuration: {}", e))?;
    Ok(config)
}

pub fn load_credentials(paths: &PathManager) -> Result<CredentialStore> {
    let credentials_file = paths.credentials_file();
    let mut credentials = CredentialStore::new(credentials_file.clone());
    credentials
        .load()
        .map_err(|e| eyre!("Failed to load credentials from {}: {}", credentials_file.display(), e))?;
    Ok(credentials)
}

pub fn build_orchestrator(config: &Config, paths: &PathManager) -> Result<RefreshOrchestrator> {
    paths
        .ensure_directories()
        .map_err(|e| eyre!("Failed to create data directories: {}", e))?;

    let credentials = load_credentials(paths)?;
    let sources = SourceSet::from_config(config, &credentials);

    Ok(RefreshOrchestrator::new(
        IdResolver::new(sources.lookups),
        sources.trailer,
        CacheStore::new(paths),
        RefreshSettings::from_config(config),
    ))
}

/// Resolves on Ctrl-C. If the handler cannot be installed it never resolves,
/// so long-running modes keep going.
pub async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!(operation = "shutdown_signal", "Received Ctrl-C"),
        Err(e) => {
            error!(operation = "shutdown_signal", error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await
        }
    }
}
