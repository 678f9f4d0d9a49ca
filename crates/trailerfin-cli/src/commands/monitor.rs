use super::setup::{build_orchestrator, load_config, shutdown_signal};
use crate::output::Output;
use crate::LibraryArgs;
use color_eyre::Result;
use trailer_sync_config::{Config, PathManager};
use trailer_sync_core::{ContinuousMonitor, MonitorSettings, RefreshOrchestrator};

pub async fn run_monitor(library: LibraryArgs, output: &Output) -> Result<()> {
    let paths = PathManager::default();
    let config = load_config(&paths, &library)?;
    let orchestrator = build_orchestrator(&config, &paths)?;
    monitor_with(orchestrator, &config, output).await
}

/// Run the monitor loop with an already built orchestrator until Ctrl-C.
pub async fn monitor_with(orchestrator: RefreshOrchestrator, config: &Config, output: &Output) -> Result<()> {
    let root = config.library.scan_path.clone();
    let settings = MonitorSettings::from_config(&config.monitor);

    output.info(format!(
        "Monitoring {} (checking every {}s, refreshing links within {}s of expiry)",
        root.display(),
        settings.poll_interval.as_secs(),
        settings.expiry_threshold.as_secs()
    ));

    let mut monitor = ContinuousMonitor::new(orchestrator, root, settings);
    monitor.run(shutdown_signal()).await;

    output.success("Monitor stopped");
    Ok(())
}
