use super::setup::{build_orchestrator, load_config, shutdown_signal};
use crate::output::Output;
use crate::LibraryArgs;
use color_eyre::Result;
use tracing::info;
use trailer_sync_config::PathManager;
use trailer_sync_core::PeriodicScheduler;

pub async fn run_schedule(
    library: LibraryArgs,
    days_override: Option<u32>,
    no_startup_run: bool,
    output: &Output,
) -> Result<()> {
    let paths = PathManager::default();
    let config = load_config(&paths, &library)?;
    let scheduler_config = config.scheduler_or_default();

    let days = days_override.unwrap_or(scheduler_config.interval_days);
    if days == 0 {
        return Err(color_eyre::eyre::eyre!("--days must be at least 1"));
    }
    let run_on_startup = scheduler_config.run_on_startup && !no_startup_run;

    let orchestrator = build_orchestrator(&config, &paths)?;
    let root = config.library.scan_path.clone();

    output.info(format!(
        "Scheduler started. Running every {} day(s) over {}",
        days,
        root.display()
    ));
    info!(
        operation = "schedule_command",
        days,
        run_on_startup,
        "Starting periodic scheduler"
    );

    let mut scheduler = PeriodicScheduler::with_interval_days(orchestrator, root, days, run_on_startup);
    scheduler.run(shutdown_signal()).await;

    output.success("Scheduler stopped");
    Ok(())
}
