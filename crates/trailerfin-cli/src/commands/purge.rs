use super::monitor::monitor_with;
use super::prompts::prompt_yes_no;
use super::scan_ui::is_interactive;
use super::setup::{build_orchestrator, load_config};
use crate::output::Output;
use crate::LibraryArgs;
use color_eyre::Result;
use serde_json::json;
use trailer_sync_config::PathManager;

/// Delete every recorded pointer file and empty the expiration map, then
/// hand over to the monitor, which regenerates pointers as it goes.
pub async fn run_purge(library: LibraryArgs, yes: bool, output: &Output) -> Result<()> {
    let paths = PathManager::default();
    let config = load_config(&paths, &library)?;
    let mut orchestrator = build_orchestrator(&config, &paths)?;

    let recorded = orchestrator.expirations().len();
    if !yes && is_interactive() {
        let confirmed = prompt_yes_no(
            &format!("Delete {} recorded trailer pointer file(s)?", recorded),
            false,
        )?;
        if !confirmed {
            output.info("Purge cancelled");
            return Ok(());
        }
    }

    let report = orchestrator.purge_pointers().await;
    if output.is_human() {
        output.success(format!(
            "Purged {} pointer file(s) ({} already missing)",
            report.removed, report.missing
        ));
        if report.failed > 0 {
            output.warn(format!("{} pointer file(s) could not be removed", report.failed));
        }
    } else {
        output.json(&json!({ "type": "purge_report", "report": report }));
    }

    monitor_with(orchestrator, &config, output).await
}
