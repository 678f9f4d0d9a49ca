use super::scan_ui::ScanUI;
use super::setup::{build_orchestrator, load_config};
use crate::output::Output;
use crate::LibraryArgs;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use serde_json::json;
use trailer_sync_config::PathManager;
use trailer_sync_core::PassReport;

pub async fn run_scan(library: LibraryArgs, output: &Output) -> Result<()> {
    tracing::debug!("Scan command started");

    let paths = PathManager::default();
    let config = load_config(&paths, &library)?;
    let mut orchestrator = build_orchestrator(&config, &paths)?;
    let root = config.library.scan_path.clone();

    let ui = ScanUI::start(
        format!("Scanning {}", root.display()),
        output.is_human() && !output.is_quiet(),
    );
    let result = orchestrator.scan_library(&root).await;
    ui.finish();

    match result {
        Ok(report) => {
            print_pass_report(&report, output);
            Ok(())
        }
        Err(e) => {
            output.error(format!("Scan failed: {:#}", e));
            Err(eyre!("Scan of {} failed", root.display()))
        }
    }
}

pub fn print_pass_report(report: &PassReport, output: &Output) {
    if !output.is_human() {
        output.json(&json!({ "type": "pass_report", "report": report }));
        return;
    }

    output.success(format!(
        "Scanned {} folder(s) in {:.1}s",
        report.discovered,
        report.duration.as_secs_f64()
    ));
    output.println(format!("  refreshed:       {}", report.refreshed));
    output.println(format!("  still valid:     {}", report.valid));
    output.println(format!("  ignored:         {}", report.ignored));
    output.println(format!("  newly ignored:   {}", report.marked_ignored));
    output.println(format!("  unresolved:      {}", report.unresolved));
    if report.failed > 0 {
        output.warn(format!("{} folder(s) failed and will be retried next run", report.failed));
    }
}
