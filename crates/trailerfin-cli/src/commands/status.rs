use super::table::section_table;
use crate::output::Output;
use chrono::{TimeZone, Utc};
use color_eyre::Result;
use serde_json::json;
use trailer_sync_config::PathManager;
use trailer_sync_core::CacheStore;

pub fn run_status(output: &Output) -> Result<()> {
    let paths = PathManager::default();
    let store = CacheStore::new(&paths);
    let expirations = store.expirations.load();
    let ignored = store.ignored.load();
    let id_mappings = store.id_mappings.load();
    let now = Utc::now().timestamp();

    if !output.is_human() {
        output.json(&json!({
            "type": "status",
            "cache_dir": paths.cache_dir(),
            "expirations": expirations,
            "ignored": ignored,
            "id_mappings": id_mappings,
        }));
        return Ok(());
    }
    if output.is_quiet() {
        return Ok(());
    }

    output.println(format!("Stores in {}", paths.cache_dir().display()));
    output.println("");

    if expirations.is_empty() {
        output.info("No trailer links recorded yet");
    } else {
        let mut table = section_table(&["Pointer", "Expires (UTC)", "Remaining"]);
        for (pointer, expires_at) in &expirations {
            let expires = Utc
                .timestamp_opt(*expires_at, 0)
                .single()
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| expires_at.to_string());
            table.add_row(vec![pointer.clone(), expires, format_remaining(*expires_at - now)]);
        }
        output.println(table.to_string());
    }
    output.println("");

    if ignored.is_empty() {
        output.info("No ignored titles");
    } else {
        let mut table = section_table(&["IMDb id", "Folder", "Checked (UTC)", "Reason"]);
        for (id, entry) in &ignored {
            table.add_row(vec![
                id.clone(),
                entry.path.clone(),
                entry.timestamp.format("%Y-%m-%d %H:%M").to_string(),
                entry.reason.clone(),
            ]);
        }
        output.println(table.to_string());
    }

    output.println("");
    output.info(format!(
        "{} link(s), {} ignored title(s), {} cached id mapping(s)",
        expirations.len(),
        ignored.len(),
        id_mappings.len()
    ));
    Ok(())
}

fn format_remaining(seconds: i64) -> String {
    if seconds <= 0 {
        return "expired".to_string();
    }
    let days = seconds / 86_400;
    let hours = (seconds % 86_400) / 3_600;
    let minutes = (seconds % 3_600) / 60;
    match (days, hours) {
        (0, 0) => format!("{}m", minutes.max(1)),
        (0, _) => format!("{}h {}m", hours, minutes),
        _ => format!("{}d {}h", days, hours),
    }
}
