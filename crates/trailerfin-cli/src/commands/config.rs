use super::prompts::prompt_secret;
use super::scan_ui::is_interactive;
use super::setup::{load_config, load_credentials};
use super::table::section_table;
use crate::output::Output;
use crate::{ConfigCommands, LibraryArgs};
use color_eyre::eyre::eyre;
use color_eyre::Result;
use serde_json::json;
use trailer_sync_config::{Config, CredentialStore, PathManager};

pub fn run_config(cmd: ConfigCommands, output: &Output) -> Result<()> {
    match cmd {
        ConfigCommands::Show => show_config(output),
        ConfigCommands::SetKeys { tmdb, tvdb } => set_keys(tmdb, tvdb, output),
    }
}

fn show_config(output: &Output) -> Result<()> {
    let paths = PathManager::default();
    let config = load_config(&paths, &LibraryArgs::default())?;
    let credentials = load_credentials(&paths)?;
    let tmdb_key = mask_key(credentials.tmdb_api_key().as_deref());
    let tvdb_key = mask_key(credentials.tvdb_api_key().as_deref());

    if !output.is_human() {
        output.json(&json!({
            "type": "config",
            "config_file": paths.config_file(),
            "config": config,
            "credentials": { "tmdb_api_key": tmdb_key, "tvdb_api_key": tvdb_key },
        }));
        return Ok(());
    }
    if output.is_quiet() {
        return Ok(());
    }

    let config_file = paths.config_file();
    if !config_file.exists() {
        output.warn(format!(
            "No configuration file at {}; showing defaults",
            config_file.display()
        ));
    }

    let mut table = section_table(&["Setting", "Value"]);
    for (key, value) in settings_rows(&config) {
        table.add_row(vec![key.to_string(), value]);
    }
    table.add_row(vec!["credentials.tmdb_api_key".to_string(), tmdb_key]);
    table.add_row(vec!["credentials.tvdb_api_key".to_string(), tvdb_key]);
    output.println(table.to_string());
    output.println(format!("Config file: {}", config_file.display()));
    output.println(format!("Stores:      {}", paths.cache_dir().display()));
    Ok(())
}

fn settings_rows(config: &Config) -> Vec<(&'static str, String)> {
    let scheduler = config.scheduler_or_default();
    vec![
        ("library.scan_path", config.library.scan_path.display().to_string()),
        ("trailer.filename", config.trailer.filename.clone()),
        ("trailer.pointer_dir", config.trailer.pointer_dir.clone()),
        ("trailer.start_offset_seconds", config.trailer.start_offset_seconds.to_string()),
        ("refresh.workers", config.refresh.workers.to_string()),
        (
            "refresh.ignore_retry_days",
            config
                .refresh
                .ignore_retry_days
                .map(|d| d.to_string())
                .unwrap_or_else(|| "never".to_string()),
        ),
        ("scheduler.interval_days", scheduler.interval_days.to_string()),
        ("scheduler.run_on_startup", scheduler.run_on_startup.to_string()),
        ("monitor.poll_interval_seconds", config.monitor.poll_interval_seconds.to_string()),
        ("monitor.error_backoff_seconds", config.monitor.error_backoff_seconds.to_string()),
        ("monitor.expiry_threshold_seconds", config.monitor.expiry_threshold_seconds.to_string()),
        ("sources.imdb_base_url", config.sources.imdb_base_url.clone()),
        ("sources.tmdb_base_url", config.sources.tmdb_base_url.clone()),
        ("sources.tvdb_base_url", config.sources.tvdb_base_url.clone()),
        ("sources.request_timeout_seconds", config.sources.request_timeout_seconds.to_string()),
    ]
}

fn set_keys(tmdb: Option<String>, tvdb: Option<String>, output: &Output) -> Result<()> {
    let paths = PathManager::default();
    let mut credentials = load_credentials(&paths)?;

    let (tmdb, tvdb) = if tmdb.is_none() && tvdb.is_none() {
        if !is_interactive() {
            return Err(eyre!("No keys given. Use --tmdb and/or --tvdb when not running in a terminal"));
        }
        output.println("Leave a key empty to keep the current value.");
        (
            prompt_secret("TMDB API key")?,
            prompt_secret("TVDB API key")?,
        )
    } else {
        (tmdb, tvdb)
    };

    let updated = apply_keys(&mut credentials, tmdb, tvdb);
    if updated.is_empty() {
        output.info("No keys changed");
        return Ok(());
    }

    credentials
        .save()
        .map_err(|e| eyre!("Failed to save credentials to {}: {}", paths.credentials_file().display(), e))?;
    output.success(format!(
        "Saved {} key(s) to {}",
        updated.join(" and "),
        paths.credentials_file().display()
    ));
    Ok(())
}

fn apply_keys(credentials: &mut CredentialStore, tmdb: Option<String>, tvdb: Option<String>) -> Vec<&'static str> {
    let mut updated = Vec::new();
    if let Some(key) = tmdb.map(|k| k.trim().to_string()).filter(|k| !k.is_empty()) {
        credentials.set_tmdb_api_key(key);
        updated.push("TMDB");
    }
    if let Some(key) = tvdb.map(|k| k.trim().to_string()).filter(|k| !k.is_empty()) {
        credentials.set_tvdb_api_key(key);
        updated.push("TVDB");
    }
    updated
}

fn mask_key(key: Option<&str>) -> String {
    match key {
        None => "<not set>".to_string(),
        Some(k) if k.chars().count() <= 4 => "*".repeat(k.chars().count()),
        Some(k) => {
            let chars: Vec<char> = k.chars().collect();
            let head: String = chars[..2].iter().collect();
            let tail: String = chars[chars.len() - 2..].iter().collect();
            format!("{}***{}", head, tail)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_mask_key() {
        assert_eq!(mask_key(None), "<not set>");
        assert_eq!(mask_key(Some("abc")), "***");
        assert_eq!(mask_key(Some("abcdef123456")), "ab***56");
    }

    #[test]
    fn test_apply_keys_skips_blank_values() {
        let dir = TempDir::new().unwrap();
        let mut credentials = CredentialStore::new(dir.path().join("credentials.toml"));

        let updated = apply_keys(&mut credentials, Some(" tmdb-key ".to_string()), Some("   ".to_string()));
        assert_eq!(updated, vec!["TMDB"]);
        assert_eq!(credentials.get("tmdb_api_key").map(String::as_str), Some("tmdb-key"));
        assert_eq!(credentials.get("tvdb_api_key"), None);
    }
}
