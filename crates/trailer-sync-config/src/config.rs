use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("refresh.workers must be at least 1")]
    ZeroWorkers,
    #[error("trailer.filename cannot be empty")]
    EmptyFilename,
    #[error("trailer.pointer_dir must be a relative path")]
    AbsolutePointerDir,
    #[error("scheduler.interval_days must be at least 1")]
    ZeroIntervalDays,
    #[error("monitor.poll_interval_seconds must be at least 1")]
    ZeroPollInterval,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub library: LibraryConfig,
    #[serde(default)]
    pub trailer: TrailerConfig,
    #[serde(default)]
    pub refresh: RefreshConfig,
    #[serde(default)]
    pub scheduler: Option<SchedulerConfig>,
    #[serde(default)]
    pub monitor: MonitorConfig,
    #[serde(default)]
    pub sources: SourcesConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibraryConfig {
    #[serde(default = "default_scan_path")]
    pub scan_path: PathBuf,
}

/// Where and how pointer files are written.
///
/// The pointer for a folder lives at `<folder>/<pointer_dir>/<filename>`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrailerConfig {
    #[serde(default = "default_filename")]
    pub filename: String,
    #[serde(default = "default_pointer_dir")]
    pub pointer_dir: String,
    #[serde(default = "default_start_offset_seconds")]
    pub start_offset_seconds: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshConfig {
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// Retry titles with no trailer after this many days (None = never)
    #[serde(default)]
    pub ignore_retry_days: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    #[serde(default = "default_interval_days")]
    pub interval_days: u32,
    #[serde(default = "default_true")]
    pub run_on_startup: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    #[serde(default = "default_poll_interval_seconds")]
    pub poll_interval_seconds: u64,
    #[serde(default = "default_error_backoff_seconds")]
    pub error_backoff_seconds: u64,
    /// Links expiring within this many seconds are refreshed by the monitor sweep
    #[serde(default = "default_expiry_threshold_seconds")]
    pub expiry_threshold_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    #[serde(default = "default_imdb_base_url")]
    pub imdb_base_url: String,
    #[serde(default = "default_tmdb_base_url")]
    pub tmdb_base_url: String,
    #[serde(default = "default_tvdb_base_url")]
    pub tvdb_base_url: String,
    #[serde(default = "default_request_timeout_seconds")]
    pub request_timeout_seconds: u64,
}

fn default_true() -> bool {
    true
}

fn default_scan_path() -> PathBuf {
    PathBuf::from("/mnt/plex")
}

fn default_filename() -> String {
    "trailer.strm".to_string()
}

fn default_pointer_dir() -> String {
    "backdrops".to_string()
}

fn default_start_offset_seconds() -> u32 {
    10
}

fn default_workers() -> usize {
    4
}

fn default_interval_days() -> u32 {
    7
}

fn default_poll_interval_seconds() -> u64 {
    300 // 5 minutes
}

fn default_error_backoff_seconds() -> u64 {
    60
}

fn default_expiry_threshold_seconds() -> u64 {
    3600 // 1 hour
}

fn default_imdb_base_url() -> String {
    "https://www.imdb.com".to_string()
}

fn default_tmdb_base_url() -> String {
    "https://api.themoviedb.org".to_string()
}

fn default_tvdb_base_url() -> String {
    "https://api4.thetvdb.com".to_string()
}

fn default_request_timeout_seconds() -> u64 {
    20
}

pub fn default_scheduler_config() -> SchedulerConfig {
    SchedulerConfig {
        interval_days: default_interval_days(),
        run_on_startup: default_true(),
    }
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            scan_path: default_scan_path(),
        }
    }
}

impl Default for TrailerConfig {
    fn default() -> Self {
        Self {
            filename: default_filename(),
            pointer_dir: default_pointer_dir(),
            start_offset_seconds: default_start_offset_seconds(),
        }
    }
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            ignore_retry_days: None,
        }
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval_seconds: default_poll_interval_seconds(),
            error_backoff_seconds: default_error_backoff_seconds(),
            expiry_threshold_seconds: default_expiry_threshold_seconds(),
        }
    }
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            imdb_base_url: default_imdb_base_url(),
            tmdb_base_url: default_tmdb_base_url(),
            tvdb_base_url: default_tvdb_base_url(),
            request_timeout_seconds: default_request_timeout_seconds(),
        }
    }
}

impl Config {
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load the config file if present, falling back to defaults, then apply
    /// environment overrides.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        let mut config = if path.exists() {
            Self::load_from_file(path)?
        } else {
            debug!("No config file at {}, using defaults", path.display());
            Self::default()
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply `SCAN_PATH`, `VIDEO_FILENAME`, `SCHEDULE_DAYS` and
    /// `TRAILERFIN_WORKERS` style overrides from `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(scan_path) = lookup("SCAN_PATH").filter(|v| !v.is_empty()) {
            self.library.scan_path = PathBuf::from(scan_path);
        }
        if let Some(filename) = lookup("VIDEO_FILENAME").filter(|v| !v.is_empty()) {
            self.trailer.filename = filename;
        }
        if let Some(days) = lookup("SCHEDULE_DAYS") {
            match days.parse::<u32>() {
                Ok(days) => {
                    self.scheduler
                        .get_or_insert_with(default_scheduler_config)
                        .interval_days = days;
                }
                Err(e) => warn!("Ignoring invalid SCHEDULE_DAYS '{}': {}", days, e),
            }
        }
        if let Some(workers) = lookup("TRAILERFIN_WORKERS") {
            match workers.parse::<usize>() {
                Ok(workers) => self.refresh.workers = workers,
                Err(e) => warn!("Ignoring invalid TRAILERFIN_WORKERS '{}': {}", workers, e),
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.refresh.workers == 0 {
            return Err(ConfigError::ZeroWorkers);
        }
        if self.trailer.filename.trim().is_empty() {
            return Err(ConfigError::EmptyFilename);
        }
        if Path::new(&self.trailer.pointer_dir).is_absolute() {
            return Err(ConfigError::AbsolutePointerDir);
        }
        if let Some(scheduler) = &self.scheduler {
            if scheduler.interval_days == 0 {
                return Err(ConfigError::ZeroIntervalDays);
            }
        }
        if self.monitor.poll_interval_seconds == 0 {
            return Err(ConfigError::ZeroPollInterval);
        }
        Ok(())
    }

    pub fn scheduler_or_default(&self) -> SchedulerConfig {
        self.scheduler.clone().unwrap_or_else(default_scheduler_config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::NamedTempFile;

    #[test]
    fn test_config_load_from_file() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(
            file.path(),
            r#"
[library]
scan_path = "/srv/media"

[refresh]
workers = 8
ignore_retry_days = 30

[scheduler]
interval_days = 3
run_on_startup = false
"#,
        )
        .unwrap();

        let loaded = Config::load_from_file(file.path()).unwrap();
        assert_eq!(loaded.library.scan_path, PathBuf::from("/srv/media"));
        assert_eq!(loaded.refresh.workers, 8);
        assert_eq!(loaded.refresh.ignore_retry_days, Some(30));
        assert_eq!(loaded.scheduler.as_ref().unwrap().interval_days, 3);
        assert!(!loaded.scheduler.as_ref().unwrap().run_on_startup);
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.library.scan_path, PathBuf::from("/mnt/plex"));
        assert_eq!(config.trailer.filename, "trailer.strm");
        assert_eq!(config.trailer.pointer_dir, "backdrops");
        assert_eq!(config.trailer.start_offset_seconds, 10);
        assert_eq!(config.refresh.workers, 4);
        assert_eq!(config.refresh.ignore_retry_days, None);
        assert_eq!(config.monitor.poll_interval_seconds, 300);
        assert_eq!(config.monitor.error_backoff_seconds, 60);
        assert_eq!(config.monitor.expiry_threshold_seconds, 3600);
        assert_eq!(config.scheduler_or_default().interval_days, 7);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_section_fills_defaults() {
        let config: Config = toml::from_str("[trailer]\nfilename = \"theme.strm\"\n").unwrap();
        assert_eq!(config.trailer.filename, "theme.strm");
        assert_eq!(config.trailer.start_offset_seconds, 10);
    }

    #[test]
    fn test_overrides_from_environment() {
        let vars: HashMap<&str, &str> = [
            ("SCAN_PATH", "/data/library"),
            ("VIDEO_FILENAME", "clip.strm"),
            ("SCHEDULE_DAYS", "2"),
            ("TRAILERFIN_WORKERS", "not-a-number"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.library.scan_path, PathBuf::from("/data/library"));
        assert_eq!(config.trailer.filename, "clip.strm");
        assert_eq!(config.scheduler.as_ref().unwrap().interval_days, 2);
        // Invalid values are ignored
        assert_eq!(config.refresh.workers, 4);
    }

    #[test]
    fn test_config_validate() {
        let mut config = Config::default();
        config.refresh.workers = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroWorkers));

        config.refresh.workers = 2;
        config.trailer.filename = "  ".to_string();
        assert_eq!(config.validate(), Err(ConfigError::EmptyFilename));

        config.trailer.filename = "trailer.strm".to_string();
        config.scheduler = Some(SchedulerConfig {
            interval_days: 0,
            run_on_startup: true,
        });
        assert_eq!(config.validate(), Err(ConfigError::ZeroIntervalDays));

        config.scheduler = None;
        assert!(config.validate().is_ok());
    }
}
