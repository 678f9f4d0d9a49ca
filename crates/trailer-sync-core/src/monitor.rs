use crate::discovery::scan_for_media;
use crate::refresh::{FolderState, PassReport, RefreshOrchestrator};
use anyhow::Result;
use serde::Serialize;
use std::collections::HashSet;
use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, error, info};
use trailer_sync_config::MonitorConfig;

#[derive(Debug, Clone)]
pub struct MonitorSettings {
    pub poll_interval: Duration,
    pub error_backoff: Duration,
    /// Links expiring within this window are refreshed early.
    pub expiry_threshold: Duration,
}

impl MonitorSettings {
    pub fn from_config(config: &MonitorConfig) -> Self {
        Self {
            poll_interval: Duration::from_secs(config.poll_interval_seconds),
            error_backoff: Duration::from_secs(config.error_backoff_seconds),
            expiry_threshold: Duration::from_secs(config.expiry_threshold_seconds),
        }
    }
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self::from_config(&MonitorConfig::default())
    }
}

/// What one monitor iteration did.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TickReport {
    pub new_folders: usize,
    pub new_refreshed: usize,
    pub sweep: PassReport,
}

/// Watches the library for new media and keeps near-expiry links fresh.
pub struct ContinuousMonitor {
    orchestrator: RefreshOrchestrator,
    root: PathBuf,
    settings: MonitorSettings,
    /// Folders with media seen so far. Starts empty, so the first tick
    /// treats everything as new.
    known_folders: HashSet<PathBuf>,
}

impl ContinuousMonitor {
    pub fn new(orchestrator: RefreshOrchestrator, root: PathBuf, settings: MonitorSettings) -> Self {
        Self {
            orchestrator,
            root,
            settings,
            known_folders: HashSet::new(),
        }
    }

    pub fn known_folders(&self) -> &HashSet<PathBuf> {
        &self.known_folders
    }

    /// One iteration: process newly appeared folders one at a time, then
    /// refresh links close to expiry through the worker pool.
    pub async fn tick(&mut self) -> Result<TickReport> {
        let current = scan_for_media(&self.root)?;
        let mut report = TickReport::default();

        let mut new_folders: Vec<_> = current
            .iter()
            .filter(|(path, _)| !self.known_folders.contains(*path))
            .map(|(_, folder)| folder.clone())
            .collect();
        new_folders.sort_by(|a, b| a.path.cmp(&b.path));

        if !new_folders.is_empty() {
            info!(
                operation = "monitor_new_folders",
                count = new_folders.len(),
                "Found new media folders"
            );
            report.new_folders = new_folders.len();
            for folder in new_folders {
                if self.orchestrator.process_folder(folder).await == FolderState::Refreshed {
                    report.new_refreshed += 1;
                }
            }
            // Removed folders linger here until the next time something new appears
            self.known_folders = current.into_keys().collect();
        } else {
            debug!(known = self.known_folders.len(), "No new media folders");
        }

        let threshold = i64::try_from(self.settings.expiry_threshold.as_secs()).unwrap_or(i64::MAX);
        report.sweep = self.orchestrator.refresh_expiring(threshold).await;
        Ok(report)
    }

    /// Poll until `shutdown` resolves. Shutdown is checked while sleeping
    /// between ticks.
    pub async fn run<F>(&mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        info!(
            operation = "monitor_started",
            root = %self.root.display(),
            poll_secs = self.settings.poll_interval.as_secs(),
            "Monitor started"
        );

        loop {
            let delay = match self.tick().await {
                Ok(report) => {
                    info!(
                        operation = "monitor_tick_complete",
                        new_folders = report.new_folders,
                        new_refreshed = report.new_refreshed,
                        expiring_refreshed = report.sweep.refreshed,
                        "Monitor check complete"
                    );
                    self.settings.poll_interval
                }
                Err(e) => {
                    error!(operation = "monitor_tick_error", error = %e, "Monitor check failed");
                    self.settings.error_backoff
                }
            };

            tokio::select! {
                _ = &mut shutdown => {
                    info!(operation = "monitor_stopped", "Shutdown requested, stopping monitor");
                    return;
                }
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id_resolver::IdResolver;
    use crate::pointer::PointerLayout;
    use crate::refresh::RefreshSettings;
    use crate::store::CacheStore;
    use crate::test_support::FakeTrailerSource;
    use std::sync::Arc;
    use tempfile::TempDir;

    const FAR_FUTURE_URL: &str = "https://cdn/v.mp4?Expires=9999999999#t=10";

    fn monitor(dir: &TempDir, root: PathBuf, source: Arc<FakeTrailerSource>) -> ContinuousMonitor {
        let settings = RefreshSettings {
            workers: 2,
            layout: PointerLayout::new("backdrops", "trailer.strm"),
            ignore_retry: None,
        };
        let orchestrator = RefreshOrchestrator::new(
            IdResolver::new(vec![]),
            source,
            CacheStore::in_dir(&dir.path().join("cache")),
            settings,
        );
        ContinuousMonitor::new(orchestrator, root, MonitorSettings::default())
    }

    fn add_movie(root: &std::path::Path, name: &str) -> PathBuf {
        let folder = root.join(name);
        std::fs::create_dir_all(&folder).unwrap();
        std::fs::write(folder.join("movie.mkv"), b"").unwrap();
        folder
    }

    #[tokio::test]
    async fn test_first_tick_processes_all_then_only_new() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("lib");
        add_movie(&root, "A {imdb-tt0000001}");
        std::fs::create_dir_all(root.join("NoMedia {imdb-tt0000009}")).unwrap();

        let source = Arc::new(
            FakeTrailerSource::new()
                .url("tt0000001", FAR_FUTURE_URL)
                .url("tt0000002", FAR_FUTURE_URL),
        );
        let mut monitor = monitor(&dir, root.clone(), source.clone());

        let first = monitor.tick().await.unwrap();
        assert_eq!(first.new_folders, 1);
        assert_eq!(first.new_refreshed, 1);
        assert_eq!(monitor.known_folders().len(), 1);

        let idle = monitor.tick().await.unwrap();
        assert_eq!(idle.new_folders, 0);
        assert_eq!(source.fetch_count(), 1);

        let b = add_movie(&root, "B {imdb-tt0000002}");
        let third = monitor.tick().await.unwrap();
        assert_eq!(third.new_folders, 1);
        assert!(b.join("backdrops/trailer.strm").exists());
        assert_eq!(source.fetched(), vec!["tt0000001", "tt0000002"]);
    }

    #[tokio::test]
    async fn test_sweep_refreshes_near_expiry_links() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("lib");
        add_movie(&root, "A {imdb-tt0000001}");
        let soon = chrono::Utc::now().timestamp() + 60;
        let short_lived = format!("https://cdn/v.mp4?Expires={}#t=10", soon);

        let source = Arc::new(FakeTrailerSource::new().url("tt0000001", &short_lived));
        let mut monitor = monitor(&dir, root, source.clone());

        // New-folder processing writes a link that the sweep then sees as near expiry
        let report = monitor.tick().await.unwrap();
        assert_eq!(report.new_refreshed, 1);
        assert_eq!(report.sweep.refreshed, 1);
        assert_eq!(source.fetch_count(), 2);
    }

    #[tokio::test]
    async fn test_missing_root_is_tick_error() {
        let dir = TempDir::new().unwrap();
        let source = Arc::new(FakeTrailerSource::new());
        let mut monitor = monitor(&dir, dir.path().join("absent"), source);
        assert!(monitor.tick().await.is_err());
    }

    #[tokio::test]
    async fn test_run_returns_on_shutdown() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("lib");
        std::fs::create_dir_all(&root).unwrap();
        let source = Arc::new(FakeTrailerSource::new());
        let mut monitor = monitor(&dir, root, source);
        monitor.run(async {}).await;
    }
}
