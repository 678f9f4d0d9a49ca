use crate::refresh::RefreshOrchestrator;
use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info};

/// Runs a full refresh pass every `interval`, optionally once at startup.
pub struct PeriodicScheduler {
    orchestrator: RefreshOrchestrator,
    root: PathBuf,
    interval: Duration,
    run_on_startup: bool,
}

impl PeriodicScheduler {
    pub fn new(orchestrator: RefreshOrchestrator, root: PathBuf, interval: Duration, run_on_startup: bool) -> Self {
        Self {
            orchestrator,
            root,
            interval,
            run_on_startup,
        }
    }

    pub fn with_interval_days(orchestrator: RefreshOrchestrator, root: PathBuf, days: u32, run_on_startup: bool) -> Self {
        Self::new(
            orchestrator,
            root,
            Duration::from_secs(u64::from(days.max(1)) * 24 * 60 * 60),
            run_on_startup,
        )
    }

    /// Loop until `shutdown` resolves. Shutdown is only observed between
    /// passes, never in the middle of one.
    pub async fn run<F>(&mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        if self.run_on_startup {
            info!(operation = "scheduler_startup", "Running initial refresh on startup");
            self.run_once().await;
        }

        info!(
            operation = "scheduler_started",
            interval_secs = self.interval.as_secs(),
            root = %self.root.display(),
            "Scheduler started"
        );

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!(operation = "scheduler_stopped", "Shutdown requested, stopping scheduler");
                    return;
                }
                _ = tokio::time::sleep(self.interval) => {}
            }

            info!(operation = "scheduled_refresh_start", "Starting scheduled refresh");
            self.run_once().await;
        }
    }

    async fn run_once(&mut self) {
        match self.orchestrator.scan_library(&self.root).await {
            Ok(report) => info!(
                operation = "scheduled_refresh_complete",
                refreshed = report.refreshed,
                failed = report.failed,
                duration_ms = report.duration.as_millis() as u64,
                "Scheduled refresh completed"
            ),
            Err(e) => error!(
                operation = "scheduled_refresh_error",
                error = %e,
                "Scheduled refresh failed"
            ),
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

    fn orchestrator(dir: &TempDir, source: Arc<FakeTrailerSource>) -> RefreshOrchestrator {
        let settings = RefreshSettings {
            workers: 1,
            layout: PointerLayout::new("backdrops", "trailer.strm"),
            ignore_retry: None,
        };
        RefreshOrchestrator::new(
            IdResolver::new(vec![]),
            source,
            CacheStore::in_dir(&dir.path().join("cache")),
            settings,
        )
    }

    #[tokio::test]
    async fn test_startup_run_then_stops_on_shutdown() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("lib");
        std::fs::create_dir_all(root.join("A {imdb-tt0000001}")).unwrap();
        let source = Arc::new(FakeTrailerSource::new().url("tt0000001", "https://cdn/a.mp4?Expires=1#t=10"));

        let mut scheduler = PeriodicScheduler::with_interval_days(orchestrator(&dir, source.clone()), root, 7, true);
        scheduler.run(async {}).await;

        assert_eq!(source.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_no_startup_run_when_disabled() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("lib");
        std::fs::create_dir_all(root.join("A {imdb-tt0000001}")).unwrap();
        let source = Arc::new(FakeTrailerSource::new());

        let mut scheduler = PeriodicScheduler::with_interval_days(orchestrator(&dir, source.clone()), root, 7, false);
        scheduler.run(async {}).await;

        assert_eq!(source.fetch_count(), 0);
    }
}
