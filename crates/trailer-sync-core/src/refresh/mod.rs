//! Refresh passes over tagged media folders.
//!
//! The orchestrator owns the three persistent maps. For each folder it first
//! settles what it can without the network (ignored id, link still valid);
//! the rest go to a bounded pool of workers. Workers read frozen snapshots
//! and report outcomes back, and the orchestrator applies each outcome and
//! saves the affected store before taking the next one.

mod report;
mod worker;


pub use report::{FolderState, PassReport, PurgeReport};

use crate::discovery::scan;
use crate::expiry::is_link_valid;
use crate::folder::FolderRef;
use crate::id_resolver::IdResolver;
use crate::pointer::{remove_pointer, PointerLayout};
use crate::store::CacheStore;
use anyhow::Result;
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};
use trailer_sync_config::Config;
use trailer_sync_models::{IgnoreEntry, ImdbId};
use trailer_sync_sources::TrailerSource;
use worker::{run_isolated, UnitOutcome, UnitReport, WorkUnit, WorkerContext};

#[derive(Debug, Clone)]
pub struct RefreshSettings {
    pub workers: usize,
    pub layout: PointerLayout,
    /// How long a no-trailer verdict holds. `None` means forever.
    pub ignore_retry: Option<chrono::Duration>,
}

impl RefreshSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            workers: config.refresh.workers.max(1),
            layout: PointerLayout::from_config(&config.trailer),
            ignore_retry: config
                .refresh
                .ignore_retry_days
                .map(|days| chrono::Duration::days(i64::from(days))),
        }
    }
}

enum Precheck {
    Settled(FolderState),
    Dispatch(WorkUnit),
}

fn pointer_key(pointer_path: &Path) -> String {
    pointer_path.to_string_lossy().into_owned()
}

pub struct RefreshOrchestrator {
    resolver: Arc<IdResolver>,
    trailer_source: Arc<dyn TrailerSource>,
    store: CacheStore,
    settings: RefreshSettings,
    expirations: BTreeMap<String, i64>,
    ignored: BTreeMap<String, IgnoreEntry>,
    id_mappings: BTreeMap<String, ImdbId>,
}

impl RefreshOrchestrator {
    /// Loads all three stores; a missing or unreadable store starts empty.
    pub fn new(
        resolver: IdResolver,
        trailer_source: Arc<dyn TrailerSource>,
        store: CacheStore,
        settings: RefreshSettings,
    ) -> Self {
        let expirations = store.expirations.load();
        let ignored = store.ignored.load();
        let id_mappings = store.id_mappings.load();
        info!(
            expirations = expirations.len(),
            ignored = ignored.len(),
            id_mappings = id_mappings.len(),
            "Loaded trailer stores"
        );

        Self {
            resolver: Arc::new(resolver),
            trailer_source,
            store,
            settings,
            expirations,
            ignored,
            id_mappings,
        }
    }

    pub fn expirations(&self) -> &BTreeMap<String, i64> {
        &self.expirations
    }

    /// Full pass over every tagged folder under `root`.
    ///
    /// Fails only when `root` itself is missing.
    #[instrument(skip_all, fields(root = %root.display()))]
    pub async fn scan_library(&mut self, root: &Path) -> Result<PassReport> {
        let folders = scan(root).map_err(|e| {
            error!("Scan aborted: {:#}", e);
            e
        })?;
        Ok(self.run_pass(folders).await)
    }

    pub async fn run_pass<I>(&mut self, folders: I) -> PassReport
    where
        I: IntoIterator<Item = FolderRef>,
    {
        self.run_pass_with_window(folders, 0).await
    }

    /// Run a pass treating links that expire within `window_seconds` as
    /// already expired.
    pub async fn run_pass_with_window<I>(&mut self, folders: I, window_seconds: i64) -> PassReport
    where
        I: IntoIterator<Item = FolderRef>,
    {
        let started = Instant::now();
        let now = Utc::now();
        let mut report = PassReport::default();

        let mut units = Vec::new();
        for folder in folders {
            report.discovered += 1;
            match self.precheck(folder, window_seconds, now) {
                Precheck::Settled(state) => report.record(state),
                Precheck::Dispatch(unit) => units.push(unit),
            }
        }

        if !units.is_empty() {
            debug!(folders = units.len(), workers = self.settings.workers, "Dispatching to workers");
            let ctx = self.worker_context(now);
            let mut results = stream::iter(units)
                .map(|unit| run_isolated(ctx.clone(), unit))
                .buffer_unordered(self.settings.workers.max(1));

            while let Some(unit_report) = results.next().await {
                let state = self.apply(unit_report).await;
                report.record(state);
            }
        }

        report.duration = started.elapsed();
        info!(
            discovered = report.discovered,
            valid = report.valid,
            ignored = report.ignored,
            refreshed = report.refreshed,
            marked_ignored = report.marked_ignored,
            unresolved = report.unresolved,
            failed = report.failed,
            duration_ms = report.duration.as_millis() as u64,
            "Refresh pass complete"
        );
        report
    }

    /// Process a single folder immediately, outside the pool.
    pub async fn process_folder(&mut self, folder: FolderRef) -> FolderState {
        let now = Utc::now();
        match self.precheck(folder, 0, now) {
            Precheck::Settled(state) => state,
            Precheck::Dispatch(unit) => {
                let unit_report = run_isolated(self.worker_context(now), unit).await;
                self.apply(unit_report).await
            }
        }
    }

    /// Refresh every recorded pointer whose link expires within
    /// `threshold_seconds`. Folders that no longer exist are skipped.
    pub async fn refresh_expiring(&mut self, threshold_seconds: i64) -> PassReport {
        let now = Utc::now().timestamp();
        let layout = &self.settings.layout;

        let folders: Vec<FolderRef> = self
            .expirations
            .iter()
            .filter(|(_, expires_at)| expires_at.saturating_sub(now) < threshold_seconds)
            .filter_map(|(pointer, _)| layout.folder_for_pointer(Path::new(pointer)))
            .filter(|folder| {
                let exists = folder.is_dir();
                if !exists {
                    debug!(folder = %folder.display(), "Skipping expiring pointer for missing folder");
                }
                exists
            })
            .filter_map(FolderRef::parse)
            .collect();

        if folders.is_empty() {
            debug!("No links near expiry");
            return PassReport::default();
        }
        info!(count = folders.len(), threshold_seconds, "Refreshing links near expiry");
        self.run_pass_with_window(folders, threshold_seconds).await
    }

    /// Delete every pointer file named in the expiration map, then empty
    /// the map.
    pub async fn purge_pointers(&mut self) -> PurgeReport {
        let mut report = PurgeReport::default();

        for pointer in self.expirations.keys() {
            match remove_pointer(Path::new(pointer)).await {
                Ok(true) => {
                    info!(pointer = %pointer, "Removed pointer file");
                    report.removed += 1;
                }
                Ok(false) => {
                    debug!(pointer = %pointer, "Pointer file already gone");
                    report.missing += 1;
                }
                Err(e) => {
                    warn!(pointer = %pointer, "Failed to remove pointer: {:#}", e);
                    report.failed += 1;
                }
            }
        }

        self.expirations.clear();
        self.persist_expirations().await;
        info!(
            removed = report.removed,
            missing = report.missing,
            failed = report.failed,
            "Purge complete"
        );
        report
    }

    fn known_id(&self, folder: &FolderRef) -> Option<ImdbId> {
        if folder.tag.scheme.is_canonical() {
            ImdbId::parse(&folder.tag.value)
        } else {
            self.id_mappings.get(&folder.tag.cache_key()).cloned()
        }
    }

    fn is_ignored(&self, id: &ImdbId, now: DateTime<Utc>) -> bool {
        self.ignored
            .get(id.as_str())
            .map(|entry| entry.is_active(self.settings.ignore_retry, now))
            .unwrap_or(false)
    }

    fn worker_context(&self, now: DateTime<Utc>) -> WorkerContext {
        let ignored_ids: HashSet<ImdbId> = self
            .ignored
            .keys()
            .filter_map(|key| ImdbId::parse(key))
            .filter(|id| self.is_ignored(id, now))
            .collect();

        WorkerContext {
            resolver: Arc::clone(&self.resolver),
            trailer_source: Arc::clone(&self.trailer_source),
            ignored_ids: Arc::new(ignored_ids),
        }
    }

    fn precheck(&self, folder: FolderRef, window_seconds: i64, now: DateTime<Utc>) -> Precheck {
        let pointer_path: PathBuf = self.settings.layout.pointer_path(&folder.path);
        let known_id = self.known_id(&folder);

        if let Some(id) = &known_id {
            if self.is_ignored(id, now) {
                info!(imdb_id = %id, folder = %folder.display_path(), "Skipping ignored title");
                return Precheck::Settled(FolderState::Ignored);
            }
        }

        let expiry = self.expirations.get(&pointer_key(&pointer_path)).copied();
        if is_link_valid(expiry, now.timestamp(), window_seconds) {
            info!(folder = %folder.display_path(), "Trailer link still valid");
            return Precheck::Settled(FolderState::Valid);
        }

        Precheck::Dispatch(WorkUnit {
            folder,
            pointer_path,
            known_id,
        })
    }

    async fn apply(&mut self, unit_report: UnitReport) -> FolderState {
        let UnitReport {
            folder,
            pointer_path,
            mapping,
            outcome,
        } = unit_report;

        if let Some((key, id)) = mapping {
            if self.id_mappings.get(&key) != Some(&id) {
                self.id_mappings.insert(key, id);
                self.persist_id_mappings().await;
            }
        }

        match outcome {
            UnitOutcome::Refreshed { id, url, expiry } => {
                info!(imdb_id = %id, pointer = %pointer_path.display(), "Trailer pointer updated");
                let key = pointer_key(&pointer_path);
                match expiry {
                    Some(expires_at) => {
                        self.expirations.insert(key, expires_at);
                    }
                    None => {
                        warn!(imdb_id = %id, url = %url, "Trailer URL has no expiry; it will be refreshed next pass");
                        self.expirations.remove(&key);
                    }
                }
                self.persist_expirations().await;

                if self.ignored.remove(id.as_str()).is_some() {
                    self.persist_ignored().await;
                }
                FolderState::Refreshed
            }
            UnitOutcome::NoTrailer { id } => {
                info!(imdb_id = %id, folder = %folder.display_path(), "No trailer available, adding to ignore list");
                self.ignored
                    .insert(id.to_string(), IgnoreEntry::no_trailer(folder.display_path(), Utc::now()));
                self.persist_ignored().await;
                FolderState::MarkedIgnored
            }
            UnitOutcome::Ignored { id } => {
                info!(imdb_id = %id, folder = %folder.display_path(), "Skipping ignored title");
                FolderState::Ignored
            }
            UnitOutcome::Unresolved => {
                warn!(folder = %folder.display_path(), tag = %folder.tag.tag(), "Could not resolve folder to an IMDb id");
                FolderState::Unresolved
            }
            UnitOutcome::Failed { id, reason } => {
                error!(
                    imdb_id = id.as_ref().map(|id| id.as_str()).unwrap_or("-"),
                    folder = %folder.display_path(),
                    "Trailer refresh failed: {}",
                    reason
                );
                FolderState::Failed
            }
        }
    }

    async fn persist_expirations(&self) {
        if let Err(e) = self.store.expirations.save(&self.expirations).await {
            error!(store = "expirations", "Failed to save store: {:#}", e);
        }
    }

    async fn persist_ignored(&self) {
        if let Err(e) = self.store.ignored.save(&self.ignored).await {
            error!(store = "ignored", "Failed to save store: {:#}", e);
        }
    }

    async fn persist_id_mappings(&self) {
        if let Err(e) = self.store.id_mappings.save(&self.id_mappings).await {
            error!(store = "id_mappings", "Failed to save store: {:#}", e);
        }
    }
}
