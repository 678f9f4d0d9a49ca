use crate::expiry::parse_expiry;
use crate::folder::FolderRef;
use crate::id_resolver::{IdResolver, Resolution};
use crate::pointer::write_pointer;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use trailer_sync_models::ImdbId;
use trailer_sync_sources::TrailerSource;

/// Everything a worker reads. Shared maps are frozen snapshots; workers
/// report changes back instead of writing them.
#[derive(Clone)]
pub(super) struct WorkerContext {
    pub resolver: Arc<IdResolver>,
    pub trailer_source: Arc<dyn TrailerSource>,
    pub ignored_ids: Arc<HashSet<ImdbId>>,
}

pub(super) struct WorkUnit {
    pub folder: FolderRef,
    pub pointer_path: PathBuf,
    /// Already known from the folder tag or the id mapping cache.
    pub known_id: Option<ImdbId>,
}

pub(super) enum UnitOutcome {
    Refreshed {
        id: ImdbId,
        url: String,
        expiry: Option<i64>,
    },
    NoTrailer {
        id: ImdbId,
    },
    Ignored {
        id: ImdbId,
    },
    Unresolved,
    Failed {
        id: Option<ImdbId>,
        reason: String,
    },
}

pub(super) struct UnitReport {
    pub folder: FolderRef,
    pub pointer_path: PathBuf,
    /// Newly resolved `scheme:value` -> id pair, to be cached.
    pub mapping: Option<(String, ImdbId)>,
    pub outcome: UnitOutcome,
}

/// Run one folder on its own task so a panic is contained to that folder.
pub(super) async fn run_isolated(ctx: WorkerContext, unit: WorkUnit) -> UnitReport {
    let folder = unit.folder.clone();
    let pointer_path = unit.pointer_path.clone();
    let known_id = unit.known_id.clone();

    match tokio::spawn(refresh_folder(ctx, unit)).await {
        Ok(report) => report,
        Err(e) => UnitReport {
            folder,
            pointer_path,
            mapping: None,
            outcome: UnitOutcome::Failed {
                id: known_id,
                reason: format!("worker aborted: {}", e),
            },
        },
    }
}

async fn refresh_folder(ctx: WorkerContext, unit: WorkUnit) -> UnitReport {
    let WorkUnit {
        folder,
        pointer_path,
        known_id,
    } = unit;

    let mut mapping = None;
    let id = match known_id {
        Some(id) => id,
        None => match ctx.resolver.resolve(&folder.tag).await {
            Resolution::Resolved { id, scheme } => {
                if !scheme.is_canonical() {
                    mapping = Some((folder.tag.cache_key(), id.clone()));
                }
                id
            }
            Resolution::Unresolved { .. } | Resolution::Unrecognized => {
                return UnitReport {
                    folder,
                    pointer_path,
                    mapping,
                    outcome: UnitOutcome::Unresolved,
                };
            }
        },
    };

    let outcome = if ctx.ignored_ids.contains(&id) {
        UnitOutcome::Ignored { id }
    } else {
        info!(imdb_id = %id, folder = %folder.display_path(), "Refreshing trailer");
        match ctx.trailer_source.fetch_trailer_url(&id).await {
            Ok(Some(url)) => match write_pointer(&pointer_path, &url).await {
                Ok(()) => UnitOutcome::Refreshed {
                    expiry: parse_expiry(&url),
                    id,
                    url,
                },
                Err(e) => UnitOutcome::Failed {
                    id: Some(id),
                    reason: format!("{:#}", e),
                },
            },
            Ok(None) => UnitOutcome::NoTrailer { id },
            Err(e) => UnitOutcome::Failed {
                id: Some(id),
                reason: e.to_string(),
            },
        }
    };

    UnitReport {
        folder,
        pointer_path,
        mapping,
        outcome,
    }
}
