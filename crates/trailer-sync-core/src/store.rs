//! JSON stores for the expiration map, ignore list and id mapping cache.
//!
//! Each store is a single JSON object loaded wholesale and rewritten
//! wholesale. An unreadable file is backed up next to itself and treated as
//! empty.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};
use trailer_sync_config::PathManager;
use trailer_sync_models::{IgnoreEntry, ImdbId};

pub struct JsonStore<V> {
    path: PathBuf,
    label: &'static str,
    _value: PhantomData<fn() -> V>,
}

impl<V> JsonStore<V>
where
    V: Serialize + DeserializeOwned,
{
    pub fn new(path: PathBuf, label: &'static str) -> Self {
        Self {
            path,
            label,
            _value: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> BTreeMap<String, V> {
        let data = match std::fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(store = self.label, "Store file does not exist, starting empty");
                return BTreeMap::new();
            }
            Err(e) => {
                warn!(store = self.label, path = %self.path.display(), "Failed to read store: {}", e);
                return BTreeMap::new();
            }
        };

        match serde_json::from_str(&data) {
            Ok(map) => map,
            Err(e) => {
                self.back_up_unreadable(&e);
                BTreeMap::new()
            }
        }
    }

    fn back_up_unreadable(&self, error: &serde_json::Error) {
        let backup_path = self.path.with_extension("json.bak");
        match std::fs::copy(&self.path, &backup_path) {
            Ok(_) => info!(
                store = self.label,
                backup = %backup_path.display(),
                "Store unreadable ({}), backed up and starting empty",
                error
            ),
            Err(backup_err) => warn!(
                store = self.label,
                "Store unreadable ({}) and backup failed: {}. Starting empty.",
                error,
                backup_err
            ),
        }
    }

    /// Atomic write: temp file, then rename over the store.
    pub async fn save(&self, map: &BTreeMap<String, V>) -> Result<()> {
        let json = serde_json::to_string_pretty(map)?;
        let entries = map.len();

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let temp_path = self.path.with_extension("tmp");
        fs::write(&temp_path, json)
            .await
            .with_context(|| format!("Failed to write {}", temp_path.display()))?;
        fs::rename(&temp_path, &self.path)
            .await
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;

        debug!(store = self.label, entries, "Saved store");
        Ok(())
    }

    pub async fn clear(&self) -> Result<()> {
        self.save(&BTreeMap::new()).await
    }
}

/// The three persistent maps.
///
/// - expirations: pointer path -> unix expiry seconds
/// - ignored: IMDb id -> ignore record
/// - id mappings: `scheme:value` -> IMDb id
pub struct CacheStore {
    pub expirations: JsonStore<i64>,
    pub ignored: JsonStore<IgnoreEntry>,
    pub id_mappings: JsonStore<ImdbId>,
}

impl CacheStore {
    pub fn new(paths: &PathManager) -> Self {
        Self {
            expirations: JsonStore::new(paths.expirations_file(), "expirations"),
            ignored: JsonStore::new(paths.ignored_file(), "ignored"),
            id_mappings: JsonStore::new(paths.id_mappings_file(), "id_mappings"),
        }
    }

    pub fn in_dir(dir: &Path) -> Self {
        Self {
            expirations: JsonStore::new(dir.join("expirations.json"), "expirations"),
            ignored: JsonStore::new(dir.join("ignored.json"), "ignored"),
            id_mappings: JsonStore::new(dir.join("id_mappings.json"), "id_mappings"),
        }
    }
}
