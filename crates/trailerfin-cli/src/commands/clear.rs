use crate::output::Output;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use trailer_sync_config::PathManager;
use trailer_sync_core::{CacheStore, JsonStore};

pub async fn run_clear(ignored: bool, expirations: bool, id_mappings: bool, all: bool, output: &Output) -> Result<()> {
    let path_manager = PathManager::default();
    let store = CacheStore::new(&path_manager);

    if !(ignored || expirations || id_mappings || all) {
        output.warn("No clear option specified. Use --ignored, --expirations, --id-mappings, or --all");
        output.println("\nExample: trailerfin clear --ignored");
        return Ok(());
    }

    if all || ignored {
        clear_store(&store.ignored, "ignore list", output).await?;
    }
    if all || expirations {
        clear_store(&store.expirations, "link expirations", output).await?;
    }
    if all || id_mappings {
        clear_store(&store.id_mappings, "id mappings", output).await?;
    }

    Ok(())
}

async fn clear_store<V>(store: &JsonStore<V>, label: &str, output: &Output) -> Result<()>
where
    V: Serialize + DeserializeOwned,
{
    if !store.path().exists() {
        output.info(format!("No {} found to clear", label));
        return Ok(());
    }

    let entries = store.load().len();
    store
        .clear()
        .await
        .map_err(|e| eyre!("Failed to clear {} at {}: {}", label, store.path().display(), e))?;
    output.success(format!("Cleared {} ({} entries): {}", label, entries, store.path().display()));
    Ok(())
}
