use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use trailer_sync_config::TrailerConfig;

/// Where pointer files live relative to their media folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointerLayout {
    pub pointer_dir: String,
    pub filename: String,
}

impl PointerLayout {
    pub fn new(pointer_dir: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            pointer_dir: pointer_dir.into(),
            filename: filename.into(),
        }
    }

    pub fn from_config(config: &TrailerConfig) -> Self {
        Self::new(config.pointer_dir.clone(), config.filename.clone())
    }

    /// `<folder>/<pointer_dir>/<filename>`
    pub fn pointer_path(&self, folder: &Path) -> PathBuf {
        folder.join(&self.pointer_dir).join(&self.filename)
    }

    /// Inverse of [`pointer_path`](Self::pointer_path).
    pub fn folder_for_pointer(&self, pointer: &Path) -> Option<PathBuf> {
        let mut folder = pointer.parent()?;
        for _ in Path::new(&self.pointer_dir).components() {
            folder = folder.parent()?;
        }
        Some(folder.to_path_buf())
    }
}

/// Replace the pointer file with a single line holding `url`.
///
/// Written to a sibling temp file and renamed over the target, so readers
/// never observe a partial pointer.
pub async fn write_pointer(path: &Path, url: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let temp_path = path.with_extension("tmp");
    tokio::fs::write(&temp_path, url)
        .await
        .with_context(|| format!("Failed to write {}", temp_path.display()))?;
    tokio::fs::rename(&temp_path, path)
        .await
        .with_context(|| format!("Failed to move pointer into place at {}", path.display()))?;
    Ok(())
}

/// Delete a pointer file. Returns false when it was already gone.
pub async fn remove_pointer(path: &Path) -> Result<bool> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e).with_context(|| format!("Failed to remove {}", path.display())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_pointer_path_round_trips_to_folder() {
        let layout = PointerLayout::new("backdrops", "trailer.strm");
        let folder = Path::new("/lib/Heat {tmdb-949}");
        let pointer = layout.pointer_path(folder);

        assert_eq!(pointer, PathBuf::from("/lib/Heat {tmdb-949}/backdrops/trailer.strm"));
        assert_eq!(layout.folder_for_pointer(&pointer), Some(folder.to_path_buf()));
    }

    #[tokio::test]
    async fn test_write_pointer_creates_directory_and_overwrites() {
        let dir = TempDir::new().unwrap();
        let pointer = dir.path().join("backdrops").join("trailer.strm");

        write_pointer(&pointer, "https://cdn/a.mp4#t=10").await.unwrap();
        write_pointer(&pointer, "https://cdn/b.mp4#t=10").await.unwrap();

        assert_eq!(std::fs::read_to_string(&pointer).unwrap(), "https://cdn/b.mp4#t=10");
        assert!(!pointer.with_extension("tmp").exists());
    }

    #[tokio::test]
    async fn test_remove_missing_pointer_is_not_an_error() {
        let dir = TempDir::new().unwrap();
        let pointer = dir.path().join("trailer.strm");
        assert!(!remove_pointer(&pointer).await.unwrap());

        std::fs::write(&pointer, "x").unwrap();
        assert!(remove_pointer(&pointer).await.unwrap());
        assert!(!pointer.exists());
    }
}
