use crate::folder::FolderRef;
use anyhow::{bail, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// File extensions counted as media when the monitor looks for new content.
pub const VIDEO_EXTENSIONS: &[&str] = &[
    "mkv", "mp4", "avi", "m4v", "mov", "wmv", "flv", "webm", "mpeg", "mpg", "ts", "m2ts",
];

/// Lazy walk over every tagged folder under a root.
///
/// Directories that cannot be read are skipped. The walk is consumed once.
pub struct FolderScan {
    walker: walkdir::IntoIter,
}

impl Iterator for FolderScan {
    type Item = FolderRef;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.walker.next()? {
                Ok(entry) => entry,
                Err(e) => {
                    debug!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };
            if !entry.file_type().is_dir() {
                continue;
            }
            if let Some(folder) = FolderRef::parse(entry.into_path()) {
                return Some(folder);
            }
        }
    }
}

/// Walk `root` (itself included) and yield each folder whose name ends in a
/// recognized id tag.
pub fn scan(root: &Path) -> Result<FolderScan> {
    if !root.is_dir() {
        bail!("Scan root {} does not exist or is not a directory", root.display());
    }
    Ok(FolderScan {
        walker: WalkDir::new(root).follow_links(true).into_iter(),
    })
}

fn is_video_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| VIDEO_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Tagged folders that contain at least one video file.
///
/// A video file belongs to its nearest tagged ancestor, so episodes in
/// `Show {tvdb-1}/Season 1/` count for the show folder.
pub fn scan_for_media(root: &Path) -> Result<HashMap<PathBuf, FolderRef>> {
    if !root.is_dir() {
        bail!("Scan root {} does not exist or is not a directory", root.display());
    }

    let mut folders = HashMap::new();
    for entry in WalkDir::new(root).follow_links(true).into_iter().filter_map(|e| e.ok()) {
        if !entry.file_type().is_file() || !is_video_file(entry.path()) {
            continue;
        }

        let nearest = entry
            .path()
            .ancestors()
            .skip(1)
            .take_while(|ancestor| ancestor.starts_with(root))
            .find_map(FolderRef::parse);
        if let Some(folder) = nearest {
            folders.entry(folder.path.clone()).or_insert(folder);
        }
    }

    debug!(root = %root.display(), folders = folders.len(), "Media scan complete");
    Ok(folders)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::fs;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"").unwrap();
    }

    #[test]
    fn test_scan_yields_only_tagged_folders() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("Heat {tmdb-949}")).unwrap();
        fs::create_dir_all(root.join("The Matrix {imdb-tt0133093}/backdrops")).unwrap();
        fs::create_dir_all(root.join("Show {tvdb-121361}/Season 1")).unwrap();
        fs::create_dir_all(root.join("Untagged")).unwrap();
        fs::write(root.join("Loose {imdb-tt0000001}"), b"file, not a folder").unwrap();

        let found: HashSet<String> = scan(root)
            .unwrap()
            .map(|f| f.path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();

        let expected: HashSet<String> = ["Heat {tmdb-949}", "The Matrix {imdb-tt0133093}", "Show {tvdb-121361}"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(found, expected);
    }

    #[test]
    fn test_scan_missing_root_is_error() {
        let dir = TempDir::new().unwrap();
        assert!(scan(&dir.path().join("absent")).is_err());
        assert!(scan_for_media(&dir.path().join("absent")).is_err());
    }

    #[test]
    fn test_media_scan_maps_files_to_nearest_tagged_folder() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        let show = root.join("Show {tvdb-121361}");
        touch(&show.join("Season 1").join("S01E01.MKV"));
        touch(&root.join("Heat {tmdb-949}").join("Heat.mp4"));
        touch(&root.join("Empty {imdb-tt0000002}").join("poster.jpg"));
        touch(&root.join("Untagged").join("movie.mkv"));

        let folders = scan_for_media(root).unwrap();
        assert_eq!(folders.len(), 2);
        assert!(folders.contains_key(&show));
        assert!(folders.contains_key(&root.join("Heat {tmdb-949}")));
    }
}
