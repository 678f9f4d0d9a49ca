use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use trailer_sync_models::{FolderTag, IdScheme};

fn tag_patterns() -> &'static [(IdScheme, Regex)] {
    static PATTERNS: OnceLock<Vec<(IdScheme, Regex)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        IdScheme::ALL
            .iter()
            .filter_map(|scheme| {
                let pattern = format!(r"\{{{}-({})\}}$", scheme.name(), scheme.value_pattern());
                Regex::new(&pattern).ok().map(|re| (*scheme, re))
            })
            .collect()
    })
}

/// Find the id tag at the very end of a path.
///
/// Trailing separators are ignored. A tag anywhere else in the path (inside
/// a parent component, or followed by more text) is not recognized.
pub fn parse_folder_tag(path: &Path) -> Option<FolderTag> {
    let text = path.to_string_lossy();
    let trimmed = text.trim_end_matches(['/', std::path::MAIN_SEPARATOR]);

    tag_patterns().iter().find_map(|(scheme, re)| {
        re.captures(trimmed)
            .and_then(|caps| caps.get(1))
            .map(|value| FolderTag::new(*scheme, value.as_str()))
    })
}

/// A media folder whose name ends in a recognized id tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FolderRef {
    pub path: PathBuf,
    pub tag: FolderTag,
}

impl FolderRef {
    pub fn parse(path: impl Into<PathBuf>) -> Option<Self> {
        let path = path.into();
        parse_folder_tag(&path).map(|tag| Self { path, tag })
    }

    pub fn display_path(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_tags_are_recognized() {
        let tag = parse_folder_tag(Path::new("/lib/The Matrix (1999) {imdb-tt0133093}")).unwrap();
        assert_eq!(tag, FolderTag::new(IdScheme::Imdb, "tt0133093"));

        let tag = parse_folder_tag(Path::new("/lib/The Matrix {tmdb-603}/")).unwrap();
        assert_eq!(tag, FolderTag::new(IdScheme::Tmdb, "603"));

        let tag = parse_folder_tag(Path::new("/lib/Show {tvdb-121361}")).unwrap();
        assert_eq!(tag, FolderTag::new(IdScheme::Tvdb, "121361"));
    }

    #[test]
    fn test_non_suffix_tags_are_ignored() {
        assert_eq!(parse_folder_tag(Path::new("/lib/Show {imdb-tt0944947}/Season 1")), None);
        assert_eq!(parse_folder_tag(Path::new("/lib/Movie {imdb-tt0133093} extras")), None);
        assert_eq!(parse_folder_tag(Path::new("/lib/Movie {tmdb-60a}")), None);
        assert_eq!(parse_folder_tag(Path::new("/lib/Movie {imdb-0133093}")), None);
        assert_eq!(parse_folder_tag(Path::new("/lib/Plain Folder")), None);
    }

    #[test]
    fn test_folder_ref_keeps_path() {
        let folder = FolderRef::parse("/lib/Heat {tmdb-949}").unwrap();
        assert_eq!(folder.path, PathBuf::from("/lib/Heat {tmdb-949}"));
        assert_eq!(folder.tag.cache_key(), "tmdb:949");
        assert!(FolderRef::parse("/lib/Heat").is_none());
    }
}
