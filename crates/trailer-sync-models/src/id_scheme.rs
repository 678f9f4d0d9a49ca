use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// External id schemes that may appear as a `{scheme-value}` folder tag.
///
/// The canonical scheme needs no lookup; the others are resolved through
/// an external provider.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum IdScheme {
    Imdb,
    Tmdb,
    Tvdb,
}

impl IdScheme {
    /// Match priority: canonical first, then external schemes.
    pub const ALL: [IdScheme; 3] = [IdScheme::Imdb, IdScheme::Tmdb, IdScheme::Tvdb];

    pub fn name(&self) -> &'static str {
        match self {
            IdScheme::Imdb => "imdb",
            IdScheme::Tmdb => "tmdb",
            IdScheme::Tvdb => "tvdb",
        }
    }

    pub fn is_canonical(&self) -> bool {
        matches!(self, IdScheme::Imdb)
    }

    /// Regex fragment matching a value of this scheme inside a tag.
    pub fn value_pattern(&self) -> &'static str {
        match self {
            IdScheme::Imdb => r"tt\d+",
            IdScheme::Tmdb | IdScheme::Tvdb => r"\d+",
        }
    }
}

impl fmt::Display for IdScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for IdScheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "imdb" => Ok(IdScheme::Imdb),
            "tmdb" => Ok(IdScheme::Tmdb),
            "tvdb" => Ok(IdScheme::Tvdb),
            _ => Err(format!("Unknown id scheme: {}", s)),
        }
    }
}

/// A recognized `{scheme-value}` tag taken from a folder name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct FolderTag {
    pub scheme: IdScheme,
    pub value: String,
}

impl FolderTag {
    pub fn new(scheme: IdScheme, value: impl Into<String>) -> Self {
        Self {
            scheme,
            value: value.into(),
        }
    }

    /// The tag as written in a folder name, e.g. `{tmdb-603}`.
    pub fn tag(&self) -> String {
        format!("{{{}-{}}}", self.scheme, self.value)
    }

    /// Key used by the id mapping cache, e.g. `tmdb:603`.
    pub fn cache_key(&self) -> String {
        format!("{}:{}", self.scheme, self.value)
    }
}

impl fmt::Display for FolderTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_order_starts_with_canonical() {
        assert!(IdScheme::ALL[0].is_canonical());
        assert!(IdScheme::ALL[1..].iter().all(|s| !s.is_canonical()));
    }

    #[test]
    fn test_tag_formatting() {
        let tag = FolderTag::new(IdScheme::Tmdb, "603");
        assert_eq!(tag.tag(), "{tmdb-603}");
        assert_eq!(tag.cache_key(), "tmdb:603");
    }

    #[test]
    fn test_scheme_from_str() {
        assert_eq!("TVDB".parse::<IdScheme>().unwrap(), IdScheme::Tvdb);
        assert!("anidb".parse::<IdScheme>().is_err());
    }
}
