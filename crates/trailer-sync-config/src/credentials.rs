use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

const TMDB_API_KEY: &str = "tmdb_api_key";
const TVDB_API_KEY: &str = "tvdb_api_key";

#[derive(Debug, Serialize, Deserialize, Default)]
struct CredentialsData {
    #[serde(flatten)]
    data: HashMap<String, String>,
}

/// Static API keys for the external id services.
///
/// Keys come from `credentials.toml`; `TMDB_API_KEY` / `TVDB_API_KEY`
/// environment variables take precedence.
pub struct CredentialStore {
    path: PathBuf,
    credentials: HashMap<String, String>,
}

impl CredentialStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            credentials: HashMap::new(),
        }
    }

    pub fn load(&mut self) -> Result<()> {
        if self.path.exists() {
            let content = std::fs::read_to_string(&self.path)?;
            let creds_data: CredentialsData = toml::from_str(&content)?;
            self.credentials = creds_data.data;
        }
        Ok(())
    }

    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let creds_data = CredentialsData {
            data: self.credentials.clone(),
        };
        let content = toml::to_string_pretty(&creds_data)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&String> {
        self.credentials.get(key)
    }

    pub fn set(&mut self, key: String, value: String) {
        self.credentials.insert(key, value);
    }

    pub fn tmdb_api_key(&self) -> Option<String> {
        self.resolve(TMDB_API_KEY, "TMDB_API_KEY", |var| std::env::var(var).ok())
    }

    pub fn set_tmdb_api_key(&mut self, key: String) {
        self.set(TMDB_API_KEY.to_string(), key);
    }

    pub fn tvdb_api_key(&self) -> Option<String> {
        self.resolve(TVDB_API_KEY, "TVDB_API_KEY", |var| std::env::var(var).ok())
    }

    pub fn set_tvdb_api_key(&mut self, key: String) {
        self.set(TVDB_API_KEY.to_string(), key);
    }

    /// Environment value from `lookup` first, then the file. Blank values
    /// count as unset.
    fn resolve<F>(&self, key: &str, env_var: &str, lookup: F) -> Option<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        lookup(env_var)
            .filter(|v| !v.trim().is_empty())
            .or_else(|| self.get(key).cloned())
            .filter(|v| !v.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_credentials_round_trip_through_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("credentials.toml");

        let mut store = CredentialStore::new(path.clone());
        store.set("tvdb_api_key".to_string(), "tvdb-secret".to_string());
        store.save().unwrap();

        let mut reloaded = CredentialStore::new(path);
        reloaded.load().unwrap();
        assert_eq!(reloaded.get("tvdb_api_key").map(String::as_str), Some("tvdb-secret"));
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = TempDir::new().unwrap();
        let mut store = CredentialStore::new(dir.path().join("absent.toml"));
        store.load().unwrap();
        assert!(store.get("tmdb_api_key").is_none());
    }

    #[test]
    fn test_blank_key_is_treated_as_missing() {
        let dir = TempDir::new().unwrap();
        let mut store = CredentialStore::new(dir.path().join("credentials.toml"));
        store.set("tvdb_api_key".to_string(), "   ".to_string());

        assert!(store.resolve(TVDB_API_KEY, "TVDB_API_KEY", |_| None).is_none());
        assert!(store
            .resolve(TVDB_API_KEY, "TVDB_API_KEY", |_| Some(" ".to_string()))
            .is_none());
    }

    #[test]
    fn test_environment_key_wins_over_file() {
        let dir = TempDir::new().unwrap();
        let mut store = CredentialStore::new(dir.path().join("credentials.toml"));
        store.set_tmdb_api_key("from-file".to_string());

        let from_env = store.resolve(TMDB_API_KEY, "TMDB_API_KEY", |var| {
            (var == "TMDB_API_KEY").then(|| "from-env".to_string())
        });
        assert_eq!(from_env.as_deref(), Some("from-env"));

        let env_unset = store.resolve(TMDB_API_KEY, "TMDB_API_KEY", |_| None);
        assert_eq!(env_unset.as_deref(), Some("from-file"));
    }
}
