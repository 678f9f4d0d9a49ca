use crate::error::SourceError;
use async_trait::async_trait;
use trailer_sync_models::{IdScheme, ImdbId};

/// Locates a direct, time-limited trailer URL for a title.
#[async_trait]
pub trait TrailerSource: Send + Sync {
    fn source_name(&self) -> &str;

    /// Returns the playable URL (with its start fragment) or `None` when
    /// the title has no trailer.
    async fn fetch_trailer_url(&self, imdb_id: &ImdbId) -> Result<Option<String>, SourceError>;
}

/// Maps an id from an external scheme to the canonical id.
#[async_trait]
pub trait IdLookupProvider: Send + Sync {
    fn lookup_provider_name(&self) -> &str;

    /// The folder tag scheme this provider understands
    fn scheme(&self) -> IdScheme;

    /// False when the provider has no credential configured
    fn is_lookup_available(&self) -> bool;

    async fn lookup_imdb_id(&self, value: &str) -> Result<Option<ImdbId>, SourceError>;
}
