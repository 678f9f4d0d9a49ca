//! Builds the external collaborators from configuration.
//!
//! Lookup providers are always created, even without a credential, so the
//! resolver can report a configuration error for their scheme instead of
//! silently skipping it.

use crate::http::{create_api_client, create_browser_client};
use crate::{IdLookupProvider, ImdbTrailerSource, TmdbLookup, TrailerSource, TvdbLookup};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;
use trailer_sync_config::{Config, CredentialStore};

pub struct SourceSet {
    pub trailer: Arc<dyn TrailerSource>,
    pub lookups: Vec<Arc<dyn IdLookupProvider>>,
}

impl SourceSet {
    pub fn from_config(config: &Config, credentials: &CredentialStore) -> Self {
        let timeout = Duration::from_secs(config.sources.request_timeout_seconds);

        let trailer = ImdbTrailerSource::new(
            create_browser_client(timeout),
            &config.sources.imdb_base_url,
            config.trailer.start_offset_seconds,
        );

        let api_client = create_api_client(timeout);
        let tmdb = TmdbLookup::new(
            api_client.clone(),
            &config.sources.tmdb_base_url,
            credentials.tmdb_api_key(),
        );
        let tvdb = TvdbLookup::new(
            api_client,
            &config.sources.tvdb_base_url,
            credentials.tvdb_api_key(),
        );

        let lookups: Vec<Arc<dyn IdLookupProvider>> = vec![Arc::new(tmdb), Arc::new(tvdb)];
        for provider in &lookups {
            if !provider.is_lookup_available() {
                warn!(
                    provider = provider.lookup_provider_name(),
                    "No API key configured; {{{}-...}} folders cannot be resolved",
                    provider.scheme()
                );
            }
        }

        Self {
            trailer: Arc::new(trailer),
            lookups,
        }
    }
}
