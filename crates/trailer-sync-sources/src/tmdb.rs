//! TMDB external id lookup.
//!
//! `GET /3/{movie|tv}/{id}/external_ids` carries the IMDb id of a title.
//! The id is tried as a movie first, then as a TV show.

use crate::error::SourceError;
use crate::http::trim_base_url;
use crate::traits::IdLookupProvider;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;
use trailer_sync_models::{IdScheme, ImdbId, MediaKind};

#[derive(Debug, Deserialize)]
struct ExternalIds {
    imdb_id: Option<String>,
}

#[derive(Clone)]
pub struct TmdbLookup {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl TmdbLookup {
    pub fn new(client: Client, base_url: &str, api_key: Option<String>) -> Self {
        Self {
            client,
            base_url: trim_base_url(base_url),
            api_key,
        }
    }

    fn kind_segment(kind: MediaKind) -> &'static str {
        match kind {
            MediaKind::Movie => "movie",
            MediaKind::Show => "tv",
        }
    }

    async fn lookup_as(&self, kind: MediaKind, id: &str, api_key: &str) -> Result<Option<ImdbId>, SourceError> {
        let url = format!("{}/3/{}/{}/external_ids", self.base_url, Self::kind_segment(kind), id);
        let response = self
            .client
            .get(&url)
            .query(&[("api_key", api_key)])
            .send()
            .await?;

        if !response.status().is_success() {
            debug!(tmdb_id = id, kind = ?kind, status = response.status().as_u16(), "TMDB lookup miss");
            return Ok(None);
        }

        let ids = match response.json::<ExternalIds>().await {
            Ok(ids) => ids,
            Err(e) => {
                debug!(tmdb_id = id, kind = ?kind, "TMDB external_ids unreadable: {}", e);
                return Ok(None);
            }
        };
        Ok(ids.imdb_id.as_deref().and_then(ImdbId::parse))
    }
}

#[async_trait]
impl IdLookupProvider for TmdbLookup {
    fn lookup_provider_name(&self) -> &str {
        "tmdb"
    }

    fn scheme(&self) -> IdScheme {
        IdScheme::Tmdb
    }

    fn is_lookup_available(&self) -> bool {
        self.api_key.is_some()
    }

    async fn lookup_imdb_id(&self, value: &str) -> Result<Option<ImdbId>, SourceError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(SourceError::MissingCredential("TMDB"))?;

        for kind in MediaKind::LOOKUP_ORDER {
            if let Some(imdb_id) = self.lookup_as(kind, value, api_key).await? {
                debug!(tmdb_id = value, kind = ?kind, imdb_id = %imdb_id, "Resolved TMDB id");
                return Ok(Some(imdb_id));
            }
        }
        Ok(None)
    }
}
