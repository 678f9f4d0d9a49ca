//! TVDB v4 external id lookup.
//!
//! The static API key is exchanged for a bearer token (`POST /v4/login`),
//! then `/v4/series/{id}/extended` and `/v4/movies/{id}/extended` are
//! searched for a remote id whose source is IMDB.

use crate::error::SourceError;
use crate::http::trim_base_url;
use crate::traits::IdLookupProvider;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::RwLock;
use tracing::debug;
use trailer_sync_models::{IdScheme, ImdbId, MediaKind};

const LOOKUP_ORDER: [MediaKind; 2] = [MediaKind::Show, MediaKind::Movie];

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
struct LoginData {
    token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExtendedRecord {
    #[serde(default)]
    remote_ids: Vec<RemoteId>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RemoteId {
    id: String,
    #[serde(default)]
    source_name: Option<String>,
}

pub struct TvdbLookup {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    token: RwLock<Option<String>>,
}

impl TvdbLookup {
    pub fn new(client: Client, base_url: &str, api_key: Option<String>) -> Self {
        Self {
            client,
            base_url: trim_base_url(base_url),
            api_key,
            token: RwLock::new(None),
        }
    }

    fn kind_segment(kind: MediaKind) -> &'static str {
        match kind {
            MediaKind::Movie => "movies",
            MediaKind::Show => "series",
        }
    }

    async fn bearer_token(&self, api_key: &str) -> Result<String, SourceError> {
        if let Some(token) = self.token.read().await.as_ref() {
            return Ok(token.clone());
        }

        let url = format!("{}/v4/login", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&json!({ "apikey": api_key }))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(SourceError::Status {
                status: response.status().as_u16(),
                url,
            });
        }

        let login: Envelope<LoginData> = response
            .json()
            .await
            .map_err(|e| SourceError::parse(format!("TVDB login response: {}", e)))?;
        let token = login
            .data
            .map(|d| d.token)
            .ok_or_else(|| SourceError::parse("TVDB login response has no token"))?;

        *self.token.write().await = Some(token.clone());
        Ok(token)
    }

    async fn lookup_as(&self, kind: MediaKind, id: &str, token: &str) -> Result<Option<ImdbId>, SourceError> {
        let url = format!("{}/v4/{}/{}/extended", self.base_url, Self::kind_segment(kind), id);
        let response = self.client.get(&url).bearer_auth(token).send().await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            // Token expired; log in again on the next call
            *self.token.write().await = None;
            return Err(SourceError::Status {
                status: StatusCode::UNAUTHORIZED.as_u16(),
                url,
            });
        }
        if !response.status().is_success() {
            debug!(tvdb_id = id, kind = ?kind, status = response.status().as_u16(), "TVDB lookup miss");
            return Ok(None);
        }

        let record = match response.json::<Envelope<ExtendedRecord>>().await {
            Ok(envelope) => envelope.data,
            Err(e) => {
                debug!(tvdb_id = id, kind = ?kind, "TVDB record unreadable: {}", e);
                return Ok(None);
            }
        };

        Ok(record.and_then(|record| {
            record
                .remote_ids
                .iter()
                .filter(|remote| {
                    remote
                        .source_name
                        .as_deref()
                        .map(|name| name.eq_ignore_ascii_case("imdb"))
                        .unwrap_or(false)
                })
                .find_map(|remote| ImdbId::parse(&remote.id))
        }))
    }
}

#[async_trait]
impl IdLookupProvider for TvdbLookup {
    fn lookup_provider_name(&self) -> &str {
        "tvdb"
    }

    fn scheme(&self) -> IdScheme {
        IdScheme::Tvdb
    }

    fn is_lookup_available(&self) -> bool {
        self.api_key.is_some()
    }

    async fn lookup_imdb_id(&self, value: &str) -> Result<Option<ImdbId>, SourceError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(SourceError::MissingCredential("TVDB"))?;
        let token = self.bearer_token(api_key).await?;

        for kind in LOOKUP_ORDER {
            if let Some(imdb_id) = self.lookup_as(kind, value, &token).await? {
                debug!(tvdb_id = value, kind = ?kind, imdb_id = %imdb_id, "Resolved TVDB id");
                return Ok(Some(imdb_id));
            }
        }
        Ok(None)
    }
}
