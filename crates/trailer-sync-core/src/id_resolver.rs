use crate::folder::parse_folder_tag;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, warn};
use trailer_sync_models::{FolderTag, IdScheme, ImdbId};
use trailer_sync_sources::{IdLookupProvider, SourceError};

/// Outcome of turning a folder tag into an IMDb id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Resolved { id: ImdbId, scheme: IdScheme },
    /// A tag was found but could not be mapped (lookup miss, provider
    /// failure, or missing credential).
    Unresolved { scheme: IdScheme },
    /// The path does not end in a recognized tag.
    Unrecognized,
}

impl Resolution {
    pub fn id(&self) -> Option<&ImdbId> {
        match self {
            Resolution::Resolved { id, .. } => Some(id),
            _ => None,
        }
    }

    pub fn scheme(&self) -> Option<IdScheme> {
        match self {
            Resolution::Resolved { scheme, .. } | Resolution::Unresolved { scheme } => Some(*scheme),
            Resolution::Unrecognized => None,
        }
    }
}

/// Maps folder tags to IMDb ids through the registered lookup providers.
///
/// Never fails: every provider error is logged and reported as
/// [`Resolution::Unresolved`].
pub struct IdResolver {
    providers: HashMap<IdScheme, Arc<dyn IdLookupProvider>>,
}

impl IdResolver {
    pub fn new(lookups: Vec<Arc<dyn IdLookupProvider>>) -> Self {
        let providers = lookups
            .into_iter()
            .map(|provider| (provider.scheme(), provider))
            .collect();
        Self { providers }
    }

    pub async fn resolve_path(&self, path: &Path) -> Resolution {
        match parse_folder_tag(path) {
            Some(tag) => self.resolve(&tag).await,
            None => Resolution::Unrecognized,
        }
    }

    pub async fn resolve(&self, tag: &FolderTag) -> Resolution {
        if tag.scheme.is_canonical() {
            return match ImdbId::parse(&tag.value) {
                Some(id) => Resolution::Resolved { id, scheme: tag.scheme },
                None => Resolution::Unresolved { scheme: tag.scheme },
            };
        }

        let Some(provider) = self.providers.get(&tag.scheme) else {
            error!(scheme = %tag.scheme, "No lookup provider registered for {}", tag.tag());
            return Resolution::Unresolved { scheme: tag.scheme };
        };

        match provider.lookup_imdb_id(&tag.value).await {
            Ok(Some(id)) => {
                debug!(tag = %tag.tag(), imdb_id = %id, "Resolved folder tag");
                Resolution::Resolved { id, scheme: tag.scheme }
            }
            Ok(None) => {
                warn!(tag = %tag.tag(), provider = provider.lookup_provider_name(), "No IMDb id found for tag");
                Resolution::Unresolved { scheme: tag.scheme }
            }
            Err(SourceError::MissingCredential(name)) => {
                error!(tag = %tag.tag(), "{} API key is not configured; cannot resolve tag", name);
                Resolution::Unresolved { scheme: tag.scheme }
            }
            Err(e) => {
                warn!(tag = %tag.tag(), provider = provider.lookup_provider_name(), "Id lookup failed: {}", e);
                Resolution::Unresolved { scheme: tag.scheme }
            }
        }
    }
}
