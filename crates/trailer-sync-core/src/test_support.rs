use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use trailer_sync_models::{IdScheme, ImdbId};
use trailer_sync_sources::{IdLookupProvider, SourceError, TrailerSource};

pub struct FakeLookup {
    scheme: IdScheme,
    ids: HashMap<String, String>,
    failing: bool,
    has_credential: bool,
    calls: AtomicUsize,
}

impl FakeLookup {
    pub fn new(scheme: IdScheme) -> Self {
        Self {
            scheme,
            ids: HashMap::new(),
            failing: false,
            has_credential: true,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with(mut self, value: &str, imdb_id: &str) -> Self {
        self.ids.insert(value.to_string(), imdb_id.to_string());
        self
    }

    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    pub fn without_credential(mut self) -> Self {
        self.has_credential = false;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdLookupProvider for FakeLookup {
    fn lookup_provider_name(&self) -> &str {
        "fake"
    }

    fn scheme(&self) -> IdScheme {
        self.scheme
    }

    fn is_lookup_available(&self) -> bool {
        self.has_credential
    }

    async fn lookup_imdb_id(&self, value: &str) -> Result<Option<ImdbId>, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.has_credential {
            return Err(SourceError::MissingCredential("FAKE"));
        }
        if self.failing {
            return Err(SourceError::parse("lookup exploded"));
        }
        Ok(self.ids.get(value).and_then(|id| ImdbId::parse(id)))
    }
}

#[derive(Clone)]
pub enum FakeTrailer {
    Url(String),
    NoTrailer,
    Error,
    Panic,
}

/// Trailer source answering from a fixed table; unknown ids are errors.
#[derive(Default)]
pub struct FakeTrailerSource {
    answers: HashMap<String, FakeTrailer>,
    fetched: Mutex<Vec<String>>,
    delay: Option<Duration>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeTrailerSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answer(mut self, imdb_id: &str, trailer: FakeTrailer) -> Self {
        self.answers.insert(imdb_id.to_string(), trailer);
        self
    }

    pub fn url(self, imdb_id: &str, url: &str) -> Self {
        self.answer(imdb_id, FakeTrailer::Url(url.to_string()))
    }

    /// Hold every fetch open for `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Highest number of fetches that were running at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }

    pub fn fetch_count(&self) -> usize {
        self.fetched.lock().unwrap().len()
    }
}

#[async_trait]
impl TrailerSource for FakeTrailerSource {
    fn source_name(&self) -> &str {
        "fake"
    }

    async fn fetch_trailer_url(&self, imdb_id: &ImdbId) -> Result<Option<String>, SourceError> {
        self.fetched.lock().unwrap().push(imdb_id.to_string());
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(running, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match self.answers.get(imdb_id.as_str()) {
            Some(FakeTrailer::Url(url)) => Ok(Some(url.clone())),
            Some(FakeTrailer::NoTrailer) => Ok(None),
            Some(FakeTrailer::Panic) => panic!("source crashed for {}", imdb_id),
            Some(FakeTrailer::Error) | None => Err(SourceError::Status {
                status: 503,
                url: format!("fake://{}", imdb_id),
            }),
        }
    }
}
