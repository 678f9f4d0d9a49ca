use thiserror::Error;

/// Failure talking to an external service.
///
/// Every variant is transient from the caller's point of view: content
/// absence is reported as `Ok(None)`, never as an error.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{url} returned status {status}")]
    Status { status: u16, url: String },

    #[error("Unexpected response: {0}")]
    Parse(String),

    #[error("{0} API key is not configured")]
    MissingCredential(&'static str),
}

impl SourceError {
    pub fn parse(message: impl Into<String>) -> Self {
        SourceError::Parse(message.into())
    }
}
