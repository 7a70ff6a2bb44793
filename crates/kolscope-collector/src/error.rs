use thiserror::Error;

/// Errors raised while talking to the third-party X-data API.
#[derive(Debug, Error)]
pub enum CollectorError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The upstream rejected the request with a 4xx status. Not retried;
    /// the affected page is skipped.
    #[error("client rejected ({status}) for {url}")]
    ClientRejected { status: u16, url: String },

    /// The response body could not be parsed into the expected shape.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// No API credential configured. Aborts the whole collection before the
    /// first request; surfaced to the UI as "unavailable".
    #[error("no API key configured for the X-data API")]
    MissingApiKey,

    /// A request URL could not be constructed from the configured base URL.
    #[error("invalid request URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },
}

impl CollectorError {
    /// Fatal errors abort the whole collection run instead of skipping a page.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, CollectorError::MissingApiKey)
    }
}
