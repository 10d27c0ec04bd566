use thiserror::Error;

/// Why a single service's document could not be obtained.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("failed to read response from {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} did not return JSON: {source}")]
    InvalidJson {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("document for `{service}` is not a JSON object")]
    NotAnObject { service: String },

    #[error("no document available for `{service}`")]
    Missing { service: String },

    #[error("document for `{service}` could not be loaded: {reason}")]
    Unreadable { service: String, reason: String },
}

/// Aggregation produced nothing that can be rendered.
#[derive(Debug, Error)]
pub enum AggregateError {
    #[error("no services configured")]
    NoServices,

    #[error("all {attempted} services failed to load")]
    AllFailed { attempted: usize },
}
