use thiserror::Error;

/// Failures of a single fetch through the relay layer or an aggregator API.
#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("empty response body from {url}")]
    EmptyBody { url: String },

    #[error("all relays failed for {url}:\n{}", .errors.join("\n"))]
    AllProxiesFailed { url: String, errors: Vec<String> },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },
}

/// Failures that abort a whole comparison and are shown to the user.
///
/// Per-retailer problems never surface here; they become unavailable
/// entries in the result set instead.
#[derive(Debug, Error)]
pub enum CompareError {
    #[error("Unsupported website. Please use {supported}.")]
    UnsupportedWebsite { url: String, supported: String },

    #[error("Could not extract product name from URL: {url}")]
    ProductNameExtractionFailed { url: String },

    #[error(
        "No results found. The websites might be blocking requests. Try enabling demo mode."
    )]
    NoResults,
}
