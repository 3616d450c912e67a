use std::path::PathBuf;

use crate::ConfigError;

/// Public relay endpoints tried in order when no `PRICEWISE_RELAYS` override
/// is set. Each base URL has the percent-encoded target appended verbatim.
pub const DEFAULT_RELAYS: &[&str] = &[
    "https://api.allorigins.win/raw?url=",
    "https://corsproxy.io/?",
    "https://api.codetabs.com/v1/proxy?quest=",
    "https://thingproxy.freeboard.io/fetch/",
];

/// Which aggregator is queried before falling back to per-retailer scraping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregatorMode {
    /// Scrape the shopping results page through the relays.
    Shopping,
    /// Query the Custom Search JSON API directly (needs key + engine id).
    CustomSearch,
    /// Skip the aggregator and always scrape retailers.
    Off,
}

impl std::fmt::Display for AggregatorMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AggregatorMode::Shopping => write!(f, "shopping"),
            AggregatorMode::CustomSearch => write!(f, "custom-search"),
            AggregatorMode::Off => write!(f, "off"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub relays: Vec<String>,
    pub cache_dir: PathBuf,
    pub cache_ttl_secs: u64,
    pub retailers_path: Option<PathBuf>,
    pub demo_mode: bool,
    pub demo_delay_ms: u64,
    pub aggregator: AggregatorMode,
    pub google_api_key: Option<String>,
    pub google_cx: Option<String>,
    pub low_similarity_threshold: f64,
}

impl AppConfig {
    /// API key and engine id for the Custom Search aggregator.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnvVar`] naming the first absent variable.
    pub fn custom_search_credentials(&self) -> Result<(&str, &str), ConfigError> {
        let key = self
            .google_api_key
            .as_deref()
            .ok_or_else(|| ConfigError::MissingEnvVar("PRICEWISE_GOOGLE_API_KEY".to_string()))?;
        let cx = self
            .google_cx
            .as_deref()
            .ok_or_else(|| ConfigError::MissingEnvVar("PRICEWISE_GOOGLE_CX".to_string()))?;
        Ok((key, cx))
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("log_level", &self.log_level)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("relays", &self.relays)
            .field("cache_dir", &self.cache_dir)
            .field("cache_ttl_secs", &self.cache_ttl_secs)
            .field("retailers_path", &self.retailers_path)
            .field("demo_mode", &self.demo_mode)
            .field("demo_delay_ms", &self.demo_delay_ms)
            .field("aggregator", &self.aggregator)
            .field(
                "google_api_key",
                &self.google_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("google_cx", &self.google_cx)
            .field("low_similarity_threshold", &self.low_similarity_threshold)
            .finish()
    }
}
