//! Relay-based HTML fetching.
//!
//! Retailer pages are not fetched directly; each request is forwarded through
//! a public relay endpoint. Relays are tried in order and the first usable
//! body wins. There is no retry or backoff beyond walking the list.

use std::time::Duration;

use async_trait::async_trait;
use pricewise_core::encode_uri_component;
use reqwest::Client;

use crate::error::ScraperError;

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// Source of raw page bodies for the comparison pipeline.
///
/// The production implementation is [`RelayFetcher`]; tests substitute a
/// scripted fetcher so the pipeline runs without network access.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches `target_url` and returns the response body as text.
    async fn fetch(&self, target_url: &str) -> Result<String, ScraperError>;
}

/// Fetches pages through an ordered list of relay base URLs.
///
/// A relay request is `"{relay}{percent-encoded target}"`. Any failure
/// (network, timeout, non-2xx, empty body) advances to the next relay.
pub struct RelayFetcher {
    client: Client,
    relays: Vec<String>,
}

impl RelayFetcher {
    /// Creates a `RelayFetcher` with a per-request timeout and `User-Agent`.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        relays: Vec<String>,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(timeout_secs.min(10)))
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client, relays })
    }

    /// Builds the relay request URL for `target_url`.
    #[must_use]
    pub fn relay_url(relay: &str, target_url: &str) -> String {
        format!("{relay}{}", encode_uri_component(target_url))
    }

    async fn fetch_via(&self, relay: &str, target_url: &str) -> Result<String, ScraperError> {
        let url = Self::relay_url(relay, target_url);
        let response = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, ACCEPT_HTML)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScraperError::UnexpectedStatus {
                status: status.as_u16(),
                url,
            });
        }

        // JSON-wrapping relays hand back structured data; the raw text of the
        // body is what callers parse either way.
        let body = response.text().await?;
        if body.trim().is_empty() {
            return Err(ScraperError::EmptyBody { url });
        }
        Ok(body)
    }
}

#[async_trait]
impl PageFetcher for RelayFetcher {
    /// # Errors
    ///
    /// Returns [`ScraperError::AllProxiesFailed`] carrying one message per
    /// relay when none of them produced a body.
    async fn fetch(&self, target_url: &str) -> Result<String, ScraperError> {
        let mut errors = Vec::with_capacity(self.relays.len());

        for relay in &self.relays {
            match self.fetch_via(relay, target_url).await {
                Ok(body) => {
                    tracing::debug!(relay = relay.as_str(), target_url, bytes = body.len(), "relay fetch succeeded");
                    return Ok(body);
                }
                Err(e) => {
                    tracing::debug!(relay = relay.as_str(), target_url, error = %e, "relay fetch failed");
                    errors.push(format!("relay {relay} failed: {e}"));
                }
            }
        }

        tracing::warn!(target_url, relays = self.relays.len(), "all relays failed");
        Err(ScraperError::AllProxiesFailed {
            url: target_url.to_owned(),
            errors,
        })
    }
}
