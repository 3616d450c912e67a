use std::time::Duration;

use async_trait::async_trait;
use pricewise_core::{sort_by_price, ProductResult, CURRENCY_SYMBOL};
use reqwest::{Client, Url};
use serde::Deserialize;

use super::AggregatorSearch;
use crate::error::ScraperError;
use crate::normalize::find_rupee_amount;

const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/customsearch/v1";
const RESULT_LOGO: &str = "🔍";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    #[serde(default)]
    title: String,
    link: String,
    #[serde(default)]
    snippet: String,
    #[serde(default)]
    pagemap: Option<PageMap>,
}

#[derive(Debug, Deserialize)]
struct PageMap {
    #[serde(default)]
    cse_image: Vec<CseImage>,
}

#[derive(Debug, Deserialize)]
struct CseImage {
    src: Option<String>,
}

/// Queries the Custom Search JSON API directly, without relays.
///
/// Use [`CustomSearchClient::new`] for production or
/// [`CustomSearchClient::with_base_url`] to point at a mock server in tests.
pub struct CustomSearchClient {
    client: Client,
    api_key: String,
    engine_id: String,
    base_url: Url,
}

impl CustomSearchClient {
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: &str, engine_id: &str, timeout_secs: u64) -> Result<Self, ScraperError> {
        Self::with_base_url(api_key, engine_id, timeout_secs, DEFAULT_BASE_URL)
    }

    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the client cannot be built, or
    /// [`ScraperError::InvalidUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        api_key: &str,
        engine_id: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(timeout_secs.min(10)))
            .build()?;
        let base_url = Url::parse(base_url).map_err(|e| ScraperError::InvalidUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            engine_id: engine_id.to_owned(),
            base_url,
        })
    }

    fn request_url(&self, product_name: &str) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair("key", &self.api_key)
            .append_pair("cx", &self.engine_id)
            .append_pair("q", &format!("{product_name} price India buy online"));
        url
    }
}

#[async_trait]
impl AggregatorSearch for CustomSearchClient {
    fn name(&self) -> &'static str {
        "custom-search"
    }

    async fn search(&self, product_name: &str) -> Result<Vec<ProductResult>, ScraperError> {
        let response = self.client.get(self.request_url(product_name)).send().await?;

        let status = response.status();
        if !status.is_success() {
            // The request URL carries the API key; report the base only.
            return Err(ScraperError::UnexpectedStatus {
                status: status.as_u16(),
                url: self.base_url.to_string(),
            });
        }

        let body = response.text().await?;
        let parsed: SearchResponse =
            serde_json::from_str(&body).map_err(|e| ScraperError::Deserialize {
                context: format!("custom search for \"{product_name}\""),
                source: e,
            })?;

        let mut results: Vec<ProductResult> =
            parsed.items.into_iter().filter_map(item_to_result).collect();
        sort_by_price(&mut results);
        Ok(results)
    }
}

fn item_to_result(item: SearchItem) -> Option<ProductResult> {
    let price = find_rupee_amount(&item.snippet).filter(|p| *p > 0.0)?;
    let website = Url::parse(&item.link)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.trim_start_matches("www.").to_owned()))?;
    let image_url = item
        .pagemap
        .and_then(|p| p.cse_image.into_iter().next())
        .and_then(|img| img.src);

    Some(ProductResult {
        website,
        product_name: item.title,
        price: Some(price),
        currency: CURRENCY_SYMBOL.to_owned(),
        url: item.link,
        image_url,
        available: true,
        is_original: false,
        logo: Some(RESULT_LOGO.to_owned()),
    })
}
