//! The comparison pipeline: cache, aggregator, then per-retailer fan-out.

use std::sync::{Arc, LazyLock};

use futures::future::join_all;
use pricewise_core::{sort_by_price, ProductResult, RetailerConfig, SlugRule, CURRENCY_SYMBOL};
use reqwest::Url;
use scraper::{Html, Selector};
use serde::Serialize;

use crate::aggregator::AggregatorSearch;
use crate::cache::ResultCache;
use crate::error::CompareError;
use crate::extract::{extract_attribute, extract_text, scoped_text};
use crate::fetch::PageFetcher;
use crate::normalize::{normalize_price, similarity};
use crate::urls::{clean_title, detect_retailer, extract_name_from_url};

/// Default similarity below which a matched title is logged as suspect.
pub const DEFAULT_LOW_SIMILARITY_THRESHOLD: f64 = 0.3;

static TITLE_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("title").expect("valid title selector"));
static H1_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h1").expect("valid h1 selector"));

/// Where a comparison's results came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonSource {
    Cache,
    Aggregator,
    Retailers,
    Demo,
}

impl std::fmt::Display for ComparisonSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ComparisonSource::Cache => write!(f, "cache"),
            ComparisonSource::Aggregator => write!(f, "aggregator"),
            ComparisonSource::Retailers => write!(f, "retailers"),
            ComparisonSource::Demo => write!(f, "demo"),
        }
    }
}

/// A finished comparison. `results` holds only available, priced offers in
/// ascending price order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Comparison {
    pub product_name: String,
    pub results: Vec<ProductResult>,
    pub source: ComparisonSource,
}

pub struct PriceComparer {
    fetcher: Arc<dyn PageFetcher>,
    retailers: Vec<RetailerConfig>,
    cache: ResultCache,
    aggregator: Option<Arc<dyn AggregatorSearch>>,
    low_similarity_threshold: f64,
}

impl PriceComparer {
    #[must_use]
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        retailers: Vec<RetailerConfig>,
        cache: ResultCache,
    ) -> Self {
        Self {
            fetcher,
            retailers,
            cache,
            aggregator: None,
            low_similarity_threshold: DEFAULT_LOW_SIMILARITY_THRESHOLD,
        }
    }

    /// Queries `aggregator` before scraping retailers individually.
    #[must_use]
    pub fn with_aggregator(mut self, aggregator: Arc<dyn AggregatorSearch>) -> Self {
        self.aggregator = Some(aggregator);
        self
    }

    #[must_use]
    pub fn with_low_similarity_threshold(mut self, threshold: f64) -> Self {
        self.low_similarity_threshold = threshold;
        self
    }

    #[must_use]
    pub fn retailers(&self) -> &[RetailerConfig] {
        &self.retailers
    }

    #[must_use]
    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    /// Compares prices for the product at `url`.
    ///
    /// A fresh cache entry is returned without any network activity. A
    /// non-empty aggregator answer is accepted as-is and skips retailer
    /// scraping entirely. Otherwise every configured retailer is searched
    /// concurrently; per-retailer failures become unavailable entries and
    /// are filtered out of the returned list. An empty result list is not
    /// an error at this layer.
    ///
    /// # Errors
    ///
    /// - [`CompareError::UnsupportedWebsite`] if no retailer domain matches
    ///   `url` and the aggregator produced nothing.
    /// - [`CompareError::ProductNameExtractionFailed`] if neither the URL nor
    ///   the product page yields a name.
    pub async fn compare(&self, url: &str) -> Result<Comparison, CompareError> {
        self.cache.purge_expired();

        if let Some(entry) = self.cache.get(url) {
            tracing::info!(url, results = entry.results.len(), "returning cached comparison");
            return Ok(Comparison {
                product_name: entry.product_name,
                results: entry.results,
                source: ComparisonSource::Cache,
            });
        }

        if let Some((product_name, results)) = self.try_aggregator(url).await {
            self.cache.set(url, &product_name, &results);
            return Ok(Comparison {
                product_name,
                results,
                source: ComparisonSource::Aggregator,
            });
        }

        let origin = detect_retailer(url, &self.retailers).ok_or_else(|| {
            CompareError::UnsupportedWebsite {
                url: url.to_owned(),
                supported: supported_list(&self.retailers),
            }
        })?;

        let from_url = extract_name_from_url(url, &origin.slug);
        let product_name = self.refine_name(url, from_url).await;
        if product_name.is_empty() {
            return Err(CompareError::ProductNameExtractionFailed {
                url: url.to_owned(),
            });
        }
        tracing::debug!(url, product_name = %product_name, origin = origin.id.as_str(), "searching retailers");

        let searches = self
            .retailers
            .iter()
            .map(|retailer| self.search_one_site(retailer, &product_name, retailer.id == origin.id));
        let mut results: Vec<ProductResult> = join_all(searches)
            .await
            .into_iter()
            .filter(ProductResult::is_comparable)
            .collect();
        sort_by_price(&mut results);

        tracing::info!(
            url,
            product_name = %product_name,
            results = results.len(),
            retailers = self.retailers.len(),
            "comparison complete"
        );
        self.cache.set(url, &product_name, &results);

        Ok(Comparison {
            product_name,
            results,
            source: ComparisonSource::Retailers,
        })
    }

    /// Runs the aggregator on the URL-derived name. Any failure or empty
    /// answer yields `None` so the caller falls back to retailer scraping.
    async fn try_aggregator(&self, url: &str) -> Option<(String, Vec<ProductResult>)> {
        let aggregator = self.aggregator.as_ref()?;

        let generic = SlugRule::FirstSegment;
        let rule = detect_retailer(url, &self.retailers).map_or(&generic, |r| &r.slug);
        let product_name = extract_name_from_url(url, rule);
        if product_name.is_empty() {
            return None;
        }

        match aggregator.search(&product_name).await {
            Ok(results) if !results.is_empty() => {
                tracing::info!(
                    aggregator = aggregator.name(),
                    product_name = %product_name,
                    results = results.len(),
                    "using aggregator results"
                );
                Some((product_name, results))
            }
            Ok(_) => {
                tracing::debug!(
                    aggregator = aggregator.name(),
                    product_name = %product_name,
                    "aggregator found nothing"
                );
                None
            }
            Err(e) => {
                tracing::warn!(
                    aggregator = aggregator.name(),
                    error = %e,
                    "aggregator search failed; falling back to retailers"
                );
                None
            }
        }
    }

    async fn refine_name(&self, url: &str, from_url: String) -> String {
        match self.fetcher.fetch(url).await {
            Ok(html) => refine_from_page(&html, from_url),
            Err(e) => {
                tracing::warn!(url, error = %e, "could not fetch product page; keeping URL-derived name");
                from_url
            }
        }
    }

    async fn search_one_site(
        &self,
        retailer: &RetailerConfig,
        target_name: &str,
        is_original: bool,
    ) -> ProductResult {
        let search_url = retailer.search_url_for(target_name);
        tracing::debug!(retailer = retailer.id.as_str(), search_url = %search_url, "searching retailer");

        match self.fetcher.fetch(&search_url).await {
            Ok(html) => parse_search_page(
                retailer,
                &html,
                &search_url,
                target_name,
                is_original,
                self.low_similarity_threshold,
            ),
            Err(e) => {
                tracing::warn!(retailer = retailer.id.as_str(), error = %e, "retailer search failed");
                unavailable(retailer, target_name, &search_url, is_original)
            }
        }
    }
}

/// Picks the best product name from a fetched product page.
///
/// A non-empty cleaned `<title>` replaces `current`; a cleaned `<h1>` then
/// wins if it is longer.
fn refine_from_page(html: &str, current: String) -> String {
    let document = Html::parse_document(html);
    let mut name = current;

    if let Some(title) = document.select(&TITLE_SEL).next() {
        let cleaned = clean_title(&title.text().collect::<String>());
        if !cleaned.is_empty() {
            name = cleaned;
        }
    }
    if let Some(heading) = scoped_text(document.root_element(), &H1_SEL) {
        let cleaned = clean_title(&heading);
        if cleaned.chars().count() > name.chars().count() {
            name = cleaned;
        }
    }
    name
}

/// Reads the first result card from a retailer search page.
fn parse_search_page(
    retailer: &RetailerConfig,
    html: &str,
    search_url: &str,
    target_name: &str,
    is_original: bool,
    low_similarity_threshold: f64,
) -> ProductResult {
    let document = Html::parse_document(html);
    let selectors = &retailer.selectors;

    let (Some(title), Some(price_text)) = (
        extract_text(&document, &selectors.title),
        extract_text(&document, &selectors.price),
    ) else {
        tracing::debug!(retailer = retailer.id.as_str(), "no title or price on search page");
        return unavailable(retailer, target_name, search_url, is_original);
    };
    let link = extract_attribute(&document, &selectors.link, "href");
    let image_url = extract_attribute(&document, &selectors.image, "src");

    let score = similarity(target_name, &title);
    if score < low_similarity_threshold {
        tracing::warn!(
            retailer = retailer.id.as_str(),
            similarity = score,
            title = %title,
            "low title similarity"
        );
    }

    let url = link.map_or_else(
        || search_url.to_owned(),
        |href| absolutize(&retailer.origin(), &href),
    );

    ProductResult {
        website: retailer.name.clone(),
        product_name: title,
        price: normalize_price(Some(&price_text)),
        currency: CURRENCY_SYMBOL.to_owned(),
        url,
        image_url,
        available: true,
        is_original,
        logo: retailer.logo.clone(),
    }
}

fn absolutize(origin: &str, href: &str) -> String {
    if href.starts_with("http") {
        return href.to_owned();
    }
    Url::parse(origin)
        .and_then(|base| base.join(href))
        .map_or_else(|_| format!("{origin}{href}"), |u| u.to_string())
}

fn unavailable(
    retailer: &RetailerConfig,
    target_name: &str,
    search_url: &str,
    is_original: bool,
) -> ProductResult {
    ProductResult {
        logo: retailer.logo.clone(),
        ..ProductResult::unavailable(&retailer.name, target_name, search_url, is_original)
    }
}

/// `"A, B, or C"` from retailer display names.
fn supported_list(retailers: &[RetailerConfig]) -> String {
    let names: Vec<&str> = retailers.iter().map(|r| r.name.as_str()).collect();
    match names.as_slice() {
        [] => String::new(),
        [only] => (*only).to_owned(),
        [init @ .., last] => format!("{}, or {last}", init.join(", ")),
    }
}

#[cfg(test)]
#[path = "compare_test.rs"]
mod tests;
