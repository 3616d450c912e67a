use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use pricewise_core::{encode_uri_component, sort_by_price, ProductResult, CURRENCY_SYMBOL};
use reqwest::Url;
use scraper::{Html, Selector};

use super::{logo_for_seller, AggregatorSearch};
use crate::error::ScraperError;
use crate::extract::scoped_text;
use crate::fetch::PageFetcher;
use crate::normalize::parse_listing_price;

const SHOPPING_ORIGIN: &str = "https://www.google.com";

static CARD_SEL: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(".sh-dgr__content, .sh-dgr__grid-result, [data-sh-sr]")
        .expect("valid card selector")
});
static PRICE_SEL: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(
        r#".a8Pemb, .T14wmb, .FKWzIb, span[aria-label*="₹"], span[aria-label*="rupee"]"#,
    )
    .expect("valid price selector")
});
static SELLER_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".aULzUe, .IuHnof, .shntl").expect("valid seller selector"));
static LINK_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("valid link selector"));
static IMAGE_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("img").expect("valid image selector"));

/// Scrapes the shopping results page through the page fetcher.
pub struct ShoppingSearch {
    fetcher: Arc<dyn PageFetcher>,
}

impl ShoppingSearch {
    #[must_use]
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self { fetcher }
    }

    #[must_use]
    pub fn search_url(product_name: &str) -> String {
        let query = encode_uri_component(&format!("{product_name} price in India"));
        format!("{SHOPPING_ORIGIN}/search?q={query}&tbm=shop")
    }
}

#[async_trait]
impl AggregatorSearch for ShoppingSearch {
    fn name(&self) -> &'static str {
        "shopping"
    }

    async fn search(&self, product_name: &str) -> Result<Vec<ProductResult>, ScraperError> {
        let html = self.fetcher.fetch(&Self::search_url(product_name)).await?;
        let results = parse_shopping_results(&html, product_name);
        tracing::debug!(product_name, offers = results.len(), "parsed shopping results");
        Ok(results)
    }
}

/// Extracts priced offers from a shopping results page.
///
/// Cards without a positive price are dropped. Every offer carries
/// `product_name` as its title since card titles are too noisy to show.
#[must_use]
pub fn parse_shopping_results(html: &str, product_name: &str) -> Vec<ProductResult> {
    let document = Html::parse_document(html);
    let base = Url::parse(SHOPPING_ORIGIN).ok();

    let mut results: Vec<ProductResult> = document
        .select(&CARD_SEL)
        .enumerate()
        .filter_map(|(index, card)| {
            let price_el = card.select(&PRICE_SEL).next()?;
            let text = price_el.text().collect::<String>();
            let price_text = if text.trim().is_empty() {
                price_el.value().attr("aria-label").unwrap_or_default().to_owned()
            } else {
                text
            };
            let price = parse_listing_price(&price_text).filter(|p| *p > 0.0)?;

            let seller = scoped_text(card, &SELLER_SEL)
                .unwrap_or_else(|| format!("Seller {}", index + 1));
            let href = card
                .select(&LINK_SEL)
                .next()
                .and_then(|a| a.value().attr("href"))
                .unwrap_or_default();
            let image_url = card.select(&IMAGE_SEL).next().and_then(|img| {
                img.value()
                    .attr("src")
                    .or_else(|| img.value().attr("data-src"))
                    .filter(|src| !src.is_empty())
                    .map(str::to_owned)
            });

            Some(ProductResult {
                logo: Some(logo_for_seller(&seller).to_owned()),
                website: seller,
                product_name: product_name.to_owned(),
                price: Some(price),
                currency: CURRENCY_SYMBOL.to_owned(),
                url: absolutize(base.as_ref(), href),
                image_url,
                available: true,
                is_original: false,
            })
        })
        .collect();

    sort_by_price(&mut results);
    results
}

fn absolutize(base: Option<&Url>, href: &str) -> String {
    if href.starts_with("http") {
        return href.to_owned();
    }
    base.and_then(|b| b.join(href).ok())
        .map_or_else(|| format!("{SHOPPING_ORIGIN}{href}"), |u| u.to_string())
}
