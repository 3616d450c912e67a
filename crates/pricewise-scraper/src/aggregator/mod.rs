//! Single-query searches that return offers from many sellers at once.
//!
//! The reconciler asks an aggregator first and only scrapes retailers one by
//! one when the aggregator fails or comes back empty.

mod custom_search;
mod shopping;

use async_trait::async_trait;
use pricewise_core::ProductResult;

use crate::error::ScraperError;

pub use custom_search::CustomSearchClient;
pub use shopping::{parse_shopping_results, ShoppingSearch};

#[async_trait]
pub trait AggregatorSearch: Send + Sync {
    /// Short label used in logs, e.g. `"shopping"`.
    fn name(&self) -> &'static str;

    /// Searches for `product_name` and returns priced offers sorted
    /// ascending by price. An empty vector means "nothing found".
    async fn search(&self, product_name: &str) -> Result<Vec<ProductResult>, ScraperError>;
}

/// Display token for a seller name as it appears on an aggregator page.
#[must_use]
pub fn logo_for_seller(seller: &str) -> &'static str {
    const LOGOS: &[(&str, &str)] = &[
        ("amazon", "🛒"),
        ("flipkart", "🛍️"),
        ("myntra", "👔"),
        ("ajio", "👗"),
        ("reliance", "⚡"),
        ("croma", "🔌"),
        ("tata", "🏪"),
        ("snapdeal", "📦"),
        ("shopclues", "🏬"),
    ];

    let lower = seller.to_lowercase();
    LOGOS
        .iter()
        .find(|(needle, _)| lower.contains(needle))
        .map_or("🛒", |(_, logo)| *logo)
}
