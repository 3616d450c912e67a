//! Demo mode: plausible sample prices without any network access.

use std::time::Duration;

use pricewise_core::{sort_by_price, ProductResult, CURRENCY_SYMBOL};
use rand::Rng;

use crate::compare::{Comparison, ComparisonSource};

/// Product name reported for every demo comparison.
pub const DEMO_PRODUCT_NAME: &str = "Sample Product - Premium Quality";

/// `(display name, domain, logo, price factor)` for each demo seller.
const DEMO_SELLERS: &[(&str, &str, &str, f64)] = &[
    ("Amazon India", "amazon.in", "🛒", 0.85),
    ("Flipkart", "flipkart.com", "🛍️", 0.90),
    ("Myntra", "myntra.com", "👔", 1.05),
    ("Ajio", "ajio.com", "👗", 0.95),
    ("Reliance Digital", "reliancedigital.in", "⚡", 1.10),
    ("Croma", "croma.com", "🔌", 1.00),
    ("Tata Cliq", "tatacliq.com", "🏪", 1.08),
];

/// One offer per demo seller priced around a random base in `[1200, 2000)`,
/// sorted ascending.
pub fn mock_results<R: Rng + ?Sized>(product_name: &str, rng: &mut R) -> Vec<ProductResult> {
    let base: f64 = rng.random_range(1200.0..2000.0);

    let mut results: Vec<ProductResult> = DEMO_SELLERS
        .iter()
        .map(|&(name, domain, logo, factor)| ProductResult {
            website: name.to_owned(),
            product_name: product_name.to_owned(),
            price: Some((base * factor).round()),
            currency: CURRENCY_SYMBOL.to_owned(),
            url: format!("https://www.{domain}/MOCK"),
            image_url: None,
            available: true,
            is_original: false,
            logo: Some(logo.to_owned()),
        })
        .collect();
    sort_by_price(&mut results);
    results
}

/// Waits `delay` to mimic network latency, then returns a demo comparison.
pub async fn demo_comparison(delay: Duration) -> Comparison {
    tokio::time::sleep(delay).await;
    let results = mock_results(DEMO_PRODUCT_NAME, &mut rand::rng());
    tracing::debug!(results = results.len(), "generated demo comparison");
    Comparison {
        product_name: DEMO_PRODUCT_NAME.to_owned(),
        results,
        source: ComparisonSource::Demo,
    }
}
