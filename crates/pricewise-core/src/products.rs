use serde::{Deserialize, Serialize};

/// Currency symbol attached to every price; all retailers in scope sell in INR.
pub const CURRENCY_SYMBOL: &str = "₹";

/// One retailer's offer for the product being compared.
///
/// Built once per retailer and never mutated afterwards. An unavailable
/// entry never carries a price; use [`ProductResult::unavailable`] to build one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductResult {
    /// Retailer display name, e.g. `"Amazon India"`.
    pub website: String,
    /// Title as extracted, or the searched name when extraction failed.
    pub product_name: String,
    pub price: Option<f64>,
    pub currency: String,
    /// Product link when one was found, otherwise the search-results URL.
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub available: bool,
    /// `true` for the retailer the input URL belonged to.
    #[serde(default)]
    pub is_original: bool,
    /// Display token for the retailer (an emoji in the built-in table).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
}

impl ProductResult {
    /// Builds the "nothing usable here" entry for a retailer.
    #[must_use]
    pub fn unavailable(
        website: &str,
        product_name: &str,
        search_url: &str,
        is_original: bool,
    ) -> Self {
        Self {
            website: website.to_owned(),
            product_name: product_name.to_owned(),
            price: None,
            currency: CURRENCY_SYMBOL.to_owned(),
            url: search_url.to_owned(),
            image_url: None,
            available: false,
            is_original,
            logo: None,
        }
    }

    /// `true` when this entry can appear in a comparison: available and priced.
    #[must_use]
    pub fn is_comparable(&self) -> bool {
        self.available && self.price.is_some()
    }
}

/// Sorts results ascending by price; unpriced entries go last. Stable, so
/// equal prices keep their incoming order.
pub fn sort_by_price(results: &mut [ProductResult]) {
    results.sort_by(|a, b| match (a.price, b.price) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
}

/// A cached comparison, serialized as JSON under a namespaced store key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    /// Milliseconds since the Unix epoch when the entry was written.
    pub timestamp: i64,
    pub product_name: String,
    pub results: Vec<ProductResult>,
}

impl CacheEntry {
    /// Returns `true` once `ttl_ms` or more has elapsed since `timestamp`.
    #[must_use]
    pub fn is_expired(&self, now_ms: i64, ttl_ms: i64) -> bool {
        now_ms.saturating_sub(self.timestamp) >= ttl_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn priced(price: Option<f64>, available: bool) -> ProductResult {
        ProductResult {
            website: "Croma".to_string(),
            product_name: "Widget".to_string(),
            price,
            currency: CURRENCY_SYMBOL.to_string(),
            url: "https://www.croma.com/widget".to_string(),
            image_url: None,
            available,
            is_original: false,
            logo: None,
        }
    }

    #[test]
    fn unavailable_has_no_price() {
        let r = ProductResult::unavailable("Croma", "Widget", "https://www.croma.com/s", true);
        assert!(!r.available);
        assert!(r.price.is_none());
        assert!(r.is_original);
        assert_eq!(r.currency, "₹");
        assert!(!r.is_comparable());
    }

    #[test]
    fn comparable_requires_price_and_availability() {
        assert!(priced(Some(10.0), true).is_comparable());
        assert!(!priced(None, true).is_comparable());
        assert!(!priced(Some(10.0), false).is_comparable());
    }

    #[test]
    fn sort_by_price_ascending_with_unpriced_last() {
        let mut results = vec![
            priced(Some(1050.0), true),
            priced(None, false),
            priced(Some(999.0), true),
            priced(Some(1050.0), true),
        ];
        sort_by_price(&mut results);
        let prices: Vec<Option<f64>> = results.iter().map(|r| r.price).collect();
        assert_eq!(prices, vec![Some(999.0), Some(1050.0), Some(1050.0), None]);
    }

    #[test]
    fn cache_entry_expiry_boundary() {
        let entry = CacheEntry {
            timestamp: 1_000,
            product_name: "Widget".to_string(),
            results: vec![],
        };
        assert!(!entry.is_expired(1_999, 1_000));
        assert!(entry.is_expired(2_000, 1_000));
    }

    #[test]
    fn cache_entry_serializes_camel_case() {
        let entry = CacheEntry {
            timestamp: 42,
            product_name: "Widget".to_string(),
            results: vec![priced(Some(999.0), true)],
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["productName"], "Widget");
        assert_eq!(json["results"][0]["isOriginal"], false);
        assert!(json["results"][0].get("imageUrl").is_none());
    }
}
