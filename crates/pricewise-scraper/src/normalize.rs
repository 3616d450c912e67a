//! Price text normalization and title similarity.

use std::sync::LazyLock;

use regex::Regex;

static PRICE_NOISE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[₹,\s]").expect("valid price noise regex"));
static FIRST_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+\.?\d*").expect("valid number regex"));
static LEADING_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+(?:\.\d*)?").expect("valid leading number regex"));
static RUPEE_AMOUNT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:₹|Rs\.?|INR)\s*(\d[\d,]*(?:\.\d+)?)").expect("valid rupee amount regex")
});

/// Parses a price from retailer price text such as `"₹1,299.00"`.
///
/// Strips the rupee sign, commas, and whitespace, then takes the first
/// integer-or-decimal run. Returns `None` when no digits remain.
#[must_use]
pub fn normalize_price(text: Option<&str>) -> Option<f64> {
    let text = text?;
    let cleaned = PRICE_NOISE_RE.replace_all(text, "");
    FIRST_NUMBER_RE
        .find(&cleaned)
        .and_then(|m| m.as_str().parse::<f64>().ok())
}

/// Parses an aggregator listing price and rounds it to whole rupees.
///
/// Unlike [`normalize_price`] the number must lead the cleaned text; labels
/// such as `"Current price: ₹1,299"` are not scanned for digits.
#[must_use]
pub fn parse_listing_price(text: &str) -> Option<f64> {
    let cleaned = PRICE_NOISE_RE.replace_all(text, "");
    LEADING_NUMBER_RE
        .find(&cleaned)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .map(f64::round)
}

/// Finds the first rupee-denominated amount in free text such as a search
/// snippet, rounded to whole rupees.
#[must_use]
pub fn find_rupee_amount(text: &str) -> Option<f64> {
    let caps = RUPEE_AMOUNT_RE.captures(text)?;
    let digits = caps.get(1)?.as_str().replace(',', "");
    digits.parse::<f64>().ok().map(f64::round)
}

/// Coarse title similarity in `[0, 1]`.
///
/// The fraction of `target`'s whitespace-separated words that are longer
/// than two characters and occur as a substring of `candidate`, compared
/// case-insensitively. Short words count toward the denominator only.
#[must_use]
#[allow(clippy::cast_precision_loss)] // word counts are tiny
pub fn similarity(target: &str, candidate: &str) -> f64 {
    let target = target.to_lowercase();
    let candidate = candidate.to_lowercase();

    let words: Vec<&str> = target.split_whitespace().collect();
    let matches = words
        .iter()
        .filter(|w| w.chars().count() > 2 && candidate.contains(*w))
        .count();

    matches as f64 / words.len().max(1) as f64
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
