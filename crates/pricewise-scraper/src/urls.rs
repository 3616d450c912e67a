//! Retailer detection and product-name recovery from URLs and page titles.

use std::sync::LazyLock;

use percent_encoding::percent_decode_str;
use pricewise_core::{RetailerConfig, SlugRule};
use regex::Regex;

/// Query parameters that only carry attribution and never identify a product.
const TRACKING_PARAMS: &[&str] = &[
    "ref",
    "ref_",
    "tag",
    "utm_source",
    "utm_medium",
    "utm_campaign",
    "pid",
    "affid",
    "affExtParam",
];

/// Title trim rules, applied in order. Each targets a different kind of
/// storefront suffix, so a rule never undoes another's work.
static TITLE_NOISE_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)\s*\|.*$",
        r"(?i)\s*-\s*Buy.*$",
        r"(?i)\s*-\s*Online.*$",
        r"(?i)\s*:\s*Amazon\.in.*$",
        r"(?i)\s*:\s*Buy.*$",
        r"\s*\(.*\)$",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid title noise regex"))
    .collect()
});

/// Returns the retailer whose domain occurs in `url` (case-insensitive),
/// or `None` for unsupported sites. The first match in table order wins.
#[must_use]
pub fn detect_retailer<'a>(url: &str, retailers: &'a [RetailerConfig]) -> Option<&'a RetailerConfig> {
    let lower = url.to_lowercase();
    retailers
        .iter()
        .find(|r| lower.contains(&r.domain.to_lowercase()))
}

/// Recovers a human-readable product name from a product-page URL.
///
/// The path segment picked by `rule` has hyphens turned into spaces and is
/// percent-decoded. Returns an empty string when the URL does not parse,
/// the rule finds no segment, or the segment holds a malformed escape
/// (`%` not followed by two hex digits) or decodes to invalid UTF-8.
#[must_use]
pub fn extract_name_from_url(url: &str, rule: &SlugRule) -> String {
    let Ok(parsed) = reqwest::Url::parse(url) else {
        return String::new();
    };
    let segments: Vec<&str> = parsed.path().split('/').collect();

    let slug = match rule {
        SlugRule::BeforeMarker { marker } => segments
            .iter()
            .position(|s| *s == marker.as_str())
            .filter(|&idx| idx > 0)
            .map_or("", |idx| segments[idx - 1]),
        SlugRule::Segment { index } => segments.get(*index).copied().unwrap_or(""),
        SlugRule::FirstSegment => segments
            .iter()
            .find(|s| !s.is_empty())
            .copied()
            .unwrap_or(""),
    };

    if has_malformed_escape(slug) {
        return String::new();
    }
    let spaced = slug.replace('-', " ");
    percent_decode_str(&spaced)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .unwrap_or_default()
}

fn has_malformed_escape(segment: &str) -> bool {
    let bytes = segment.as_bytes();
    bytes.iter().enumerate().any(|(i, &b)| {
        b == b'%'
            && !bytes
                .get(i + 1..i + 3)
                .is_some_and(|pair| pair.iter().all(u8::is_ascii_hexdigit))
    })
}

/// Strips storefront noise from a page title or heading.
///
/// Whitespace runs are collapsed first so multi-line heading text behaves
/// like a single-line title.
#[must_use]
pub fn clean_title(raw: &str) -> String {
    let mut cleaned = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    for re in TITLE_NOISE_RES.iter() {
        cleaned = re.replace(&cleaned, "").into_owned();
    }
    cleaned.trim().to_owned()
}

/// Removes tracking query parameters from `url`.
///
/// Unparsable input and URLs without tracking parameters are returned
/// unchanged.
#[must_use]
pub fn normalize_url(url: &str) -> String {
    let Ok(mut parsed) = reqwest::Url::parse(url) else {
        return url.to_owned();
    };

    let pairs: Vec<(String, String)> = parsed
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    if !pairs
        .iter()
        .any(|(k, _)| TRACKING_PARAMS.contains(&k.as_str()))
    {
        return url.to_owned();
    }

    let kept: Vec<&(String, String)> = pairs
        .iter()
        .filter(|(k, _)| !TRACKING_PARAMS.contains(&k.as_str()))
        .collect();
    if kept.is_empty() {
        parsed.set_query(None);
    } else {
        parsed
            .query_pairs_mut()
            .clear()
            .extend_pairs(kept.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    }
    parsed.to_string()
}

#[cfg(test)]
#[path = "urls_test.rs"]
mod tests;
