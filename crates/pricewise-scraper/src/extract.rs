//! Selector fallback chains over a parsed HTML document.
//!
//! Retailer markup changes often and one retailer may serve several card
//! layouts, so every field is described by an ordered list of CSS selectors.
//! The first selector that parses and yields a non-empty value wins; a
//! selector that fails to parse or matches nothing is skipped.

use scraper::{ElementRef, Html, Selector};

/// Returns the trimmed text of the first element matched by the first
/// productive selector in `selectors`.
///
/// Only the first element a selector matches is read. If that element's
/// text is blank the chain moves on to the next selector instead of
/// returning an empty miss, so a layout with an empty placeholder node
/// still falls back to a later selector.
#[must_use]
pub fn extract_text(document: &Html, selectors: &[String]) -> Option<String> {
    first_match(document, selectors, |element| {
        let text = element.text().collect::<String>();
        let trimmed = text.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_owned())
    })
}

/// Returns the trimmed `attr` value of the first element matched by the
/// first productive selector in `selectors`.
///
/// Like [`extract_text`], a first match without the attribute (or with a
/// blank value) falls through to the next selector.
#[must_use]
pub fn extract_attribute(document: &Html, selectors: &[String], attr: &str) -> Option<String> {
    first_match(document, selectors, |element| {
        element
            .value()
            .attr(attr)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_owned)
    })
}

/// Text of the first element matching a single selector, scoped to `scope`.
pub(crate) fn scoped_text(scope: ElementRef<'_>, selector: &Selector) -> Option<String> {
    scope.select(selector).next().and_then(|element| {
        let text = element.text().collect::<String>();
        let trimmed = text.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_owned())
    })
}

fn first_match<F>(document: &Html, selectors: &[String], mut read: F) -> Option<String>
where
    F: FnMut(ElementRef<'_>) -> Option<String>,
{
    for raw in selectors {
        let selector = match Selector::parse(raw) {
            Ok(selector) => selector,
            Err(e) => {
                tracing::debug!(selector = raw.as_str(), error = %e, "skipping unparsable selector");
                continue;
            }
        };
        if let Some(value) = document.select(&selector).next().and_then(&mut read) {
            return Some(value);
        }
    }
    None
}
