//! `compare` command: input validation, running the comparison, rendering.

use std::fmt::Write as _;
use std::time::Duration;

use pricewise_core::{AppConfig, ProductResult};
use pricewise_scraper::{demo_comparison, normalize_url, CompareError, Comparison, ComparisonSource};
use reqwest::Url;

/// Validates raw user input and returns the URL to compare with tracking
/// parameters removed.
///
/// # Errors
///
/// Returns an error when the input is blank or does not parse as a URL.
pub(crate) fn validate_input(input: &str) -> anyhow::Result<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        anyhow::bail!("Please enter a product URL");
    }
    if Url::parse(trimmed).is_err() {
        anyhow::bail!("Please enter a valid URL");
    }
    Ok(normalize_url(trimmed))
}

/// Runs one comparison and prints it.
///
/// Demo mode never touches the network or the cache. A live comparison that
/// finds nothing is reported as an error suggesting demo mode.
///
/// # Errors
///
/// Returns an error for invalid input, unsupported sites, name extraction
/// failure, an empty live result set, or JSON encoding failure.
pub(crate) async fn run_compare(
    config: &AppConfig,
    input: &str,
    demo: bool,
    json: bool,
) -> anyhow::Result<()> {
    let url = validate_input(input)?;

    let comparison = if demo {
        demo_comparison(Duration::from_millis(config.demo_delay_ms)).await
    } else {
        let comparer = super::build_comparer(config)?;
        let comparison = comparer.compare(&url).await?;
        if comparison.results.is_empty() {
            return Err(CompareError::NoResults.into());
        }
        comparison
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&comparison)?);
    } else {
        print!("{}", render_comparison(&comparison));
    }
    Ok(())
}

/// Plain-text table of a comparison. Every offer at the lowest price is
/// tagged `BEST PRICE`.
pub(crate) fn render_comparison(comparison: &Comparison) -> String {
    let mut out = String::new();
    let count = comparison.results.len();

    let _ = writeln!(out, "Searching for: {}", comparison.product_name);
    if comparison.source == ComparisonSource::Demo {
        let _ = writeln!(out, "(demo mode: sample prices)");
    }
    if count == 0 {
        let _ = writeln!(out, "No results found");
        return out;
    }
    let _ = writeln!(
        out,
        "Found {count} available option{}",
        if count == 1 { "" } else { "s" }
    );
    let _ = writeln!(out);

    let cheapest = comparison
        .results
        .iter()
        .filter_map(|r| r.price)
        .min_by(f64::total_cmp);

    let _ = writeln!(out, "{:<20}{:>14}  {:<12}LINK", "RETAILER", "PRICE", "");
    for result in &comparison.results {
        let _ = writeln!(
            out,
            "{:<20}{:>14}  {:<12}{}",
            truncate(&result.website, 19),
            display_price(result),
            tag(result, cheapest),
            result.url
        );
    }
    out
}

fn display_price(result: &ProductResult) -> String {
    result.price.map_or_else(
        || "\u{2014}".to_string(),
        |p| format!("{}{}", result.currency, format_inr(p)),
    )
}

fn tag(result: &ProductResult, cheapest: Option<f64>) -> &'static str {
    let best = matches!((result.price, cheapest), (Some(p), Some(c)) if p.total_cmp(&c).is_eq());
    match (best, result.is_original) {
        (true, _) => "BEST PRICE",
        (false, true) => "your link",
        (false, false) => "",
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        format!("{}...", s.chars().take(max_chars - 3).collect::<String>())
    } else {
        s.to_owned()
    }
}

/// Formats an amount with Indian digit grouping, e.g. `12,34,567.5`.
#[allow(clippy::cast_possible_truncation)] // prices are far below i64::MAX paise
pub(crate) fn format_inr(amount: f64) -> String {
    let paise = (amount * 100.0).round() as i64;
    let sign = if paise < 0 { "-" } else { "" };
    let whole = (paise / 100).unsigned_abs();
    let frac = (paise % 100).unsigned_abs();

    let grouped = group_indian(&whole.to_string());
    if frac == 0 {
        format!("{sign}{grouped}")
    } else {
        let frac = format!("{frac:02}");
        format!("{sign}{grouped}.{}", frac.trim_end_matches('0'))
    }
}

/// Last three digits, then groups of two.
fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_owned();
    }
    let (mut head, tail) = digits.split_at(digits.len() - 3);
    let mut groups = Vec::new();
    while head.len() > 2 {
        let (rest, group) = head.split_at(head.len() - 2);
        groups.push(group);
        head = rest;
    }
    groups.push(head);
    groups.reverse();
    format!("{},{tail}", groups.join(","))
}
