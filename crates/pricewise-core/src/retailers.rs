use std::collections::HashSet;
use std::path::Path;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Built-in retailer table, compiled into the binary.
const DEFAULT_RETAILERS_YAML: &str = include_str!("../../../config/retailers.yaml");

/// Characters left unescaped by [`encode_uri_component`]: alphanumerics plus
/// `- _ . ! ~ * ' ( )`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Percent-encodes `s` for use as a single URL component (query value or
/// path segment). Spaces become `%20`, never `+`.
#[must_use]
pub fn encode_uri_component(s: &str) -> String {
    utf8_percent_encode(s, URI_COMPONENT).to_string()
}

/// How a product name is recovered from a retailer's product-page path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SlugRule {
    /// The path segment immediately before `marker` (e.g. `/name/dp/ASIN`).
    BeforeMarker { marker: String },
    /// The raw `/`-split path segment at `index`; index 0 is the empty
    /// segment before the leading slash.
    Segment { index: usize },
    /// The first non-empty path segment.
    #[default]
    FirstSegment,
}

/// Ordered selector fallback chains, one per extracted field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectorSet {
    pub title: Vec<String>,
    pub price: Vec<String>,
    #[serde(default)]
    pub link: Vec<String>,
    #[serde(default)]
    pub image: Vec<String>,
}

/// Static description of one retailer. Never mutated at runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetailerConfig {
    /// Stable identifier, e.g. `"amazon"`.
    pub id: String,
    /// Display name, e.g. `"Amazon India"`.
    pub name: String,
    /// Bare domain matched against input URLs, e.g. `"amazon.in"`.
    pub domain: String,
    /// Search-results URL template containing `{query}`.
    pub search_url: String,
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(default)]
    pub slug: SlugRule,
    pub selectors: SelectorSet,
}

impl RetailerConfig {
    /// Builds the search-results URL for `query`.
    #[must_use]
    pub fn search_url_for(&self, query: &str) -> String {
        self.search_url
            .replace("{query}", &encode_uri_component(query))
    }

    /// Origin used to absolutize relative product links, e.g.
    /// `"https://www.amazon.in"`.
    #[must_use]
    pub fn origin(&self) -> String {
        format!("https://www.{}", self.domain)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RetailersFile {
    pub retailers: Vec<RetailerConfig>,
}

/// Returns the built-in retailer table.
///
/// # Errors
///
/// Returns `ConfigError` only if the embedded table is malformed, which the
/// crate's own tests guard against.
pub fn default_retailers() -> Result<Vec<RetailerConfig>, ConfigError> {
    parse_retailers(DEFAULT_RETAILERS_YAML)
}

/// Load and validate a retailer table from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_retailers(path: &Path) -> Result<Vec<RetailerConfig>, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::RetailersFileIo {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_retailers(&content)
}

fn parse_retailers(content: &str) -> Result<Vec<RetailerConfig>, ConfigError> {
    let file: RetailersFile = serde_yaml::from_str(content)?;
    validate_retailers(&file)?;
    Ok(file.retailers)
}

fn validate_retailers(file: &RetailersFile) -> Result<(), ConfigError> {
    if file.retailers.is_empty() {
        return Err(ConfigError::Validation(
            "at least one retailer must be configured".to_string(),
        ));
    }

    let mut seen_ids = HashSet::new();
    let mut seen_names = HashSet::new();

    for retailer in &file.retailers {
        if retailer.id.trim().is_empty() || retailer.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "retailer id and name must be non-empty".to_string(),
            ));
        }
        if retailer.domain.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "retailer '{}' has an empty domain",
                retailer.id
            )));
        }
        if !retailer.search_url.contains("{query}") {
            return Err(ConfigError::Validation(format!(
                "retailer '{}' search_url must contain {{query}}",
                retailer.id
            )));
        }
        if retailer.selectors.title.is_empty() || retailer.selectors.price.is_empty() {
            return Err(ConfigError::Validation(format!(
                "retailer '{}' needs at least one title and one price selector",
                retailer.id
            )));
        }
        if !seen_ids.insert(retailer.id.to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate retailer id: '{}'",
                retailer.id
            )));
        }
        if !seen_names.insert(retailer.name.to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate retailer name: '{}'",
                retailer.name
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "retailers_test.rs"]
mod tests;
