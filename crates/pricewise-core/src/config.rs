use std::path::PathBuf;

use crate::app_config::{AggregatorMode, AppConfig, DEFAULT_RELAYS};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is invalid. Aggregator credentials are
/// checked later by [`AppConfig::custom_search_credentials`].
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is invalid. Aggregator credentials are
/// checked later by [`AppConfig::custom_search_credentials`].
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_positive_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        let value = raw.parse::<u64>().map_err(|e| invalid(var, e.to_string()))?;
        if value == 0 {
            return Err(invalid(var, "must be greater than zero".to_string()));
        }
        Ok(value)
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| invalid(var, e.to_string()))
    };

    let log_level = or_default("PRICEWISE_LOG_LEVEL", "warn");
    let request_timeout_secs = parse_positive_u64("PRICEWISE_REQUEST_TIMEOUT_SECS", "15")?;
    let user_agent = or_default("PRICEWISE_USER_AGENT", "pricewise/0.1 (price-comparison)");

    let relays = match lookup("PRICEWISE_RELAYS") {
        Ok(raw) => {
            let relays = parse_relays(&raw);
            if relays.is_empty() {
                return Err(invalid(
                    "PRICEWISE_RELAYS",
                    "at least one relay base URL is required".to_string(),
                ));
            }
            relays
        }
        Err(_) => DEFAULT_RELAYS.iter().map(|r| (*r).to_string()).collect(),
    };

    let cache_dir = lookup("PRICEWISE_CACHE_DIR").map_or_else(
        |_| {
            dirs::cache_dir().map_or_else(
                || PathBuf::from("./.pricewise-cache"),
                |dir| dir.join("pricewise"),
            )
        },
        PathBuf::from,
    );
    let cache_ttl_secs = parse_positive_u64("PRICEWISE_CACHE_TTL_SECS", "1800")?;
    let retailers_path = lookup("PRICEWISE_RETAILERS_PATH").ok().map(PathBuf::from);

    let demo_mode = parse_bool(&or_default("PRICEWISE_DEMO_MODE", "false"))
        .ok_or_else(|| invalid("PRICEWISE_DEMO_MODE", "expected true or false".to_string()))?;
    let demo_delay_ms = parse_u64("PRICEWISE_DEMO_DELAY_MS", "1000")?;

    let aggregator = parse_aggregator_mode(&or_default("PRICEWISE_AGGREGATOR", "shopping"))?;
    let google_api_key = lookup("PRICEWISE_GOOGLE_API_KEY").ok();
    let google_cx = lookup("PRICEWISE_GOOGLE_CX").ok();

    let raw_threshold = or_default("PRICEWISE_LOW_SIMILARITY_THRESHOLD", "0.3");
    let low_similarity_threshold = raw_threshold
        .parse::<f64>()
        .map_err(|e| invalid("PRICEWISE_LOW_SIMILARITY_THRESHOLD", e.to_string()))?;
    if !(0.0..=1.0).contains(&low_similarity_threshold) {
        return Err(invalid(
            "PRICEWISE_LOW_SIMILARITY_THRESHOLD",
            format!("{raw_threshold} is outside 0.0..=1.0"),
        ));
    }

    Ok(AppConfig {
        log_level,
        request_timeout_secs,
        user_agent,
        relays,
        cache_dir,
        cache_ttl_secs,
        retailers_path,
        demo_mode,
        demo_delay_ms,
        aggregator,
        google_api_key,
        google_cx,
        low_similarity_threshold,
    })
}

/// Split a comma-separated relay list, dropping blank entries.
fn parse_relays(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(str::to_owned)
        .collect()
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parse a string into an `AggregatorMode` variant.
///
/// Returns `ConfigError::InvalidEnvVar` for unrecognised values so a typo
/// doesn't silently change which search path runs.
fn parse_aggregator_mode(s: &str) -> Result<AggregatorMode, ConfigError> {
    match s {
        "shopping" => Ok(AggregatorMode::Shopping),
        "custom-search" => Ok(AggregatorMode::CustomSearch),
        "off" => Ok(AggregatorMode::Off),
        other => Err(ConfigError::InvalidEnvVar {
            var: "PRICEWISE_AGGREGATOR".to_string(),
            reason: format!("unknown aggregator '{other}'; expected shopping, custom-search, or off"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
