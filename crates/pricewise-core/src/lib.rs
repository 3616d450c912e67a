pub mod app_config;
pub mod config;
pub mod products;
pub mod retailers;

pub use app_config::{AggregatorMode, AppConfig, DEFAULT_RELAYS};
pub use config::{load_app_config, load_app_config_from_env};
pub use products::{sort_by_price, CacheEntry, ProductResult, CURRENCY_SYMBOL};
pub use retailers::{
    default_retailers, encode_uri_component, load_retailers, RetailerConfig, RetailersFile,
    SelectorSet, SlugRule,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for environment variable {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read retailers file {path}: {source}")]
    RetailersFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse retailers file: {0}")]
    RetailersFileParse(#[from] serde_yaml::Error),

    #[error("retailer config validation failed: {0}")]
    Validation(String),
}
