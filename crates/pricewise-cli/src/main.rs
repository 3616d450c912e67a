mod cache;
mod compare;
mod retailers;

use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use pricewise_core::{AggregatorMode, AppConfig, RetailerConfig};
use pricewise_scraper::{
    CustomSearchClient, FileStore, PageFetcher, PriceComparer, RelayFetcher, ResultCache,
    ShoppingSearch,
};
use tracing_subscriber::EnvFilter;

use crate::cache::CacheCommands;

#[derive(Debug, Parser)]
#[command(name = "pricewise")]
#[command(about = "Compare a product's price across Indian online retailers")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Compare prices for a product page URL
    Compare {
        /// Product page URL from a supported retailer
        url: String,
        /// Show generated sample prices instead of scraping
        #[arg(long, conflicts_with = "live")]
        demo: bool,
        /// Scrape even if `PRICEWISE_DEMO_MODE` is set
        #[arg(long)]
        live: bool,
        /// Print the comparison as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the supported retailers
    Retailers,
    /// Maintain the comparison cache
    Cache {
        #[command(subcommand)]
        command: CacheCommands,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = pricewise_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Some(Commands::Compare {
            url,
            demo,
            live,
            json,
        }) => {
            let demo = !live && (demo || config.demo_mode);
            compare::run_compare(&config, &url, demo, json).await?;
        }
        Some(Commands::Retailers) => retailers::run_retailers(&config)?,
        Some(Commands::Cache { command }) => match command {
            CacheCommands::Purge => cache::run_cache_purge(&config),
            CacheCommands::Clear => cache::run_cache_clear(&config),
        },
        None => println!("pricewise: run `pricewise compare <url>` or `pricewise --help`"),
    }

    Ok(())
}

/// Loads the retailer table from `PRICEWISE_RETAILERS_PATH` when set,
/// otherwise the built-in table.
pub(crate) fn load_retailer_table(config: &AppConfig) -> anyhow::Result<Vec<RetailerConfig>> {
    let retailers = match config.retailers_path.as_deref() {
        Some(path) => pricewise_core::load_retailers(path)?,
        None => pricewise_core::default_retailers()?,
    };
    Ok(retailers)
}

pub(crate) fn open_cache(config: &AppConfig) -> ResultCache {
    ResultCache::new(
        Box::new(FileStore::new(&config.cache_dir)),
        Duration::from_secs(config.cache_ttl_secs),
    )
}

/// Wires the relay fetcher, cache, and configured aggregator into a comparer.
///
/// Only live comparisons call this, so aggregator credentials are checked
/// here rather than at startup.
pub(crate) fn build_comparer(config: &AppConfig) -> anyhow::Result<PriceComparer> {
    let fetcher: Arc<dyn PageFetcher> = Arc::new(
        RelayFetcher::new(
            config.relays.clone(),
            config.request_timeout_secs,
            &config.user_agent,
        )
        .map_err(|e| anyhow::anyhow!("failed to build relay fetcher: {e}"))?,
    );

    let comparer = PriceComparer::new(
        Arc::clone(&fetcher),
        load_retailer_table(config)?,
        open_cache(config),
    )
    .with_low_similarity_threshold(config.low_similarity_threshold);

    let comparer = match config.aggregator {
        AggregatorMode::Shopping => comparer.with_aggregator(Arc::new(ShoppingSearch::new(fetcher))),
        AggregatorMode::CustomSearch => {
            let (key, cx) = config.custom_search_credentials()?;
            let client = CustomSearchClient::new(key, cx, config.request_timeout_secs)
                .map_err(|e| anyhow::anyhow!("failed to build custom search client: {e}"))?;
            comparer.with_aggregator(Arc::new(client))
        }
        AggregatorMode::Off => comparer,
    };

    tracing::debug!(
        aggregator = %config.aggregator,
        relays = config.relays.len(),
        retailers = comparer.retailers().len(),
        "comparer ready"
    );
    Ok(comparer)
}
