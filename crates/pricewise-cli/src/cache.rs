use clap::Subcommand;
use pricewise_core::AppConfig;

/// Sub-commands available under `cache`.
#[derive(Debug, Subcommand)]
pub enum CacheCommands {
    /// Remove expired or unreadable comparison entries
    Purge,
    /// Remove every cached comparison
    Clear,
}

pub(crate) fn run_cache_purge(config: &AppConfig) {
    let removed = super::open_cache(config).purge_expired();
    println!(
        "removed {removed} expired cache entr{} from {}",
        if removed == 1 { "y" } else { "ies" },
        config.cache_dir.display()
    );
}

pub(crate) fn run_cache_clear(config: &AppConfig) {
    let removed = super::open_cache(config).clear();
    println!(
        "removed {removed} cache entr{} from {}",
        if removed == 1 { "y" } else { "ies" },
        config.cache_dir.display()
    );
}
