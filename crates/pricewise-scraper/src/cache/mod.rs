//! Time-limited cache of finished comparisons.
//!
//! Entries live in a [`KvStore`] under `price_compare_` + URL-safe base64 of
//! the input URL, so keys written by anything else are never touched. Keys
//! grow with the URL; [`FileStore`] hashes them into bounded file names. Every
//! store fault is logged and treated as a miss; nothing here returns an error.

mod clock;
mod store;

use std::sync::Arc;
use std::time::Duration;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use pricewise_core::{CacheEntry, ProductResult};

pub use clock::{Clock, SystemClock};
pub use store::{FileStore, KvStore, MemoryStore, StoreError};

#[cfg(test)]
pub(crate) use clock::ManualClock;

/// Namespace prefix for every key this cache writes.
pub const KEY_PREFIX: &str = "price_compare_";

/// Default time-to-live: 30 minutes.
pub const DEFAULT_TTL: Duration = Duration::from_secs(30 * 60);

pub struct ResultCache {
    store: Box<dyn KvStore>,
    clock: Arc<dyn Clock>,
    ttl_ms: i64,
}

impl ResultCache {
    #[must_use]
    pub fn new(store: Box<dyn KvStore>, ttl: Duration) -> Self {
        Self::with_clock(store, ttl, Arc::new(SystemClock))
    }

    #[must_use]
    pub fn with_clock(store: Box<dyn KvStore>, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
        Self {
            store,
            clock,
            ttl_ms,
        }
    }

    /// Store key for a comparison input URL.
    #[must_use]
    pub fn key_for(url: &str) -> String {
        format!("{KEY_PREFIX}{}", URL_SAFE_NO_PAD.encode(url))
    }

    /// Returns the live entry for `url`, removing it if it has expired or no
    /// longer deserializes.
    pub fn get(&self, url: &str) -> Option<CacheEntry> {
        let key = Self::key_for(url);
        let raw = match self.store.get(&key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(error = %e, "cache read failed; treating as miss");
                return None;
            }
        };

        match serde_json::from_str::<CacheEntry>(&raw) {
            Ok(entry) if !entry.is_expired(self.clock.now_ms(), self.ttl_ms) => Some(entry),
            Ok(_) => {
                tracing::debug!(url, "cache entry expired");
                self.remove_quietly(&key);
                None
            }
            Err(e) => {
                tracing::warn!(url, error = %e, "discarding corrupt cache entry");
                self.remove_quietly(&key);
                None
            }
        }
    }

    /// Stores `results` for `url`, stamped with the current time. Replaces
    /// any existing entry wholesale.
    pub fn set(&self, url: &str, product_name: &str, results: &[ProductResult]) {
        let entry = CacheEntry {
            timestamp: self.clock.now_ms(),
            product_name: product_name.to_owned(),
            results: results.to_vec(),
        };
        let raw = match serde_json::to_string(&entry) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(error = %e, "failed to serialize cache entry");
                return;
            }
        };
        if let Err(e) = self.store.set(&Self::key_for(url), &raw) {
            tracing::warn!(url, error = %e, "cache write failed; continuing without cache");
        }
    }

    /// Removes every namespaced entry that is expired or unreadable.
    /// Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now_ms();
        self.remove_where(|raw| {
            serde_json::from_str::<CacheEntry>(raw)
                .map_or(true, |entry| entry.is_expired(now, self.ttl_ms))
        })
    }

    /// Removes every namespaced entry. Returns how many were removed.
    pub fn clear(&self) -> usize {
        self.remove_where(|_| true)
    }

    fn remove_where<F>(&self, mut doomed: F) -> usize
    where
        F: FnMut(&str) -> bool,
    {
        let keys = match self.store.keys() {
            Ok(keys) => keys,
            Err(e) => {
                tracing::warn!(error = %e, "cache scan failed");
                return 0;
            }
        };

        let mut removed = 0;
        for key in keys.iter().filter(|k| k.starts_with(KEY_PREFIX)) {
            let remove = match self.store.get(key) {
                Ok(Some(raw)) => doomed(&raw),
                Ok(None) => false,
                Err(e) => {
                    tracing::warn!(key = key.as_str(), error = %e, "cache read failed during scan");
                    false
                }
            };
            if remove && self.remove_quietly(key) {
                removed += 1;
            }
        }
        if removed > 0 {
            tracing::debug!(removed, "removed cache entries");
        }
        removed
    }

    fn remove_quietly(&self, key: &str) -> bool {
        match self.store.remove(key) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(key, error = %e, "cache remove failed");
                false
            }
        }
    }
}
