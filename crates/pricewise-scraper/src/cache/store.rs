//! Key-value stores backing the result cache.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("store quota exceeded ({limit} entries)")]
    QuotaExceeded { limit: usize },

    #[error("corrupt store file {path}: {source}")]
    Corrupt {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Minimal string key-value store.
///
/// Callers above the cache never see these errors; the cache downgrades
/// every failure to a miss.
pub trait KvStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
    /// Every key currently held, in no particular order.
    fn keys(&self) -> Result<Vec<String>, StoreError>;
}

impl<S: KvStore + ?Sized> KvStore for std::sync::Arc<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        (**self).keys()
    }
}

/// Process-local store, optionally capped to simulate a full quota.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
    max_entries: Option<usize>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that refuses new keys once `max_entries` are held.
    #[must_use]
    pub fn with_max_entries(max_entries: usize) -> Self {
        Self {
            entries: Mutex::default(),
            max_entries: Some(max_entries),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, String>>, StoreError> {
        self.entries
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.lock()?;
        if let Some(limit) = self.max_entries {
            if !entries.contains_key(key) && entries.len() >= limit {
                return Err(StoreError::QuotaExceeded { limit });
            }
        }
        entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.lock()?.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.lock()?.keys().cloned().collect())
    }
}

/// One JSON file per key inside a directory.
///
/// Files are named by the SHA-256 hex digest of the key, so any key fits
/// within file-name limits. Each file holds the key next to its value and
/// [`KvStore::keys`] reads it back from there.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

const FILE_SUFFIX: &str = ".json";

#[derive(Serialize, Deserialize)]
struct StoredEntry {
    key: String,
    value: String,
}

impl FileStore {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let digest = Sha256::digest(key.as_bytes());
        self.dir.join(format!("{digest:x}{FILE_SUFFIX}"))
    }

    fn read_entry(path: &Path) -> Result<Option<(String, String)>, StoreError> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let entry: StoredEntry =
            serde_json::from_str(&raw).map_err(|source| StoreError::Corrupt {
                path: path.display().to_string(),
                source,
            })?;
        Ok(Some((entry.key, entry.value)))
    }
}

impl KvStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(Self::read_entry(&self.path_for(key))?
            .filter(|(stored_key, _)| stored_key == key)
            .map(|(_, value)| value))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path_for(key);
        let body = serde_json::to_string(&StoredEntry {
            key: key.to_owned(),
            value: value.to_owned(),
        })
        .map_err(|source| StoreError::Corrupt {
            path: path.display().to_string(),
            source,
        })?;
        std::fs::create_dir_all(&self.dir)?;
        // Write-then-rename so a reader never sees a half-written entry.
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, body)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        match std::fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut keys = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if !path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.ends_with(FILE_SUFFIX))
            {
                continue;
            }
            match Self::read_entry(&path) {
                Ok(Some((key, _))) => keys.push(key),
                Ok(None) => {}
                Err(e) => tracing::debug!(error = %e, "skipping unreadable store file"),
            }
        }
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "pricewise-store-{name}-{}",
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn memory_store_round_trip_and_remove() {
        let store = MemoryStore::new();
        store.set("a", "1").unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some("1"));
        store.remove("a").unwrap();
        assert!(store.get("a").unwrap().is_none());
    }

    #[test]
    fn memory_store_quota_rejects_new_keys_only() {
        let store = MemoryStore::with_max_entries(1);
        store.set("a", "1").unwrap();
        store.set("a", "2").unwrap();
        let err = store.set("b", "3").unwrap_err();
        assert!(matches!(err, StoreError::QuotaExceeded { limit: 1 }));
    }

    #[test]
    fn file_store_round_trip() {
        let dir = temp_dir("round-trip");
        let store = FileStore::new(&dir);
        store.set("price_compare_abc", "{\"x\":1}").unwrap();
        assert_eq!(
            store.get("price_compare_abc").unwrap().as_deref(),
            Some("{\"x\":1}")
        );
        assert_eq!(store.keys().unwrap(), vec!["price_compare_abc".to_string()]);
        store.remove("price_compare_abc").unwrap();
        assert!(store.get("price_compare_abc").unwrap().is_none());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn file_store_missing_dir_is_empty() {
        let store = FileStore::new(temp_dir("missing"));
        assert!(store.keys().unwrap().is_empty());
        assert!(store.get("anything").unwrap().is_none());
        store.remove("anything").unwrap();
    }

    #[test]
    fn file_store_accepts_path_like_keys() {
        let dir = temp_dir("path-like");
        let store = FileStore::new(&dir);
        store.set("../escape", "x").unwrap();
        assert_eq!(store.get("../escape").unwrap().as_deref(), Some("x"));
        assert!(!dir.parent().unwrap().join("escape.json").exists());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn file_store_handles_keys_longer_than_a_file_name() {
        let dir = temp_dir("long-key");
        let store = FileStore::new(&dir);
        let key = format!("price_compare_{}", "a".repeat(400));

        store.set(&key, "v").unwrap();

        assert_eq!(store.get(&key).unwrap().as_deref(), Some("v"));
        assert_eq!(store.keys().unwrap(), vec![key.clone()]);
        let names: Vec<_> = std::fs::read_dir(&dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names.len(), 1);
        assert!(names[0].len() < 100, "file name not bounded: {}", names[0]);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn file_store_skips_foreign_files_in_keys() {
        let dir = temp_dir("foreign");
        let store = FileStore::new(&dir);
        store.set("price_compare_x", "1").unwrap();
        std::fs::write(dir.join("notes.txt"), "hello").unwrap();
        std::fs::write(dir.join("garbage.json"), "{ not json").unwrap();

        assert_eq!(store.keys().unwrap(), vec!["price_compare_x".to_string()]);
        let _ = std::fs::remove_dir_all(&dir);
    }
}
