//! In-memory TTL cache for expensive async lookups
//!
//! Entries expire `ttl` after they were stored; reads never refresh them.
//! Concurrent misses on the same key each run their loader and the last
//! one to finish wins.
//!
//! # Example
//!
//! ```rust,ignore
//! use iweekly_core::cache::{CacheConfig, TtlCache};
//!
//! let cache = TtlCache::new(CacheConfig::default());
//! let brands = cache
//!     .get_with("brands", None, || client.common().get_brands())
//!     .await?;
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tracing::debug;

/// Cache configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// TTL used when a call does not pass one
    pub default_ttl: Duration,
    /// Entry limit; the oldest entry is evicted first (`None` = unbounded)
    pub max_entries: Option<usize>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl: Duration::from_secs(5 * 60),
            max_entries: None,
        }
    }
}

#[derive(Debug, Clone)]
struct Entry<V> {
    value: V,
    stored_at: Instant,
    ttl: Duration,
}

impl<V> Entry<V> {
    fn is_fresh(&self, now: Instant) -> bool {
        now.duration_since(self.stored_at) < self.ttl
    }
}

/// Keyed cache of cloneable values with per-entry expiry
#[derive(Debug)]
pub struct TtlCache<V> {
    config: CacheConfig,
    entries: Mutex<HashMap<String, Entry<V>>>,
}

impl<V: Clone> Default for TtlCache<V> {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

impl<V: Clone> TtlCache<V> {
    /// Create an empty cache
    #[must_use]
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Cache configuration
    #[must_use]
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Return the fresh cached value for `key`, or run `load` and store its result
    ///
    /// Errors from `load` are returned as-is and leave the cache untouched.
    pub async fn get_with<E, F, Fut>(
        &self,
        key: &str,
        ttl: Option<Duration>,
        load: F,
    ) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(key) {
            debug!(key, "Cache hit");
            return Ok(value);
        }

        debug!(key, "Cache miss");
        let value = load().await?;
        self.insert_with_ttl(key, value.clone(), ttl.unwrap_or(self.config.default_ttl));
        Ok(value)
    }

    /// Fresh value for `key`, if any
    #[must_use]
    pub fn get(&self, key: &str) -> Option<V> {
        let now = Instant::now();
        self.lock()
            .get(key)
            .filter(|entry| entry.is_fresh(now))
            .map(|entry| entry.value.clone())
    }

    /// Store a value with the default TTL
    pub fn insert(&self, key: impl Into<String>, value: V) {
        self.insert_with_ttl(key, value, self.config.default_ttl);
    }

    /// Store a value with an explicit TTL
    pub fn insert_with_ttl(&self, key: impl Into<String>, value: V, ttl: Duration) {
        let key = key.into();
        let mut entries = self.lock();

        if let Some(limit) = self.config.max_entries {
            while !entries.contains_key(&key) && entries.len() >= limit.max(1) {
                let Some(oldest) = entries
                    .iter()
                    .min_by_key(|(_, entry)| entry.stored_at)
                    .map(|(k, _)| k.clone())
                else {
                    break;
                };
                debug!(key = %oldest, "Evicting oldest cache entry");
                entries.remove(&oldest);
            }
        }

        entries.insert(
            key,
            Entry {
                value,
                stored_at: Instant::now(),
                ttl,
            },
        );
    }

    /// Remove one entry; returns whether it existed
    pub fn invalidate(&self, key: &str) -> bool {
        self.lock().remove(key).is_some()
    }

    /// Drop expired entries and return how many were removed
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|_, entry| entry.is_fresh(now));
        before - entries.len()
    }

    /// Remove everything
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Stored entries, expired ones included until purged
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether nothing is stored
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Entry<V>>> {
        // entries stay consistent even if a holder panicked
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
