//! In-memory response cache for forecast lookups.
//!
//! Entries are keyed by `(city, country_code)`, expire a fixed time after
//! they are written and are evicted least-recently-used once the cache is
//! full. Expiry is checked lazily on read.
//!
//! Concurrent misses for the same key each run their own compute; the last
//! write wins.

use crate::config::CacheConfig;
use crate::models::ForecastResult;
use lru::LruCache;
use serde::Serialize;
use std::future::Future;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Cache key for a forecast lookup
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct CacheKey {
    pub city: String,
    pub country_code: Option<String>,
}

impl CacheKey {
    /// Blank country codes are treated as absent
    #[must_use]
    pub fn new(city: &str, country_code: Option<&str>) -> Self {
        Self {
            city: city.to_string(),
            country_code: country_code
                .filter(|code| !code.trim().is_empty())
                .map(str::to_string),
        }
    }
}

struct CacheEntry {
    value: ForecastResult,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

#[derive(Default)]
struct CacheCounters {
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
    expired: AtomicU64,
}

/// Snapshot of cache activity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub expired: u64,
    pub entries: usize,
    pub capacity: usize,
}

impl CacheStats {
    /// Hit rate as a percentage (0-100)
    #[must_use]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}

/// Bounded, expiring forecast cache safe to share between requests
pub struct ForecastCache {
    entries: Mutex<LruCache<CacheKey, CacheEntry>>,
    ttl: Duration,
    counters: CacheCounters,
}

impl ForecastCache {
    /// Create a cache holding at most `max_entries` results for `ttl` each
    #[must_use]
    pub fn new(max_entries: usize, ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(max_entries).unwrap_or(NonZeroUsize::MIN);

        tracing::info!(
            "ForecastCache initialized: max_entries={}, ttl_secs={}",
            capacity,
            ttl.as_secs()
        );

        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            ttl,
            counters: CacheCounters::default(),
        }
    }

    #[must_use]
    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.max_entries, config.ttl())
    }

    /// Return a fresh cached value, dropping it if it has expired
    #[tracing::instrument(name = "query_cache", level = "debug", skip(self))]
    pub async fn get(&self, key: &CacheKey) -> Option<ForecastResult> {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();

        let expired = match entries.get(key) {
            Some(entry) if !entry.is_expired(now) => {
                tracing::debug!("Key found and still fresh");
                self.counters.hits.fetch_add(1, Ordering::Relaxed);
                return Some(entry.value.clone());
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            tracing::debug!("Key found but expired");
            entries.pop(key);
            self.counters.expired.fetch_add(1, Ordering::Relaxed);
        } else {
            tracing::debug!("Key not found");
        }
        self.counters.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    /// Store a value, evicting the least recently used entry when full
    #[tracing::instrument(name = "put_cache", level = "debug", skip(self, value))]
    pub async fn insert(&self, key: CacheKey, value: ForecastResult) {
        let entry = CacheEntry {
            value,
            expires_at: Instant::now() + self.ttl,
        };

        let mut entries = self.entries.lock().await;
        if let Some((evicted, _)) = entries.push(key.clone(), entry) {
            if evicted != key {
                tracing::debug!("Evicted {:?} to make room", evicted);
                self.counters.evictions.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// Return the cached result for the location or compute and store it.
    ///
    /// The lock is not held while `compute` runs.
    pub async fn get_or_compute<F, Fut>(
        &self,
        city: &str,
        country_code: Option<&str>,
        compute: F,
    ) -> ForecastResult
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = ForecastResult>,
    {
        let key = CacheKey::new(city, country_code);
        if let Some(cached) = self.get(&key).await {
            return cached;
        }

        let value = compute().await;
        self.insert(key, value.clone()).await;
        value
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn contains(&self, key: &CacheKey) -> bool {
        self.entries.lock().await.contains(key)
    }

    pub async fn stats(&self) -> CacheStats {
        let entries = self.entries.lock().await;
        CacheStats {
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            evictions: self.counters.evictions.load(Ordering::Relaxed),
            expired: self.counters.expired.load(Ordering::Relaxed),
            entries: entries.len(),
            capacity: entries.cap().get(),
        }
    }
}
