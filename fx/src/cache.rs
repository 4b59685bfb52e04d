//! Exchange rate caching with TTL support.

use cambio_common::{time, RatePairKey, Timestamp};
use chrono::Duration;
use dashmap::DashMap;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::debug;

/// Cached rate entry.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedRate {
    /// The rate value.
    pub value: Decimal,
    /// Instant from which the entry is dead.
    pub expires_at: Timestamp,
}

impl CachedRate {
    fn new(value: Decimal, now: Timestamp, ttl: Duration) -> Self {
        Self {
            value,
            expires_at: time::expires_after(now, ttl),
        }
    }

    fn is_valid_at(&self, now: Timestamp) -> bool {
        !time::is_expired_at(self.expires_at, now)
    }
}

/// Configuration for rate cache.
#[derive(Debug, Clone)]
pub struct RateCacheConfig {
    /// TTL used by [`RateCache::insert`].
    pub default_ttl: Duration,
    /// Entry count above which expired entries are swept on insert.
    pub max_entries: usize,
}

impl Default for RateCacheConfig {
    fn default() -> Self {
        Self {
            default_ttl: time::constants::default_rate_ttl(),
            max_entries: 10_000,
        }
    }
}

/// Thread-safe rate cache with TTL.
///
/// Keys are ordered pairs; entries are sharded across locks so unrelated
/// lookups never serialize behind each other.
pub struct RateCache {
    cache: DashMap<RatePairKey, CachedRate>,
    config: RateCacheConfig,
}

impl RateCache {
    /// Create a new rate cache with default configuration.
    pub fn new() -> Self {
        Self::with_config(RateCacheConfig::default())
    }

    /// Create a new rate cache with custom configuration.
    pub fn with_config(config: RateCacheConfig) -> Self {
        Self {
            cache: DashMap::new(),
            config,
        }
    }

    /// Get a rate from cache if still fresh.
    pub fn get(&self, pair: &RatePairKey) -> Option<Decimal> {
        self.get_at(pair, time::now())
    }

    /// Get a rate as seen at `now`, evicting it if it has expired.
    pub fn get_at(&self, pair: &RatePairKey, now: Timestamp) -> Option<Decimal> {
        if let Some(entry) = self.cache.get(pair) {
            if entry.is_valid_at(now) {
                debug!(pair = %pair, "Cache hit");
                return Some(entry.value);
            }
        } else {
            debug!(pair = %pair, "Cache miss");
            return None;
        }

        // Only drop the entry if it is still the expired one; a racing put
        // may already have replaced it with a fresh rate.
        if self
            .cache
            .remove_if(pair, |_, entry| !entry.is_valid_at(now))
            .is_some()
        {
            debug!(pair = %pair, "Cache entry expired");
        }
        None
    }

    /// Store a rate with the default TTL.
    pub fn insert(&self, pair: RatePairKey, rate: Decimal) {
        self.put(pair, rate, self.config.default_ttl);
    }

    /// Store a rate with an explicit TTL, replacing any entry for the pair.
    pub fn put(&self, pair: RatePairKey, rate: Decimal, ttl: Duration) {
        self.put_at(pair, rate, ttl, time::now());
    }

    /// Store a rate as if inserted at `now`.
    pub fn put_at(&self, pair: RatePairKey, rate: Decimal, ttl: Duration, now: Timestamp) {
        if self.cache.len() >= self.config.max_entries {
            self.evict_expired_at(now);
        }

        debug!(pair = %pair, rate = %rate, ttl_secs = ttl.num_seconds(), "Caching rate");
        self.cache.insert(pair, CachedRate::new(rate, now, ttl));
    }

    /// Clear all cached rates.
    pub fn clear(&self) {
        self.cache.clear();
    }

    /// Get the number of entries in cache, including not-yet-evicted stale ones.
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Check if cache is empty.
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Evict expired entries.
    pub fn evict_expired(&self) {
        self.evict_expired_at(time::now());
    }

    fn evict_expired_at(&self, now: Timestamp) {
        self.cache.retain(|_, entry| entry.is_valid_at(now));
    }

    /// Get cache statistics.
    pub fn stats(&self) -> CacheStats {
        let now = time::now();
        let total = self.cache.len();
        let valid = self.cache.iter().filter(|e| e.is_valid_at(now)).count();

        CacheStats {
            total_entries: total,
            valid_entries: valid,
            expired_entries: total.saturating_sub(valid),
        }
    }
}

impl Default for RateCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Cache statistics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStats {
    pub total_entries: usize,
    pub valid_entries: usize,
    pub expired_entries: usize,
}

/// Shared rate cache.
pub type SharedRateCache = Arc<RateCache>;
