//! Cache storage: the `CacheStore` contract and the in-process implementation.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use metrics::counter;
use thiserror::Error;

const METRIC_CACHE_HIT_TOTAL: &str = "merce_cache_hit_total";
const METRIC_CACHE_MISS_TOTAL: &str = "merce_cache_miss_total";

#[derive(Debug, Error)]
pub enum CacheError {
    /// The key is absent (or expired). Expected on the read path and on
    /// invalidation; callers treat it as a non-event.
    #[error("key not found")]
    Miss,
    /// A genuine store failure. Always propagated.
    #[error("cache backend error: {0}")]
    Backend(String),
}

/// String-keyed, string-valued cache with per-entry TTL.
///
/// `delete` takes all keys in one round trip and reports `Miss` only when
/// none of them were present; partial invalidation is still `Ok`.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError>;

    async fn get(&self, key: &str) -> Result<String, CacheError>;

    async fn delete(&self, keys: &[String]) -> Result<(), CacheError>;
}

struct Entry {
    value: String,
    deadline: Instant,
}

impl Entry {
    fn expired(&self, now: Instant) -> bool {
        now >= self.deadline
    }
}

/// In-process cache store.
///
/// Entries carry a deadline and are dropped lazily on access; there is no
/// eviction policy beyond the TTL.
#[derive(Default)]
pub struct MemoryCache {
    entries: DashMap<String, Entry>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        let entry = Entry {
            value,
            deadline: Instant::now() + ttl,
        };
        self.entries.insert(key.to_string(), entry);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<String, CacheError> {
        let now = Instant::now();

        if let Some(entry) = self.entries.get(key) {
            if !entry.expired(now) {
                counter!(METRIC_CACHE_HIT_TOTAL).increment(1);
                return Ok(entry.value.clone());
            }
        }

        // Expired entries are dropped on the read that observes them.
        self.entries.remove_if(key, |_, entry| entry.expired(now));
        counter!(METRIC_CACHE_MISS_TOTAL).increment(1);
        Err(CacheError::Miss)
    }

    async fn delete(&self, keys: &[String]) -> Result<(), CacheError> {
        let now = Instant::now();
        let mut removed = 0usize;

        for key in keys {
            if let Some((_, entry)) = self.entries.remove(key) {
                if !entry.expired(now) {
                    removed += 1;
                }
            }
        }

        if removed == 0 {
            return Err(CacheError::Miss);
        }
        Ok(())
    }
}
