//! Cache entry primitive shared by the catalog and response caches

use std::time::{Duration, Instant};

/// A cached value with its insertion timestamp.
///
/// The entry does not carry its own TTL; the owning cache decides, which
/// keeps expiry reconfigurable without rewriting stored entries.
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    pub value: T,
    inserted_at: Instant,
}

impl<T> CacheEntry<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            inserted_at: Instant::now(),
        }
    }

    /// Logically expired once `now - inserted_at >= ttl`.
    pub fn is_expired(&self, ttl: Duration) -> bool {
        self.inserted_at.elapsed() >= ttl
    }

    pub fn age(&self) -> Duration {
        self.inserted_at.elapsed()
    }
}
