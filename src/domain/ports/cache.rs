//! Port for cache storage backends.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::models::cache::{CacheOptions, CacheStats};

/// Capability interface for a tagged TTL cache.
///
/// Constructed once at process start and handed to consumers by
/// dependency injection, never imported as an ambient singleton; that
/// keeps call sites testable and the backend swappable for a distributed
/// store later. Every operation is best-effort and non-blocking: cache
/// faults degrade to misses, never to errors.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Store `value` at `key`, replacing any existing entry.
    async fn set(&self, key: &str, value: Value, options: CacheOptions);

    /// Fetch the live value at `key`. An expired entry is removed and
    /// reported as a miss.
    async fn get(&self, key: &str) -> Option<Value>;

    /// Remove `key`. Removing an absent key is a no-op.
    async fn delete(&self, key: &str);

    /// Remove entries whose key contains `pattern` as a substring, and
    /// entries whose tag set intersects `tags`.
    ///
    /// The two filters are independent passes (pattern first, then tags):
    /// supplying both deletes the union, not the intersection.
    async fn invalidate(&self, pattern: Option<&str>, tags: &[String]);

    /// Drop every entry and tag bucket.
    async fn clear(&self);

    /// Occupancy statistics.
    async fn stats(&self) -> CacheStats;
}
