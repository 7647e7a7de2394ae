//! Cache entry options, statistics, and TTL presets.

use serde::{Deserialize, Serialize};

/// TTL presets in seconds, by data volatility.
pub mod ttl {
    /// Frequently changing data (5 minutes).
    pub const SHORT: i64 = 300;
    /// Semi-static data (30 minutes); the store default.
    pub const MEDIUM: i64 = 1800;
    /// Relatively static data (1 hour).
    pub const LONG: i64 = 3600;
    /// Daily aggregates (24 hours).
    pub const DAILY: i64 = 86_400;
    /// Weekly reports (7 days).
    pub const WEEKLY: i64 = 604_800;
    /// Reference data that never goes stale.
    pub const PERMANENT: i64 = -1;
}

/// Per-entry options for a cache write.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheOptions {
    /// Seconds until the entry is stale. `-1` never expires; `None` uses
    /// the store's configured default.
    pub ttl_seconds: Option<i64>,
    /// Labels for group invalidation.
    pub tags: Vec<String>,
}

impl CacheOptions {
    /// Options with an explicit TTL and no tags.
    pub fn with_ttl(ttl_seconds: i64) -> Self {
        Self {
            ttl_seconds: Some(ttl_seconds),
            tags: Vec::new(),
        }
    }

    /// Attach a tag.
    #[must_use]
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }
}

/// Point-in-time view of store occupancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Entries currently held (including expired ones not yet swept).
    pub size: usize,
    /// Whether a durable backing store is attached. Always `false` for
    /// the in-memory build: nothing is shared across instances or
    /// survives a restart.
    pub connected: bool,
    /// Distinct tags currently indexed.
    pub tags: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_builder() {
        let options = CacheOptions::with_ttl(ttl::SHORT).tag("campaigns").tag("tenant:7");
        assert_eq!(options.ttl_seconds, Some(300));
        assert_eq!(options.tags, vec!["campaigns", "tenant:7"]);
    }
}
