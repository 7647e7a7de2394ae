//! In-memory tagged TTL cache.
//!
//! Entries expire lazily on read and are swept opportunistically on every
//! write; a reverse tag index (tag to keys) keeps bulk invalidation off
//! the value path. State is process-local: in a horizontally scaled
//! deployment each instance holds an independent view.

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::domain::errors::DomainResult;
use crate::domain::models::cache::{CacheOptions, CacheStats};
use crate::domain::models::config::CacheConfig;
use crate::domain::ports::{CacheStore, Clock};

struct Entry {
    value: Value,
    inserted_at: Instant,
    ttl_seconds: i64,
    tags: Vec<String>,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        self.ttl_seconds >= 0
            && now.duration_since(self.inserted_at)
                > Duration::from_secs(self.ttl_seconds.unsigned_abs())
    }
}

#[derive(Default)]
struct CacheInner {
    entries: HashMap<String, Entry>,
    tag_index: HashMap<String, HashSet<String>>,
}

/// Process-local cache with TTL expiry and tag invalidation.
pub struct MemoryCache {
    inner: RwLock<CacheInner>,
    clock: Arc<dyn Clock>,
    default_ttl_seconds: i64,
}

impl MemoryCache {
    /// Create a store using the default TTL from `config`.
    pub fn new(config: &CacheConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: RwLock::new(CacheInner::default()),
            clock,
            default_ttl_seconds: config.default_ttl_seconds,
        }
    }

    /// Serialize `value` and store it at `key`.
    pub async fn set_json<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        options: CacheOptions,
    ) -> DomainResult<()> {
        let value = serde_json::to_value(value)?;
        CacheStore::set(self, key, value, options).await;
        Ok(())
    }

    /// Fetch and deserialize the live value at `key`.
    ///
    /// A payload that no longer deserializes as `T` is treated as a miss,
    /// not an error.
    pub async fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = CacheStore::get(self, key).await?;
        match serde_json::from_value(value) {
            Ok(decoded) => Some(decoded),
            Err(err) => {
                warn!(key, error = %err, "cached value failed to deserialize; treating as miss");
                None
            }
        }
    }

    /// Return the cached value at `key`, or run `compute`, store its
    /// result under `options`, and return it.
    pub async fn get_or_compute<T, F, Fut>(
        &self,
        key: &str,
        options: CacheOptions,
        compute: F,
    ) -> DomainResult<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = DomainResult<T>>,
    {
        if let Some(hit) = self.get_as::<T>(key).await {
            return Ok(hit);
        }
        let fresh = compute().await?;
        self.set_json(key, &fresh, options).await?;
        Ok(fresh)
    }

    /// Fetch several keys at once.
    pub async fn get_many(&self, keys: &[String]) -> HashMap<String, Option<Value>> {
        let mut results = HashMap::with_capacity(keys.len());
        for key in keys {
            results.insert(key.clone(), CacheStore::get(self, key).await);
        }
        results
    }

    /// Store several entries under the same options.
    pub async fn set_many(&self, entries: Vec<(String, Value)>, options: &CacheOptions) {
        for (key, value) in entries {
            CacheStore::set(self, &key, value, options.clone()).await;
        }
    }

    fn remove_entry(inner: &mut CacheInner, key: &str) {
        if let Some(entry) = inner.entries.remove(key) {
            for tag in &entry.tags {
                if let Some(keys) = inner.tag_index.get_mut(tag) {
                    keys.remove(key);
                    if keys.is_empty() {
                        inner.tag_index.remove(tag);
                    }
                }
            }
        }
    }

    fn sweep_expired(inner: &mut CacheInner, now: Instant) -> usize {
        let expired: Vec<String> = inner
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired(now))
            .map(|(key, _)| key.clone())
            .collect();
        for key in &expired {
            Self::remove_entry(inner, key);
        }
        expired.len()
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn set(&self, key: &str, value: Value, options: CacheOptions) {
        let now = self.clock.now();
        let ttl_seconds = options.ttl_seconds.unwrap_or(self.default_ttl_seconds);
        let mut inner = self.inner.write().await;

        // Detach the old entry's tags before the overwrite.
        Self::remove_entry(&mut inner, key);
        for tag in &options.tags {
            inner
                .tag_index
                .entry(tag.clone())
                .or_default()
                .insert(key.to_string());
        }
        inner.entries.insert(
            key.to_string(),
            Entry {
                value,
                inserted_at: now,
                ttl_seconds,
                tags: options.tags,
            },
        );

        let swept = Self::sweep_expired(&mut inner, now);
        if swept > 0 {
            debug!(swept, "swept expired cache entries");
        }
    }

    async fn get(&self, key: &str) -> Option<Value> {
        let now = self.clock.now();
        {
            let inner = self.inner.read().await;
            match inner.entries.get(key) {
                Some(entry) if !entry.is_expired(now) => return Some(entry.value.clone()),
                Some(_) => {}
                None => return None,
            }
        }

        // Expired on read: upgrade to a write lock and drop it, unless a
        // concurrent set already replaced it with a live entry.
        let mut inner = self.inner.write().await;
        match inner.entries.get(key) {
            Some(entry) if entry.is_expired(now) => {
                Self::remove_entry(&mut inner, key);
                None
            }
            Some(entry) => Some(entry.value.clone()),
            None => None,
        }
    }

    async fn delete(&self, key: &str) {
        let mut inner = self.inner.write().await;
        Self::remove_entry(&mut inner, key);
    }

    async fn invalidate(&self, pattern: Option<&str>, tags: &[String]) {
        let mut inner = self.inner.write().await;

        // Pattern pass.
        if let Some(pattern) = pattern {
            let matches: Vec<String> = inner
                .entries
                .keys()
                .filter(|key| key.contains(pattern))
                .cloned()
                .collect();
            for key in &matches {
                Self::remove_entry(&mut inner, key);
            }
        }

        // Tag pass.
        if !tags.is_empty() {
            let mut keys: HashSet<String> = HashSet::new();
            for tag in tags {
                if let Some(bucket) = inner.tag_index.get(tag) {
                    keys.extend(bucket.iter().cloned());
                }
            }
            for key in &keys {
                Self::remove_entry(&mut inner, key);
            }
        }
    }

    async fn clear(&self) {
        let mut inner = self.inner.write().await;
        inner.entries.clear();
        inner.tag_index.clear();
    }

    async fn stats(&self) -> CacheStats {
        let inner = self.inner.read().await;
        CacheStats {
            size: inner.entries.len(),
            connected: false,
            tags: inner.tag_index.len(),
        }
    }
}
