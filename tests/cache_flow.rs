//! Integration tests for the cache against real wall-clock time.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use costguard::{
    cache_keys, CacheConfig, CacheOptions, CacheStore, DomainError, MemoryCache, SystemClock,
};

fn make_cache() -> MemoryCache {
    MemoryCache::new(&CacheConfig::default(), Arc::new(SystemClock::new()))
}

#[tokio::test]
async fn test_one_second_ttl_expires_in_real_time() {
    let cache = make_cache();

    cache
        .set(
            &cache_keys::campaign("42"),
            json!({"name": "spring-launch", "budget": 1200}),
            CacheOptions::with_ttl(1),
        )
        .await;

    assert_eq!(
        cache.get(&cache_keys::campaign("42")).await,
        Some(json!({"name": "spring-launch", "budget": 1200}))
    );

    tokio::time::sleep(Duration::from_millis(1100)).await;
    assert_eq!(cache.get(&cache_keys::campaign("42")).await, None);
}

#[tokio::test]
async fn test_mutation_invalidates_derived_views_by_tag() {
    let cache = make_cache();
    let tag = "campaign:42".to_string();

    // A campaign and two derived cached views share one tag.
    cache
        .set(
            &cache_keys::campaign("42"),
            json!({"name": "spring-launch"}),
            CacheOptions::default().tag(&tag),
        )
        .await;
    cache
        .set(
            &cache_keys::analytics("roi", "42"),
            json!({"roi": 3.4}),
            CacheOptions::default().tag(&tag),
        )
        .await;
    cache
        .set(
            &cache_keys::analytics("spend", "42"),
            json!({"spend": 310.0}),
            CacheOptions::default().tag(&tag),
        )
        .await;
    // An unrelated campaign is untouched.
    cache
        .set(
            &cache_keys::campaign("7"),
            json!({"name": "autumn"}),
            CacheOptions::default().tag("campaign:7"),
        )
        .await;

    // The campaign is edited: drop everything derived from it.
    cache.invalidate(None, std::slice::from_ref(&tag)).await;

    assert_eq!(cache.get(&cache_keys::campaign("42")).await, None);
    assert_eq!(cache.get(&cache_keys::analytics("roi", "42")).await, None);
    assert_eq!(cache.get(&cache_keys::analytics("spend", "42")).await, None);
    assert_eq!(
        cache.get(&cache_keys::campaign("7")).await,
        Some(json!({"name": "autumn"}))
    );
}

#[tokio::test]
async fn test_pattern_invalidation_clears_a_key_family() {
    let cache = make_cache();

    for id in ["1", "2", "3"] {
        cache
            .set(&cache_keys::campaign(id), json!(id), CacheOptions::default())
            .await;
    }
    cache
        .set(&cache_keys::tenant_data("9"), json!("t"), CacheOptions::default())
        .await;

    cache.invalidate(Some("campaign:"), &[]).await;

    for id in ["1", "2", "3"] {
        assert_eq!(cache.get(&cache_keys::campaign(id)).await, None);
    }
    assert_eq!(cache.get(&cache_keys::tenant_data("9")).await, Some(json!("t")));
}

#[tokio::test]
async fn test_get_or_compute_avoids_recomputation() {
    let cache = make_cache();
    let key = cache_keys::api_response("/api/analytics", "range=30d");

    let first: Vec<u32> = cache
        .get_or_compute(&key, CacheOptions::default(), || async {
            Ok::<Vec<u32>, DomainError>(vec![1, 2, 3])
        })
        .await
        .unwrap();
    assert_eq!(first, vec![1, 2, 3]);

    // The second computation never runs; the cached copy is returned.
    let second: Vec<u32> = cache
        .get_or_compute(&key, CacheOptions::default(), || async {
            panic!("compute should not run on a warm cache")
        })
        .await
        .unwrap();
    assert_eq!(second, vec![1, 2, 3]);
}

#[tokio::test]
async fn test_stats_reflect_occupancy() {
    let cache = make_cache();
    assert_eq!(cache.stats().await.size, 0);

    cache
        .set("a", json!(1), CacheOptions::default().tag("t"))
        .await;
    cache.set("b", json!(2), CacheOptions::default()).await;

    let stats = cache.stats().await;
    assert_eq!(stats.size, 2);
    assert_eq!(stats.tags, 1);
    assert!(!stats.connected, "no durable backend in the base build");

    cache.clear().await;
    let stats = cache.stats().await;
    assert_eq!(stats.size, 0);
    assert_eq!(stats.tags, 0);
}
