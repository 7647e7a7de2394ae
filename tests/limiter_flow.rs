//! Integration tests for the guard flow: reserve, perform, settle, and
//! the cache interplay around it.

use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use serde_json::json;

use costguard::{
    cache_keys, estimate_cost, CacheConfig, CacheOptions, CacheStore, DenyReason, LimitsConfig,
    MemoryCache, MemoryUsageSink, MockClock, ReserveOutcome, Tier, UsageLimiter,
};

fn midmonth_clock() -> MockClock {
    MockClock::new(Utc.with_ymd_and_hms(2025, 6, 15, 12, 30, 0).unwrap())
}

fn make_limiter(clock: &MockClock, sink: Arc<MemoryUsageSink>) -> UsageLimiter {
    UsageLimiter::new(LimitsConfig::default(), Arc::new(clock.clone()), sink)
}

#[tokio::test]
async fn test_full_guard_flow() {
    let clock = midmonth_clock();
    let sink = Arc::new(MemoryUsageSink::new());
    let limiter = make_limiter(&clock, sink.clone());
    let cache = MemoryCache::new(&CacheConfig::default(), Arc::new(clock.clone()));

    // 1. Reserve before the expensive action.
    let projected = estimate_cost("claude", 2000, 1000).unwrap();
    let reservation = match limiter.try_reserve("u1", Tier::GrowthTeam, projected).await {
        ReserveOutcome::Granted(reservation) => reservation,
        ReserveOutcome::Denied(decision) => panic!("reserve denied: {decision:?}"),
    };

    // 2. Perform the action (simulated) and cache the result under a tag.
    let generated = json!({"subject": "Spring sale", "body": "..."});
    cache
        .set(
            &cache_keys::api_response("/api/email/generate", "campaign=42"),
            generated.clone(),
            CacheOptions::default().tag("campaign:42"),
        )
        .await;

    // 3. Settle with actual usage.
    limiter
        .settle(reservation, Some("tenant-1"), "claude", 1850, 920, 0.019, "email-generation")
        .await;

    let records = sink.records().await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].feature, "email-generation");
    assert_eq!(records[0].tier, Tier::GrowthTeam);

    let stats = limiter.usage_stats("u1").await;
    assert_eq!(stats.daily, 1);
    assert!((stats.daily_cost - 0.019).abs() < 1e-9);

    // 4. The cached result serves later reads...
    assert_eq!(
        cache
            .get(&cache_keys::api_response("/api/email/generate", "campaign=42"))
            .await,
        Some(generated)
    );

    // 5. ...until the campaign changes and its tag is invalidated.
    cache.invalidate(None, &["campaign:42".to_string()]).await;
    assert_eq!(
        cache
            .get(&cache_keys::api_response("/api/email/generate", "campaign=42"))
            .await,
        None
    );
}

#[tokio::test]
async fn test_trial_user_exhausts_hourly_allowance() {
    let clock = midmonth_clock();
    let sink = Arc::new(MemoryUsageSink::new());
    let limiter = make_limiter(&clock, sink);

    // Trial: 5 requests per hour.
    for _ in 0..5 {
        match limiter.try_reserve("trial-user", Tier::Trial, 0.01).await {
            ReserveOutcome::Granted(reservation) => {
                limiter
                    .settle(reservation, None, "gpt-3.5", 300, 150, 0.001, "chat")
                    .await;
            }
            ReserveOutcome::Denied(decision) => panic!("unexpected denial: {decision:?}"),
        }
    }

    let denied = limiter.try_reserve("trial-user", Tier::Trial, 0.01).await;
    match denied {
        ReserveOutcome::Denied(decision) => {
            assert_eq!(decision.reason, Some(DenyReason::HourlyRequests));
            assert_eq!(decision.remaining.hourly, Some(0));
        }
        ReserveOutcome::Granted(_) => panic!("sixth request should be denied"),
    }

    // A new hour restores the allowance.
    clock.advance(Duration::from_secs(3600));
    assert!(matches!(
        limiter.try_reserve("trial-user", Tier::Trial, 0.01).await,
        ReserveOutcome::Granted(_)
    ));
}

#[tokio::test]
async fn test_unknown_tier_from_the_edge_fails_closed() {
    let clock = midmonth_clock();
    let sink = Arc::new(MemoryUsageSink::new());
    let limiter = make_limiter(&clock, sink);

    for tier in ["", "free", "TRIAL", "enterprise++"] {
        let decision = limiter.check_limit_tag("u1", tier, 0.01).await;
        assert!(!decision.allowed, "tier {tier:?} must fail closed");
        assert_eq!(decision.reason, Some(DenyReason::UnknownTier));
    }
}

#[tokio::test]
async fn test_daily_cost_ceiling_across_features() {
    let clock = midmonth_clock();
    let sink = Arc::new(MemoryUsageSink::new());
    let limiter = make_limiter(&clock, sink);

    limiter
        .record_usage("u1", None, "claude", 50_000, 20_000, 4.0, "report", Tier::SoloProfessional)
        .await;

    assert!(limiter.check_limit("u1", Tier::SoloProfessional, 0.9).await.allowed);

    let decision = limiter.check_limit("u1", Tier::SoloProfessional, 1.5).await;
    assert!(!decision.allowed);
    assert_eq!(decision.reason, Some(DenyReason::DailyCost));
    assert_eq!(
        decision.reason.map(|reason| reason.to_string()).as_deref(),
        Some("Daily AI cost limit reached for your plan")
    );

    // The next day the spend window is fresh.
    clock.advance(Duration::from_secs(24 * 3600));
    assert!(limiter.check_limit("u1", Tier::SoloProfessional, 1.5).await.allowed);
}

#[tokio::test]
async fn test_abandoned_estimate_is_released_not_charged() {
    let clock = midmonth_clock();
    let sink = Arc::new(MemoryUsageSink::new());
    let limiter = make_limiter(&clock, sink.clone());

    let reservation = match limiter.try_reserve("u1", Tier::Trial, 0.9).await {
        ReserveOutcome::Granted(reservation) => reservation,
        ReserveOutcome::Denied(decision) => panic!("reserve denied: {decision:?}"),
    };

    // The AI call failed; nothing should be recorded.
    limiter.release(reservation).await;

    assert!(sink.records().await.is_empty());
    let decision = limiter.check_limit("u1", Tier::Trial, 0.9).await;
    assert!(decision.allowed, "released estimate must not keep counting");
}
