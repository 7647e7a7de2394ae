//! Tiered AI rate/cost limiter with atomic reservations.
//!
//! Decision policy mirrors the platform's billing rules: per-user request
//! ceilings over hour/day/month calendar windows, then per-user cost
//! ceilings over day/month, then platform-wide cost ceilings. Windows are
//! computed at check time from the wall clock; no background timer owns a
//! counter reset.
//!
//! [`check_limit`](UsageLimiter::check_limit) is a pure decision with no
//! side effect. Two concurrent check-then-record sequences for the same
//! user can both pass and overshoot the ceiling; callers wanting a hard
//! ceiling use [`try_reserve`](UsageLimiter::try_reserve) /
//! [`settle`](UsageLimiter::settle), which fold the check and a
//! provisional charge into one critical section (reserve high, settle
//! low).

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Datelike, Duration as ChronoDuration, Months, Timelike, Utc};
use tokio::sync::RwLock;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::models::config::LimitsConfig;
use crate::domain::models::decision::{
    CostRemaining, DenyReason, LimitDecision, RequestsRemaining, WindowResets,
};
use crate::domain::models::tier::{Tier, TierLimits};
use crate::domain::models::usage::{GlobalCosts, UsageRecord, UsageStats};
use crate::domain::ports::{Clock, UsageSink};

// ============================================================================
// Window arithmetic
// ============================================================================

#[derive(Debug, Clone, Copy)]
struct WindowBounds {
    hour_start: DateTime<Utc>,
    day_start: DateTime<Utc>,
    month_start: DateTime<Utc>,
}

impl WindowBounds {
    fn at(now: DateTime<Utc>) -> Self {
        let date = now.date_naive();
        let hour_start = date
            .and_hms_opt(now.hour(), 0, 0)
            .map_or(now, |naive| naive.and_utc());
        let day_start = date.and_hms_opt(0, 0, 0).map_or(now, |naive| naive.and_utc());
        let month_start = date
            .with_day(1)
            .and_then(|first| first.and_hms_opt(0, 0, 0))
            .map_or(now, |naive| naive.and_utc());
        Self {
            hour_start,
            day_start,
            month_start,
        }
    }

    fn resets(&self) -> WindowResets {
        WindowResets {
            hourly: self.hour_start + ChronoDuration::hours(1),
            daily: self.day_start + ChronoDuration::days(1),
            monthly: self.month_start + Months::new(1),
        }
    }
}

/// Per-user usage tallied against one set of window bounds, including
/// outstanding reservations.
#[derive(Debug, Clone, Copy, Default)]
struct WindowUsage {
    hourly: u64,
    daily: u64,
    monthly: u64,
    daily_cost: f64,
    monthly_cost: f64,
}

// ============================================================================
// Reservations
// ============================================================================

/// Handle for a granted provisional charge.
///
/// Hold it across the AI call, then [`UsageLimiter::settle`] with actual
/// usage or [`UsageLimiter::release`] if the call failed. An abandoned
/// reservation keeps counting against its user until process restart, so
/// always settle or release explicitly.
#[derive(Debug, Clone)]
pub struct Reservation {
    id: Uuid,
    user_id: String,
    tier: Tier,
    estimated_cost: f64,
}

impl Reservation {
    /// Reservation identifier.
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// User the reservation charges.
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Provisionally charged cost, USD.
    pub const fn estimated_cost(&self) -> f64 {
        self.estimated_cost
    }
}

/// Result of an atomic check-and-reserve.
#[derive(Debug)]
pub enum ReserveOutcome {
    /// Ceilings leave room; the estimate is provisionally charged.
    Granted(Reservation),
    /// Some ceiling would be exceeded.
    Denied(LimitDecision),
}

struct PendingReservation {
    user_id: String,
    at: DateTime<Utc>,
    estimated_cost: f64,
}

#[derive(Default)]
struct Inner {
    /// Recorded usage per user, pruned to the retention window on append.
    usage: HashMap<String, Vec<UsageRecord>>,
    /// Outstanding reservations, charged against every decision.
    pending: HashMap<Uuid, PendingReservation>,
}

// ============================================================================
// UsageLimiter
// ============================================================================

/// Per-tier rate and cost limiter for AI actions.
///
/// # Usage
///
/// 1. Call [`try_reserve`](Self::try_reserve) before performing an
///    expensive action.
/// 2. On success, perform the action, then [`settle`](Self::settle) the
///    reservation with actual token counts and cost (or
///    [`release`](Self::release) it on failure).
/// 3. Surface a denied decision's [`DenyReason`] to the end user via the
///    calling route handler.
pub struct UsageLimiter {
    config: LimitsConfig,
    clock: Arc<dyn Clock>,
    sink: Arc<dyn UsageSink>,
    inner: Arc<RwLock<Inner>>,
}

impl UsageLimiter {
    /// Create a limiter over `config`, stamping time from `clock` and
    /// forwarding settled records to `sink`.
    pub fn new(config: LimitsConfig, clock: Arc<dyn Clock>, sink: Arc<dyn UsageSink>) -> Self {
        Self {
            config,
            clock,
            sink,
            inner: Arc::new(RwLock::new(Inner::default())),
        }
    }

    // -------------------------------------------------------------------------
    // Decisions
    // -------------------------------------------------------------------------

    /// Decide whether `user_id` on `tier` may spend `projected_cost` USD.
    ///
    /// Pure decision over current accumulator state; records nothing.
    /// Never fails: any internal fault (such as a tier missing from the
    /// ceiling table) resolves to a deny with an explanatory reason.
    pub async fn check_limit(
        &self,
        user_id: &str,
        tier: Tier,
        projected_cost: f64,
    ) -> LimitDecision {
        let now = self.clock.now_utc();
        let inner = self.inner.read().await;
        self.decide(&inner, user_id, tier, projected_cost, now)
    }

    /// [`check_limit`](Self::check_limit) for callers holding a bare tier
    /// string. An unrecognized tier fails closed.
    pub async fn check_limit_tag(
        &self,
        user_id: &str,
        tier: &str,
        projected_cost: f64,
    ) -> LimitDecision {
        match tier.parse::<Tier>() {
            Ok(tier) => self.check_limit(user_id, tier, projected_cost).await,
            Err(_) => {
                debug!(user = user_id, tier, "denying unknown tier string");
                let bounds = WindowBounds::at(self.clock.now_utc());
                LimitDecision::denied(DenyReason::UnknownTier, bounds.resets())
            }
        }
    }

    /// Atomically check ceilings and, when allowed, charge
    /// `estimated_cost` provisionally.
    ///
    /// The reservation counts as one request plus its estimate in every
    /// subsequent decision until settled or released, closing the
    /// check-then-record race a bare `check_limit` leaves open.
    pub async fn try_reserve(
        &self,
        user_id: &str,
        tier: Tier,
        estimated_cost: f64,
    ) -> ReserveOutcome {
        let now = self.clock.now_utc();
        let mut inner = self.inner.write().await;

        let decision = self.decide(&inner, user_id, tier, estimated_cost, now);
        if !decision.allowed {
            return ReserveOutcome::Denied(decision);
        }

        let id = Uuid::new_v4();
        inner.pending.insert(
            id,
            PendingReservation {
                user_id: user_id.to_string(),
                at: now,
                estimated_cost,
            },
        );
        debug!(user = user_id, reservation = %id, estimated_cost, "reservation granted");
        ReserveOutcome::Granted(Reservation {
            id,
            user_id: user_id.to_string(),
            tier,
            estimated_cost,
        })
    }

    // -------------------------------------------------------------------------
    // Recording
    // -------------------------------------------------------------------------

    /// Replace a reservation's estimate with the action's actual usage.
    ///
    /// Never fails; sink faults are swallowed and logged.
    #[allow(clippy::too_many_arguments)]
    pub async fn settle(
        &self,
        reservation: Reservation,
        tenant_id: Option<&str>,
        model: &str,
        prompt_tokens: u64,
        completion_tokens: u64,
        cost_usd: f64,
        feature: &str,
    ) {
        let record = UsageRecord {
            id: Uuid::new_v4(),
            user_id: reservation.user_id.clone(),
            tenant_id: tenant_id.map(ToString::to_string),
            at: self.clock.now_utc(),
            model: model.to_string(),
            prompt_tokens,
            completion_tokens,
            cost_usd: sanitize_cost(cost_usd),
            feature: feature.to_string(),
            tier: reservation.tier,
        };

        {
            let mut inner = self.inner.write().await;
            if inner.pending.remove(&reservation.id).is_none() {
                warn!(
                    reservation = %reservation.id,
                    "settling a reservation that was not outstanding"
                );
            }
            self.append_record(&mut inner, record.clone());
        }
        self.forward_to_sink(record).await;
    }

    /// Drop a reservation whose action failed; nothing is recorded.
    pub async fn release(&self, reservation: Reservation) {
        let mut inner = self.inner.write().await;
        if inner.pending.remove(&reservation.id).is_none() {
            debug!(reservation = %reservation.id, "releasing a reservation that was not outstanding");
        }
    }

    /// Append a usage record without a prior reservation.
    ///
    /// Best-effort accounting: never fails, and sanitizes negative or
    /// non-finite numeric inputs to zero rather than rejecting them.
    #[allow(clippy::too_many_arguments)]
    pub async fn record_usage(
        &self,
        user_id: &str,
        tenant_id: Option<&str>,
        model: &str,
        prompt_tokens: i64,
        completion_tokens: i64,
        cost_usd: f64,
        feature: &str,
        tier: Tier,
    ) {
        let record = UsageRecord {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            tenant_id: tenant_id.map(ToString::to_string),
            at: self.clock.now_utc(),
            model: model.to_string(),
            prompt_tokens: sanitize_tokens(prompt_tokens, "prompt_tokens"),
            completion_tokens: sanitize_tokens(completion_tokens, "completion_tokens"),
            cost_usd: sanitize_cost(cost_usd),
            feature: feature.to_string(),
            tier,
        };

        {
            let mut inner = self.inner.write().await;
            self.append_record(&mut inner, record.clone());
        }
        self.forward_to_sink(record).await;
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    /// Recorded usage for `user_id` in the current windows.
    pub async fn usage_stats(&self, user_id: &str) -> UsageStats {
        let bounds = WindowBounds::at(self.clock.now_utc());
        let inner = self.inner.read().await;
        let empty = Vec::new();
        let records = inner.usage.get(user_id).unwrap_or(&empty);

        let mut stats = UsageStats::default();
        for record in records {
            if record.at >= bounds.hour_start {
                stats.hourly += 1;
            }
            if record.at >= bounds.day_start {
                stats.daily += 1;
                stats.daily_cost += record.cost_usd;
            }
            if record.at >= bounds.month_start {
                stats.monthly += 1;
                stats.monthly_cost += record.cost_usd;
            }
        }
        stats
    }

    /// Platform-wide recorded spend in the current day/month windows.
    pub async fn current_costs(&self) -> GlobalCosts {
        let bounds = WindowBounds::at(self.clock.now_utc());
        let inner = self.inner.read().await;

        let mut costs = GlobalCosts::default();
        for records in inner.usage.values() {
            for record in records {
                if record.at >= bounds.day_start {
                    costs.daily += record.cost_usd;
                }
                if record.at >= bounds.month_start {
                    costs.monthly += record.cost_usd;
                }
            }
        }
        costs
    }

    /// Forget recorded usage and reservations for `user_id`, or for
    /// everyone when `None`.
    pub async fn reset_usage(&self, user_id: Option<&str>) {
        let mut inner = self.inner.write().await;
        match user_id {
            Some(user) => {
                inner.usage.remove(user);
                inner.pending.retain(|_, pending| pending.user_id != user);
            }
            None => {
                inner.usage.clear();
                inner.pending.clear();
            }
        }
    }

    // -------------------------------------------------------------------------
    // Private helpers
    // -------------------------------------------------------------------------

    /// Evaluate every ceiling for one prospective action.
    ///
    /// Ceiling order follows the billing rules: request counts
    /// (hour/day/month), per-user cost (day/month), then the platform-wide
    /// budget (day/month). Request ceilings deny at `used >= ceiling`;
    /// cost ceilings deny when `used + projected` would exceed them.
    fn decide(
        &self,
        inner: &Inner,
        user_id: &str,
        tier: Tier,
        projected_cost: f64,
        now: DateTime<Utc>,
    ) -> LimitDecision {
        let bounds = WindowBounds::at(now);
        let resets = bounds.resets();

        let Some(limits) = self.config.tiers.get(&tier) else {
            warn!(user = user_id, %tier, "tier missing from ceiling table; denying");
            return LimitDecision::denied(DenyReason::UnknownTier, resets);
        };

        let used = Self::user_window_usage(inner, user_id, &bounds);

        let reason = Self::first_exceeded(limits, &used, projected_cost).or_else(|| {
            let global = Self::global_window_costs(inner, &bounds);
            if global.daily + projected_cost > self.config.global.daily {
                Some(DenyReason::GlobalDailyCost)
            } else if global.monthly + projected_cost > self.config.global.monthly {
                Some(DenyReason::GlobalMonthlyCost)
            } else {
                None
            }
        });

        LimitDecision {
            allowed: reason.is_none(),
            reason,
            remaining: RequestsRemaining {
                hourly: remaining_requests(limits.requests.hourly, used.hourly),
                daily: remaining_requests(limits.requests.daily, used.daily),
                monthly: remaining_requests(limits.requests.monthly, used.monthly),
            },
            reset_at: resets,
            cost_remaining: CostRemaining {
                daily: (limits.cost.daily - used.daily_cost).max(0.0),
                monthly: (limits.cost.monthly - used.monthly_cost).max(0.0),
            },
        }
    }

    fn first_exceeded(
        limits: &TierLimits,
        used: &WindowUsage,
        projected_cost: f64,
    ) -> Option<DenyReason> {
        if exceeds_requests(limits.requests.hourly, used.hourly) {
            return Some(DenyReason::HourlyRequests);
        }
        if exceeds_requests(limits.requests.daily, used.daily) {
            return Some(DenyReason::DailyRequests);
        }
        if exceeds_requests(limits.requests.monthly, used.monthly) {
            return Some(DenyReason::MonthlyRequests);
        }
        if used.daily_cost + projected_cost > limits.cost.daily {
            return Some(DenyReason::DailyCost);
        }
        if used.monthly_cost + projected_cost > limits.cost.monthly {
            return Some(DenyReason::MonthlyCost);
        }
        None
    }

    fn user_window_usage(inner: &Inner, user_id: &str, bounds: &WindowBounds) -> WindowUsage {
        let mut used = WindowUsage::default();

        if let Some(records) = inner.usage.get(user_id) {
            for record in records {
                if record.at >= bounds.hour_start {
                    used.hourly += 1;
                }
                if record.at >= bounds.day_start {
                    used.daily += 1;
                    used.daily_cost += record.cost_usd;
                }
                if record.at >= bounds.month_start {
                    used.monthly += 1;
                    used.monthly_cost += record.cost_usd;
                }
            }
        }

        // Outstanding reservations are charged as if already spent.
        for pending in inner.pending.values() {
            if pending.user_id == user_id {
                used.hourly += 1;
                used.daily += 1;
                used.monthly += 1;
                used.daily_cost += pending.estimated_cost;
                used.monthly_cost += pending.estimated_cost;
            }
        }

        used
    }

    fn global_window_costs(inner: &Inner, bounds: &WindowBounds) -> GlobalCosts {
        let mut costs = GlobalCosts::default();
        for records in inner.usage.values() {
            for record in records {
                if record.at >= bounds.day_start {
                    costs.daily += record.cost_usd;
                }
                if record.at >= bounds.month_start {
                    costs.monthly += record.cost_usd;
                }
            }
        }
        for pending in inner.pending.values() {
            costs.daily += pending.estimated_cost;
            costs.monthly += pending.estimated_cost;
        }
        costs
    }

    fn append_record(&self, inner: &mut Inner, record: UsageRecord) {
        let cutoff = record.at - ChronoDuration::days(i64::from(self.config.retention_days));
        let records = inner.usage.entry(record.user_id.clone()).or_default();
        records.push(record);
        records.retain(|kept| kept.at > cutoff);
    }

    async fn forward_to_sink(&self, record: UsageRecord) {
        if let Err(err) = self.sink.append(&record).await {
            warn!(
                user = %record.user_id,
                error = %err,
                "usage sink append failed; record kept in memory only"
            );
        }
    }
}

fn exceeds_requests(ceiling: Option<u32>, used: u64) -> bool {
    ceiling.is_some_and(|ceiling| used >= u64::from(ceiling))
}

fn remaining_requests(ceiling: Option<u32>, used: u64) -> Option<u32> {
    ceiling.map(|ceiling| u32::try_from(u64::from(ceiling).saturating_sub(used)).unwrap_or(0))
}

fn sanitize_tokens(value: i64, field: &'static str) -> u64 {
    u64::try_from(value).unwrap_or_else(|_| {
        warn!(field, value, "negative token count clamped to zero");
        0
    })
}

fn sanitize_cost(value: f64) -> f64 {
    if value.is_finite() && value >= 0.0 {
        value
    } else {
        warn!(value, "invalid cost clamped to zero");
        0.0
    }
}
