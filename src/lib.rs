//! Costguard - AI Usage Guardrails
//!
//! Costguard is an in-process cost-governance library for AI-assisted
//! product features: a tagged TTL response cache to avoid redundant AI
//! calls, and a per-subscription-tier rate/cost limiter with best-effort
//! usage recording.
//!
//! # Architecture
//!
//! This crate follows Clean Architecture / Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): Models, ports, and errors
//! - **Service Layer** (`services`): Cache, limiter, pricing, key builders
//! - **Infrastructure Layer** (`infrastructure`): Clocks, configuration
//!   loading, logging, usage sinks
//!
//! All state is process-local: in a horizontally scaled deployment each
//! instance holds an independent cache and accumulator view.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use costguard::{
//!     cache_keys, CacheOptions, CacheStore, ConfigLoader, MemoryCache,
//!     ReserveOutcome, SystemClock, Tier, TracingUsageSink, UsageLimiter,
//! };
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ConfigLoader::load()?;
//!     let clock = Arc::new(SystemClock::new());
//!     let cache = MemoryCache::new(&config.cache, clock.clone());
//!     let limiter = UsageLimiter::new(
//!         config.limits.clone(),
//!         clock,
//!         Arc::new(TracingUsageSink::new()),
//!     );
//!
//!     match limiter.try_reserve("user-1", Tier::GrowthTeam, 0.05).await {
//!         ReserveOutcome::Granted(reservation) => {
//!             // ... perform the AI call, cache the result, then settle
//!             // the reservation with actual token counts and cost.
//!         }
//!         ReserveOutcome::Denied(decision) => {
//!             // Surface decision.reason to the end user.
//!         }
//!     }
//!     Ok(())
//! }
//! ```

pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::errors::{DomainError, DomainResult};
pub use domain::models::cache::{ttl, CacheOptions, CacheStats};
pub use domain::models::config::{
    CacheConfig, Config, GlobalCeilings, LimitsConfig, LogFormat, LoggingConfig, RotationPolicy,
};
pub use domain::models::decision::{
    CostRemaining, DenyReason, LimitDecision, RequestsRemaining, WindowResets,
};
pub use domain::models::tier::{CostCeilings, RequestCeilings, Tier, TierLimits};
pub use domain::models::usage::{GlobalCosts, UsageRecord, UsageStats};
pub use domain::ports::{CacheStore, Clock, NullUsageSink, UsageSink};
pub use infrastructure::clock::{MockClock, SystemClock};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use infrastructure::logging::Logger;
pub use infrastructure::sink::{MemoryUsageSink, TracingUsageSink};
pub use services::cache_keys;
pub use services::limiter::{Reservation, ReserveOutcome, UsageLimiter};
pub use services::memory_cache::MemoryCache;
pub use services::pricing::{estimate_cost, model_pricing, ModelPricing};
