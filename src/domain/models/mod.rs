//! Domain models.

pub mod cache;
pub mod config;
pub mod decision;
pub mod tier;
pub mod usage;

pub use cache::{CacheOptions, CacheStats};
pub use config::{CacheConfig, Config, GlobalCeilings, LimitsConfig, LoggingConfig};
pub use decision::{CostRemaining, DenyReason, LimitDecision, RequestsRemaining, WindowResets};
pub use tier::{CostCeilings, RequestCeilings, Tier, TierLimits};
pub use usage::{GlobalCosts, UsageRecord, UsageStats};
