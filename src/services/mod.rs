//! Service layer: cache, limiter, pricing, and key builders.

pub mod cache_keys;
pub mod limiter;
pub mod memory_cache;
pub mod pricing;

pub use limiter::{Reservation, ReserveOutcome, UsageLimiter};
pub use memory_cache::MemoryCache;
