//! Port for time sources.

use chrono::{DateTime, Utc};
use std::fmt::Debug;
use std::time::Instant;

/// Time source behind the cache and the limiter.
///
/// The cache ages entries against the monotonic `now`; the limiter
/// derives hour/day/month calendar windows from `now_utc` at check time
/// (no background timer owns a counter reset). Tests substitute a
/// controllable implementation.
pub trait Clock: Send + Sync + Debug {
    /// Current monotonic instant.
    fn now(&self) -> Instant;

    /// Current wall-clock time.
    fn now_utc(&self) -> DateTime<Utc>;
}
