//! Port for durable usage accounting backends.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::usage::UsageRecord;

/// Append-only sink for usage records.
///
/// Async to match a future durable backend; today's implementations are
/// in-process. Records are best-effort telemetry, not a billing ledger:
/// the limiter swallows and logs append failures rather than failing the
/// caller's request.
#[async_trait]
pub trait UsageSink: Send + Sync {
    /// Append one record.
    async fn append(&self, record: &UsageRecord) -> DomainResult<()>;
}

/// Sink that drops every record.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullUsageSink;

impl NullUsageSink {
    /// Create a null sink.
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl UsageSink for NullUsageSink {
    async fn append(&self, _record: &UsageRecord) -> DomainResult<()> {
        Ok(())
    }
}
