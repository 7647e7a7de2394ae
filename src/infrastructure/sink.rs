//! Usage sink adapters.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use crate::domain::errors::DomainResult;
use crate::domain::models::usage::UsageRecord;
use crate::domain::ports::UsageSink;

/// Sink that emits each record as a structured log line.
///
/// Stands in for a durable accounting backend; swap in a database-backed
/// implementation without touching the limiter.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingUsageSink;

impl TracingUsageSink {
    /// Create a tracing sink.
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl UsageSink for TracingUsageSink {
    async fn append(&self, record: &UsageRecord) -> DomainResult<()> {
        info!(
            target: "costguard::usage",
            user = %record.user_id,
            tenant = record.tenant_id.as_deref().unwrap_or("-"),
            model = %record.model,
            prompt_tokens = record.prompt_tokens,
            completion_tokens = record.completion_tokens,
            cost_usd = record.cost_usd,
            feature = %record.feature,
            tier = %record.tier,
            "ai usage recorded"
        );
        Ok(())
    }
}

/// Sink that captures records in memory, for tests and embedders that
/// batch their own persistence.
#[derive(Debug, Clone, Default)]
pub struct MemoryUsageSink {
    records: Arc<RwLock<Vec<UsageRecord>>>,
}

impl MemoryUsageSink {
    /// Create an empty capture sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything appended so far.
    pub async fn records(&self) -> Vec<UsageRecord> {
        self.records.read().await.clone()
    }
}

#[async_trait]
impl UsageSink for MemoryUsageSink {
    async fn append(&self, record: &UsageRecord) -> DomainResult<()> {
        self.records.write().await.push(record.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::tier::Tier;
    use chrono::Utc;
    use uuid::Uuid;

    fn make_record() -> UsageRecord {
        UsageRecord {
            id: Uuid::new_v4(),
            user_id: "u1".to_string(),
            tenant_id: None,
            at: Utc::now(),
            model: "claude".to_string(),
            prompt_tokens: 100,
            completion_tokens: 50,
            cost_usd: 0.01,
            feature: "chat".to_string(),
            tier: Tier::Trial,
        }
    }

    #[tokio::test]
    async fn test_memory_sink_captures_records() {
        let sink = MemoryUsageSink::new();
        sink.append(&make_record()).await.unwrap();
        sink.append(&make_record()).await.unwrap();
        assert_eq!(sink.records().await.len(), 2);
    }

    #[tokio::test]
    async fn test_tracing_sink_never_fails() {
        let sink = TracingUsageSink::new();
        assert!(sink.append(&make_record()).await.is_ok());
    }
}
