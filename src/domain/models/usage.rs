//! Usage accounting records and per-user statistics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::tier::Tier;

/// A single completed AI action, the unit of usage accounting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageRecord {
    /// Unique identifier for this record.
    pub id: Uuid,
    /// User that triggered the action.
    pub user_id: String,
    /// Owning tenant, when known.
    pub tenant_id: Option<String>,
    /// When the action completed.
    pub at: DateTime<Utc>,
    /// Model identifier, e.g. `"claude"` or `"gpt-4"`.
    pub model: String,
    /// Prompt-side token count.
    pub prompt_tokens: u64,
    /// Completion-side token count.
    pub completion_tokens: u64,
    /// Actual cost in USD.
    pub cost_usd: f64,
    /// Feature that consumed the action, e.g. `"content-generation"`.
    pub feature: String,
    /// Subscription tier at the time of the action.
    pub tier: Tier,
}

/// Per-user usage in the current hour/day/month windows.
///
/// Counts cover recorded actions only; outstanding reservations are a
/// limiter-internal concern and do not appear here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageStats {
    /// Actions in the current hour.
    pub hourly: u64,
    /// Actions in the current day.
    pub daily: u64,
    /// Actions in the current month.
    pub monthly: u64,
    /// Spend in the current day, USD.
    pub daily_cost: f64,
    /// Spend in the current month, USD.
    pub monthly_cost: f64,
}

/// Platform-wide spend in the current day/month windows, USD.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GlobalCosts {
    /// Spend across all users in the current day.
    pub daily: f64,
    /// Spend across all users in the current month.
    pub monthly: f64,
}
