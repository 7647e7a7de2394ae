//! Rate-limit decisions and structured denial reasons.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which ceiling a denied limit check ran into.
///
/// Route handlers format user-facing text from this; the `Display`
/// rendering is a reasonable default message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
    /// The subscription tier is not recognized or has no configured limits.
    UnknownTier,
    /// Hourly request ceiling reached.
    HourlyRequests,
    /// Daily request ceiling reached.
    DailyRequests,
    /// Monthly request ceiling reached.
    MonthlyRequests,
    /// Daily cost ceiling would be exceeded.
    DailyCost,
    /// Monthly cost ceiling would be exceeded.
    MonthlyCost,
    /// Platform-wide daily budget would be exceeded.
    GlobalDailyCost,
    /// Platform-wide monthly budget would be exceeded.
    GlobalMonthlyCost,
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::UnknownTier => "Unrecognized subscription tier",
            Self::HourlyRequests => "Hourly AI request limit reached for your plan",
            Self::DailyRequests => "Daily AI request limit reached for your plan",
            Self::MonthlyRequests => "Monthly AI request limit reached for your plan",
            Self::DailyCost => "Daily AI cost limit reached for your plan",
            Self::MonthlyCost => "Monthly AI cost limit reached for your plan",
            Self::GlobalDailyCost => "Platform-wide daily AI budget exhausted",
            Self::GlobalMonthlyCost => "Platform-wide monthly AI budget exhausted",
        };
        f.write_str(msg)
    }
}

/// Remaining request allowance per window. `None` means unlimited.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestsRemaining {
    /// Requests left in the current hour.
    pub hourly: Option<u32>,
    /// Requests left in the current day.
    pub daily: Option<u32>,
    /// Requests left in the current month.
    pub monthly: Option<u32>,
}

/// Remaining per-user spend allowance, USD.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CostRemaining {
    /// Spend left in the current day.
    pub daily: f64,
    /// Spend left in the current month.
    pub monthly: f64,
}

/// When each window rolls over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowResets {
    /// Start of the next hour.
    pub hourly: DateTime<Utc>,
    /// Start of the next day.
    pub daily: DateTime<Utc>,
    /// Start of the next month.
    pub monthly: DateTime<Utc>,
}

/// Outcome of a limit check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitDecision {
    /// Whether the prospective action may proceed.
    pub allowed: bool,
    /// Which ceiling blocked it, when denied.
    pub reason: Option<DenyReason>,
    /// Remaining request allowance per window.
    pub remaining: RequestsRemaining,
    /// When each window resets.
    pub reset_at: WindowResets,
    /// Remaining per-user spend allowance.
    pub cost_remaining: CostRemaining,
}

impl LimitDecision {
    /// Denial carrying `reason`, with everything else zeroed.
    pub fn denied(reason: DenyReason, reset_at: WindowResets) -> Self {
        Self {
            allowed: false,
            reason: Some(reason),
            remaining: RequestsRemaining {
                hourly: Some(0),
                daily: Some(0),
                monthly: Some(0),
            },
            reset_at,
            cost_remaining: CostRemaining::default(),
        }
    }
}
