//! Subscription tiers and their usage ceilings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::errors::DomainError;

/// Subscription plan level determining usage ceilings.
///
/// Variants are declared from most restrictive to most permissive; the
/// derived ordering is what the configuration loader validates ceiling
/// tables against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// Evaluation accounts with minimal allowances.
    Trial,
    /// Single-seat paid plan.
    SoloProfessional,
    /// Small team plan.
    GrowthTeam,
    /// Agency plan.
    ProfessionalAgency,
    /// Enterprise plan.
    Enterprise,
    /// Enterprise plan with expanded allowances.
    EnterprisePlus,
}

impl Tier {
    /// All tiers in ascending order of entitlement.
    pub const ORDERED: [Self; 6] = [
        Self::Trial,
        Self::SoloProfessional,
        Self::GrowthTeam,
        Self::ProfessionalAgency,
        Self::Enterprise,
        Self::EnterprisePlus,
    ];

    /// Wire name of the tier, as stored in subscription records.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Trial => "trial",
            Self::SoloProfessional => "solo_professional",
            Self::GrowthTeam => "growth_team",
            Self::ProfessionalAgency => "professional_agency",
            Self::Enterprise => "enterprise",
            Self::EnterprisePlus => "enterprise_plus",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tier {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "trial" => Ok(Self::Trial),
            "solo_professional" => Ok(Self::SoloProfessional),
            "growth_team" => Ok(Self::GrowthTeam),
            "professional_agency" => Ok(Self::ProfessionalAgency),
            "enterprise" => Ok(Self::Enterprise),
            "enterprise_plus" => Ok(Self::EnterprisePlus),
            other => Err(DomainError::UnknownTier(other.to_string())),
        }
    }
}

/// Request-count ceilings per calendar window. `None` means unlimited.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RequestCeilings {
    /// Requests allowed in the current hour.
    #[serde(default)]
    pub hourly: Option<u32>,
    /// Requests allowed in the current day.
    #[serde(default)]
    pub daily: Option<u32>,
    /// Requests allowed in the current month.
    #[serde(default)]
    pub monthly: Option<u32>,
}

/// Cost ceilings in USD per calendar window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CostCeilings {
    /// Spend allowed in the current day.
    pub daily: f64,
    /// Spend allowed in the current month.
    pub monthly: f64,
}

/// Ceiling table entry for one tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TierLimits {
    /// Request-count ceilings.
    #[serde(default)]
    pub requests: RequestCeilings,
    /// Cost ceilings.
    pub cost: CostCeilings,
}

impl TierLimits {
    /// Built-in ceilings for `tier`, matching the platform's billing plans.
    pub const fn builtin(tier: Tier) -> Self {
        let (hourly, daily, monthly, cost_daily, cost_monthly) = match tier {
            Tier::Trial => (5, 20, 100, 1.0, 10.0),
            Tier::SoloProfessional => (10, 50, 500, 5.0, 50.0),
            Tier::GrowthTeam => (25, 150, 1500, 15.0, 150.0),
            Tier::ProfessionalAgency => (50, 300, 3000, 30.0, 300.0),
            Tier::Enterprise => (100, 600, 6000, 60.0, 600.0),
            Tier::EnterprisePlus => (200, 1200, 12000, 120.0, 1200.0),
        };
        Self {
            requests: RequestCeilings {
                hourly: Some(hourly),
                daily: Some(daily),
                monthly: Some(monthly),
            },
            cost: CostCeilings { daily: cost_daily, monthly: cost_monthly },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_roundtrip_via_str() {
        for tier in Tier::ORDERED {
            assert_eq!(tier.as_str().parse::<Tier>().unwrap(), tier);
        }
    }

    #[test]
    fn test_unknown_tier_string_rejected() {
        let err = "platinum".parse::<Tier>().unwrap_err();
        assert!(matches!(err, DomainError::UnknownTier(ref s) if s == "platinum"));
    }

    #[test]
    fn test_ordering_matches_entitlement() {
        assert!(Tier::Trial < Tier::SoloProfessional);
        assert!(Tier::Enterprise < Tier::EnterprisePlus);
    }

    #[test]
    fn test_builtin_table_is_monotone() {
        for pair in Tier::ORDERED.windows(2) {
            let lower = TierLimits::builtin(pair[0]);
            let higher = TierLimits::builtin(pair[1]);
            assert!(higher.requests.hourly >= lower.requests.hourly);
            assert!(higher.requests.daily >= lower.requests.daily);
            assert!(higher.requests.monthly >= lower.requests.monthly);
            assert!(higher.cost.daily >= lower.cost.daily);
            assert!(higher.cost.monthly >= lower.cost.monthly);
        }
    }
}
