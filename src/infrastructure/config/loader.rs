use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use crate::domain::models::config::Config;
use crate::domain::models::tier::Tier;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid default TTL: {0}. Must be -1 (never expires) or a positive number of seconds")]
    InvalidDefaultTtl(i64),

    #[error("Invalid retention_days: {0}. Must be at least 1")]
    InvalidRetention(u32),

    #[error("Invalid cost ceiling for tier {tier}: {value}. Ceilings must be finite and non-negative")]
    InvalidCostCeiling { tier: Tier, value: f64 },

    #[error("Invalid global ceilings: daily {daily} and monthly {monthly} must be finite and non-negative")]
    InvalidGlobalCeilings { daily: f64, monthly: f64 },

    #[error(
        "Tier ordering violated: {higher} {ceiling} ceiling ({higher_value}) is below {lower} ({lower_value})"
    )]
    TierOrdering {
        lower: Tier,
        higher: Tier,
        ceiling: &'static str,
        lower_value: String,
        higher_value: String,
    },
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .costguard/config.yaml (project config)
    /// 3. .costguard/local.yaml (project local overrides, optional)
    /// 4. Environment variables (COSTGUARD_* prefix, highest priority)
    pub fn load() -> Result<Config> {
        let config: Config = Figment::new()
            // 1. Start with programmatic defaults
            .merge(Serialized::defaults(Config::default()))
            // 2. Merge project config
            .merge(Yaml::file(".costguard/config.yaml"))
            // 3. Merge project local overrides (optional, for dev/test overrides)
            .merge(Yaml::file(".costguard/local.yaml"))
            // 4. Merge environment variables (highest priority)
            .merge(Env::prefixed("COSTGUARD_").split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .extract()
            .context(format!(
                "Failed to load config from {}",
                path.as_ref().display()
            ))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    ///
    /// A misconfigured ceiling table must fail startup loudly rather than
    /// silently under-limit a tier, so dominance across the tier order is
    /// checked here and not at decision time.
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        // Validate logging config
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        // Validate cache config
        let ttl = config.cache.default_ttl_seconds;
        if ttl != -1 && ttl <= 0 {
            return Err(ConfigError::InvalidDefaultTtl(ttl));
        }

        // Validate limits config
        if config.limits.retention_days == 0 {
            return Err(ConfigError::InvalidRetention(0));
        }

        for (tier, limits) in &config.limits.tiers {
            for value in [limits.cost.daily, limits.cost.monthly] {
                if !value.is_finite() || value < 0.0 {
                    return Err(ConfigError::InvalidCostCeiling { tier: *tier, value });
                }
            }
        }

        let global = config.limits.global;
        if !global.daily.is_finite()
            || !global.monthly.is_finite()
            || global.daily < 0.0
            || global.monthly < 0.0
        {
            return Err(ConfigError::InvalidGlobalCeilings {
                daily: global.daily,
                monthly: global.monthly,
            });
        }

        Self::validate_tier_ordering(config)
    }

    /// Check that every ceiling is non-decreasing across the tier order.
    fn validate_tier_ordering(config: &Config) -> Result<(), ConfigError> {
        for pair in Tier::ORDERED.windows(2) {
            let (lower, higher) = (pair[0], pair[1]);
            let (Some(lower_limits), Some(higher_limits)) = (
                config.limits.tiers.get(&lower),
                config.limits.tiers.get(&higher),
            ) else {
                continue;
            };

            let request_ceilings = [
                ("hourly_requests", lower_limits.requests.hourly, higher_limits.requests.hourly),
                ("daily_requests", lower_limits.requests.daily, higher_limits.requests.daily),
                ("monthly_requests", lower_limits.requests.monthly, higher_limits.requests.monthly),
            ];
            for (ceiling, lower_value, higher_value) in request_ceilings {
                // `None` is unlimited; a finite ceiling above an unlimited
                // one is a decrease.
                let violated = match (lower_value, higher_value) {
                    (Some(lo), Some(hi)) => hi < lo,
                    (None, Some(_)) => true,
                    _ => false,
                };
                if violated {
                    return Err(ConfigError::TierOrdering {
                        lower,
                        higher,
                        ceiling,
                        lower_value: format_ceiling(lower_value),
                        higher_value: format_ceiling(higher_value),
                    });
                }
            }

            let cost_ceilings = [
                ("daily_cost", lower_limits.cost.daily, higher_limits.cost.daily),
                ("monthly_cost", lower_limits.cost.monthly, higher_limits.cost.monthly),
            ];
            for (ceiling, lower_value, higher_value) in cost_ceilings {
                if higher_value < lower_value {
                    return Err(ConfigError::TierOrdering {
                        lower,
                        higher,
                        ceiling,
                        lower_value: lower_value.to_string(),
                        higher_value: higher_value.to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}

fn format_ceiling(value: Option<u32>) -> String {
    value.map_or_else(|| "unlimited".to_string(), |v| v.to_string())
}
