//! Library configuration models.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use super::cache::ttl;
use super::tier::{Tier, TierLimits};

/// Main configuration structure for costguard.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Rate/cost ceiling configuration.
    #[serde(default)]
    pub limits: LimitsConfig,

    /// Cache configuration.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Ceiling tables consulted by the limiter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LimitsConfig {
    /// Per-tier ceilings. Defaults to the platform's billing plans.
    #[serde(default = "default_tiers")]
    pub tiers: BTreeMap<Tier, TierLimits>,

    /// Platform-wide cost ceilings, applied across all users.
    #[serde(default)]
    pub global: GlobalCeilings,

    /// Days of usage history retained in memory for window accounting.
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,
}

fn default_tiers() -> BTreeMap<Tier, TierLimits> {
    Tier::ORDERED
        .into_iter()
        .map(|tier| (tier, TierLimits::builtin(tier)))
        .collect()
}

const fn default_retention_days() -> u32 {
    31
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            tiers: default_tiers(),
            global: GlobalCeilings::default(),
            retention_days: default_retention_days(),
        }
    }
}

/// Platform-wide cost ceilings in USD.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct GlobalCeilings {
    /// Spend allowed across all users in the current day.
    #[serde(default = "default_global_daily")]
    pub daily: f64,

    /// Spend allowed across all users in the current month.
    #[serde(default = "default_global_monthly")]
    pub monthly: f64,
}

const fn default_global_daily() -> f64 {
    1000.0
}

const fn default_global_monthly() -> f64 {
    25_000.0
}

impl Default for GlobalCeilings {
    fn default() -> Self {
        Self {
            daily: default_global_daily(),
            monthly: default_global_monthly(),
        }
    }
}

/// Cache configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CacheConfig {
    /// TTL applied when a write specifies none. `-1` never expires.
    #[serde(default = "default_ttl_seconds")]
    pub default_ttl_seconds: i64,
}

const fn default_ttl_seconds() -> i64 {
    ttl::MEDIUM
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl_seconds: default_ttl_seconds(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format for stdout.
    #[serde(default = "default_log_format")]
    pub format: LogFormat,

    /// Directory for log files. `None` logs to stdout only.
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    /// Enable stdout logging alongside any file output.
    #[serde(default = "default_true")]
    pub enable_stdout: bool,

    /// Log file rotation policy.
    #[serde(default)]
    pub rotation: RotationPolicy,
}

/// Stdout log rendering.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Structured JSON lines.
    Json,
    /// Human-readable multi-line output.
    Pretty,
}

/// Log file rotation policy.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RotationPolicy {
    /// Rotate at midnight.
    #[default]
    Daily,
    /// Rotate at the top of every hour.
    Hourly,
    /// Never rotate.
    Never,
}

fn default_log_level() -> String {
    "info".to_string()
}

const fn default_log_format() -> LogFormat {
    LogFormat::Json
}

const fn default_true() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
            enable_stdout: default_true(),
            rotation: RotationPolicy::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tier_table_covers_all_tiers() {
        let config = LimitsConfig::default();
        for tier in Tier::ORDERED {
            assert!(config.tiers.contains_key(&tier), "missing {tier}");
        }
    }

    #[test]
    fn test_default_trial_ceilings_match_billing_plans() {
        let config = LimitsConfig::default();
        let trial = &config.tiers[&Tier::Trial];
        assert_eq!(trial.requests.hourly, Some(5));
        assert_eq!(trial.requests.daily, Some(20));
        assert_eq!(trial.requests.monthly, Some(100));
        assert!((trial.cost.daily - 1.0).abs() < f64::EPSILON);
        assert!((trial.cost.monthly - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_config_yaml_roundtrip() {
        let yaml = r"
limits:
  global:
    daily: 500.0
  retention_days: 14
cache:
  default_ttl_seconds: 600
logging:
  level: debug
  format: pretty
";
        let config: Config = serde_yaml::from_str(yaml).expect("YAML should parse");
        assert!((config.limits.global.daily - 500.0).abs() < f64::EPSILON);
        assert!((config.limits.global.monthly - 25_000.0).abs() < f64::EPSILON);
        assert_eq!(config.limits.retention_days, 14);
        assert_eq!(config.cache.default_ttl_seconds, 600);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }
}
