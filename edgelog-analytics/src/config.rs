//! Analytics configuration — loaded from TOML, passed explicitly to each component.
//!
//! Every field has a default, so a partial file (or no file) is valid:
//!
//! ```toml
//! [metrics]
//! notional_capital = 25000.0
//!
//! [tags]
//! combine = true
//! combination_level = 3
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors from loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Bounds accepted for `tags.combination_level`.
pub const MIN_COMBINATION_LEVEL: usize = 2;
pub const MAX_COMBINATION_LEVEL: usize = 5;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub tags: TagConfig,
    #[serde(default)]
    pub risk: RiskConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

/// Inputs to ratio metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Fixed capital used to turn daily P&L into daily returns.
    #[serde(default = "default_notional_capital")]
    pub notional_capital: f64,
    /// Annualization factor for the Sharpe ratio.
    #[serde(default = "default_trading_days_per_year")]
    pub trading_days_per_year: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagConfig {
    /// Run combination analysis in addition to single-tag analysis.
    #[serde(default)]
    pub combine: bool,
    #[serde(default = "default_combination_level")]
    pub combination_level: usize,
    /// Combination groups kept in the output (top N by total P&L).
    #[serde(default = "default_max_combination_results")]
    pub max_combination_results: usize,
    /// Distinct combination keys tracked before new keys are dropped.
    #[serde(default = "default_max_tracked_groups")]
    pub max_tracked_groups: usize,
    /// Subsets generated across all trades before generation stops.
    #[serde(default = "default_max_generated_combinations")]
    pub max_generated_combinations: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskConfig {
    /// Trades risking more than this amount are flagged.
    #[serde(default = "default_max_allowed_risk")]
    pub max_allowed_risk: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default = "default_top_symbols")]
    pub top_symbols: usize,
    #[serde(default = "default_recent_trades")]
    pub recent_trades: usize,
}

fn default_notional_capital() -> f64 {
    10_000.0
}
fn default_trading_days_per_year() -> u32 {
    252
}
fn default_combination_level() -> usize {
    MIN_COMBINATION_LEVEL
}
fn default_max_combination_results() -> usize {
    1_000
}
fn default_max_tracked_groups() -> usize {
    50_000
}
fn default_max_generated_combinations() -> usize {
    250_000
}
fn default_max_allowed_risk() -> f64 {
    1.0
}
fn default_top_symbols() -> usize {
    6
}
fn default_recent_trades() -> usize {
    5
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            notional_capital: default_notional_capital(),
            trading_days_per_year: default_trading_days_per_year(),
        }
    }
}

impl Default for TagConfig {
    fn default() -> Self {
        Self {
            combine: false,
            combination_level: default_combination_level(),
            max_combination_results: default_max_combination_results(),
            max_tracked_groups: default_max_tracked_groups(),
            max_generated_combinations: default_max_generated_combinations(),
        }
    }
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            max_allowed_risk: default_max_allowed_risk(),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            top_symbols: default_top_symbols(),
            recent_trades: default_recent_trades(),
        }
    }
}

impl TagConfig {
    /// Combination level clamped into the supported range.
    pub fn effective_level(level: usize) -> usize {
        level.clamp(MIN_COMBINATION_LEVEL, MAX_COMBINATION_LEVEL)
    }
}

impl AnalyticsConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.metrics.notional_capital.is_finite() && self.metrics.notional_capital > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "metrics.notional_capital must be positive, got {}",
                self.metrics.notional_capital
            )));
        }
        if self.metrics.trading_days_per_year == 0 {
            return Err(ConfigError::Invalid(
                "metrics.trading_days_per_year must be at least 1".into(),
            ));
        }
        let level = self.tags.combination_level;
        if !(MIN_COMBINATION_LEVEL..=MAX_COMBINATION_LEVEL).contains(&level) {
            return Err(ConfigError::Invalid(format!(
                "tags.combination_level must be in {MIN_COMBINATION_LEVEL}..={MAX_COMBINATION_LEVEL}, got {level}"
            )));
        }
        if self.tags.max_combination_results == 0
            || self.tags.max_tracked_groups == 0
            || self.tags.max_generated_combinations == 0
        {
            return Err(ConfigError::Invalid(
                "tags.max_combination_results, tags.max_tracked_groups and tags.max_generated_combinations must be at least 1".into(),
            ));
        }
        if !self.risk.max_allowed_risk.is_finite() || self.risk.max_allowed_risk < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "risk.max_allowed_risk must be non-negative, got {}",
                self.risk.max_allowed_risk
            )));
        }
        Ok(())
    }
}
