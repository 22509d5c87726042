use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("failed to parse configuration: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Limits applied to selections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    /// Longest line a single pick may select.
    pub max_line_length: usize,
    /// Most voxels a direct contour search may select.
    pub max_contour_count: usize,
    /// Most voxels a direct flood fill may select.
    pub max_fill_count: usize,
    /// Inset of an unbounded fill's region from the 256 voxel cap.
    pub border_allowance: i32,
    /// Time a host should hand the driver per tick, in milliseconds.
    pub time_budget_ms: u64,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            max_line_length: 64,
            max_contour_count: 1024,
            max_fill_count: 4096,
            border_allowance: 2,
            time_budget_ms: 20,
        }
    }
}

fn parse_or<T: std::str::FromStr>(value: Option<String>, default: T) -> T {
    value.and_then(|v| v.parse().ok()).unwrap_or(default)
}

impl SelectionConfig {
    /// Builds a configuration from `VOXSEL_*` environment variables, falling
    /// back to the defaults for anything unset or unparsable.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`SelectionConfig::from_env`] with a custom variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let config = Self {
            max_line_length: parse_or(lookup("VOXSEL_MAX_LINE"), defaults.max_line_length),
            max_contour_count: parse_or(lookup("VOXSEL_MAX_CONTOUR"), defaults.max_contour_count),
            max_fill_count: parse_or(lookup("VOXSEL_MAX_FILL"), defaults.max_fill_count),
            border_allowance: parse_or(lookup("VOXSEL_BORDER"), defaults.border_allowance),
            time_budget_ms: parse_or(lookup("VOXSEL_TIME_BUDGET_MS"), defaults.time_budget_ms),
        };
        config.validate()?;
        Ok(config)
    }

    /// Parses a TOML document; missing fields keep their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_line_length == 0 || self.max_contour_count == 0 || self.max_fill_count == 0 {
            return Err(ConfigError::Invalid("selection caps must be at least 1".into()));
        }
        if !(0..128).contains(&self.border_allowance) {
            return Err(ConfigError::Invalid(format!(
                "border allowance {} must be in 0..128",
                self.border_allowance
            )));
        }
        Ok(())
    }

    pub fn time_budget(&self) -> Duration {
        Duration::from_millis(self.time_budget_ms)
    }
}
