//! Configuration for the diff engine.
//!
//! `DiffConfig` centralizes the comparison knobs so no thresholds are
//! hardcoded inside the engine or the comparator.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default maximum absolute numeric difference treated as "no change".
pub const DEFAULT_NUMERIC_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffConfig {
    /// Numeric cells differing by at most this much compare as unchanged.
    pub numeric_tolerance: f64,
    /// Compare normalized text ignoring ASCII case. Default is
    /// case-sensitive.
    pub case_insensitive: bool,
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            numeric_tolerance: DEFAULT_NUMERIC_TOLERANCE,
            case_insensitive: false,
        }
    }
}

impl DiffConfig {
    /// Preset with zero numeric tolerance: any numeric difference counts.
    pub fn exact() -> Self {
        Self {
            numeric_tolerance: 0.0,
            ..Default::default()
        }
    }

    pub fn builder() -> DiffConfigBuilder {
        DiffConfigBuilder {
            inner: DiffConfig::default(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.numeric_tolerance.is_finite() || self.numeric_tolerance < 0.0 {
            return Err(ConfigError::InvalidTolerance {
                value: self.numeric_tolerance,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("numeric_tolerance must be finite and non-negative (got {value})")]
    InvalidTolerance { value: f64 },
}

#[derive(Debug, Clone, Default)]
pub struct DiffConfigBuilder {
    inner: DiffConfig,
}

impl DiffConfigBuilder {
    pub fn new() -> Self {
        DiffConfig::builder()
    }

    pub fn numeric_tolerance(mut self, value: f64) -> Self {
        self.inner.numeric_tolerance = value;
        self
    }

    pub fn case_insensitive(mut self, value: bool) -> Self {
        self.inner.case_insensitive = value;
        self
    }

    pub fn build(self) -> Result<DiffConfig, ConfigError> {
        self.inner.validate()?;
        Ok(self.inner)
    }
}
