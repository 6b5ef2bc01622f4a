//! Registry configuration types.
//!
//! `RegistryConfig` represents the `buildstate.toml` file that controls the
//! maintenance sweep cadence and log output format.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::RegistryError;

/// Top-level registry configuration. All fields have sensible defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistryConfig {
    #[serde(default)]
    pub sweep: SweepConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl RegistryConfig {
    /// Reject values the maintenance task cannot run with.
    pub fn validate(&self) -> Result<(), RegistryError> {
        if self.sweep.interval_secs == 0 {
            return Err(RegistryError::InvalidConfig(
                "sweep.interval_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Age-based eviction of finished builds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepConfig {
    /// Terminal entries untouched for longer than this are evicted.
    #[serde(default = "default_max_age_secs")]
    pub max_age_secs: u64,

    /// How often the maintenance task runs.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_max_age_secs() -> u64 {
    3600
}

fn default_interval_secs() -> u64 {
    300
}

fn default_enabled() -> bool {
    true
}

impl SweepConfig {
    pub fn max_age(&self) -> Duration {
        Duration::from_secs(self.max_age_secs)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            max_age_secs: default_max_age_secs(),
            interval_secs: default_interval_secs(),
            enabled: default_enabled(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Emit JSON log lines instead of human-readable text.
    #[serde(default)]
    pub json: bool,
}
