// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Coordinator tuning knobs
//!
//! Loaded from TOML with human-readable durations:
//!
//! ```toml
//! retry_count = 3
//! retry_delay = "200ms"
//! clock_drift_factor = 0.01
//! clock_drift_fixed = "2ms"
//! store_timeout = "50ms"
//! ```

use crate::error::ConfigError;
use crate::retry::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Retry and clock-drift settings for a [`crate::QuorumCoordinator`]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoordinatorConfig {
    /// Maximum number of acquisition rounds
    pub retry_count: u32,
    /// Upper bound of the random pause between rounds
    #[serde(with = "humantime_serde")]
    pub retry_delay: Duration,
    /// Fraction of the TTL reserved for clock drift between stores
    pub clock_drift_factor: f64,
    /// Fixed drift allowance for store expiry precision
    #[serde(with = "humantime_serde")]
    pub clock_drift_fixed: Duration,
    /// Bound on a single store call
    #[serde(with = "humantime_serde")]
    pub store_timeout: Duration,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            retry_count: 3,
            retry_delay: Duration::from_millis(200),
            clock_drift_factor: 0.01,
            clock_drift_fixed: Duration::from_millis(2),
            store_timeout: Duration::from_millis(50),
        }
    }
}

impl CoordinatorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_retry_count(mut self, count: u32) -> Self {
        self.retry_count = count;
        self
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub fn with_clock_drift(mut self, factor: f64, fixed: Duration) -> Self {
        self.clock_drift_factor = factor;
        self.clock_drift_fixed = fixed;
        self
    }

    pub fn with_store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = timeout;
        self
    }

    /// Parse and validate a TOML document; missing keys take defaults
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse, and validate a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.retry_count == 0 {
            return Err(ConfigError::Invalid("retry_count must be at least 1".to_string()));
        }
        if !self.clock_drift_factor.is_finite()
            || self.clock_drift_factor < 0.0
            || self.clock_drift_factor >= 1.0
        {
            return Err(ConfigError::Invalid(format!(
                "clock_drift_factor must be in [0, 1), got {}",
                self.clock_drift_factor
            )));
        }
        if self.store_timeout.is_zero() {
            return Err(ConfigError::Invalid("store_timeout must be positive".to_string()));
        }
        Ok(())
    }

    /// Drift allowance for a lock of the given TTL:
    /// `ttl * clock_drift_factor + clock_drift_fixed`.
    ///
    /// Saturates at `Duration::MAX` when the product is out of range or not a
    /// number, so a bad factor can only shrink validity.
    pub fn drift_for(&self, ttl: Duration) -> Duration {
        let proportional = ttl.as_secs_f64() * self.clock_drift_factor;
        let proportional = if proportional.is_nan() {
            Duration::MAX
        } else if proportional <= 0.0 {
            Duration::ZERO
        } else {
            Duration::try_from_secs_f64(proportional).unwrap_or(Duration::MAX)
        };
        proportional.saturating_add(self.clock_drift_fixed)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.retry_count, self.retry_delay)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
