//! Configuration parsing for FID collection runs
//!
//! This module provides TOML-based configuration for the collector (how long
//! to wait for a first input) and an optional pass/fail threshold applied to
//! collected metrics.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use vitals_core::Metric;

/// Configuration validation failures
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("collector.wait_timeout_ms must be greater than zero")]
    ZeroWaitTimeout,
}

/// Main configuration structure loaded from TOML files
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Collector settings
    #[serde(default)]
    pub collector: CollectorConfig,
    /// Performance metric thresholds
    #[serde(default)]
    pub thresholds: ThresholdsConfig,
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, the TOML is malformed,
    /// or validation fails.
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or validation fails.
    ///
    /// # Example
    ///
    /// ```
    /// use vitals_harness::config::Config;
    ///
    /// # fn example() -> anyhow::Result<()> {
    /// let toml = r#"
    ///     [collector]
    ///     wait_timeout_ms = 10000
    ///
    ///     [thresholds]
    ///     max_fid_ms = 100.0
    /// "#;
    /// let config = Config::from_str(toml)?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_str(s: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(s).context("Failed to parse TOML configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Validate parsed values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.collector.wait_timeout_ms == 0 {
            return Err(ConfigError::ZeroWaitTimeout);
        }
        Ok(())
    }

    /// Threshold failures for a collected metric; empty when passing
    pub fn check(&self, metric: &Metric) -> Vec<String> {
        let mut failures = Vec::new();
        if let (Some(max), Some(value)) = (self.thresholds.max_fid_ms, metric.value) {
            if value > max {
                failures.push(format!(
                    "FID {:.1}ms exceeds threshold {:.1}ms",
                    value, max
                ));
            }
        }
        failures
    }
}

/// Collector settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectorConfig {
    /// How long to wait for a first input before giving up (default: 30000)
    #[serde(default = "default_wait_timeout_ms")]
    pub wait_timeout_ms: u64,
}

impl CollectorConfig {
    /// The wait timeout as a [`Duration`]
    pub fn wait_timeout(&self) -> Duration {
        Duration::from_millis(self.wait_timeout_ms)
    }
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            wait_timeout_ms: default_wait_timeout_ms(),
        }
    }
}

fn default_wait_timeout_ms() -> u64 {
    30_000
}

/// Performance metric thresholds for pass/fail determination
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ThresholdsConfig {
    /// Maximum acceptable first input delay in milliseconds
    pub max_fid_ms: Option<f64>,
}
