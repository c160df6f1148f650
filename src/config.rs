// src/config.rs

//! Manages configuration: loading from TOML and validation.

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::fs;
use std::time::Duration;
use tracing::warn;

/// Settings for probing individual daemons.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ProbeConfig {
    /// Upper bound on a single probe, including connect time.
    #[serde(with = "humantime_serde", default = "default_probe_timeout")]
    pub timeout: Duration,
    /// How many peer probes may run at once.
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
    /// The HTTP path daemons serve their ring from.
    #[serde(default = "default_probe_path")]
    pub path: String,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout: default_probe_timeout(),
            max_concurrent: default_max_concurrent(),
            path: default_probe_path(),
        }
    }
}

fn default_probe_timeout() -> Duration {
    Duration::from_secs(5)
}
fn default_max_concurrent() -> usize {
    8
}
fn default_probe_path() -> String {
    "/hashring/".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}

/// The resolved and validated configuration.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Config {
    /// The `host:port` of the daemon discovery starts from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<String>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub probe: ProbeConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            seed: None,
            log_level: default_log_level(),
            probe: ProbeConfig::default(),
        }
    }
}

impl Config {
    /// Creates a new `Config` instance by reading and parsing a TOML file.
    pub fn from_file(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file at '{path}'"))?;
        Self::from_toml(&contents).with_context(|| format!("Invalid config in '{path}'"))
    }

    /// Parses and validates a TOML document.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents).context("Failed to parse TOML")?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration to ensure logical consistency.
    pub fn validate(&self) -> Result<()> {
        if self.probe.timeout.is_zero() {
            return Err(anyhow!("probe.timeout cannot be 0"));
        }
        if self.probe.max_concurrent == 0 {
            return Err(anyhow!("probe.max_concurrent cannot be 0"));
        }
        if !self.probe.path.starts_with('/') {
            return Err(anyhow!("probe.path must start with '/'"));
        }
        if let Some(seed) = &self.seed
            && seed.trim().is_empty()
        {
            return Err(anyhow!("seed cannot be empty"));
        }
        if self.probe.timeout > Duration::from_secs(60) {
            warn!(
                "probe.timeout is {:?}; a single unreachable daemon will stall discovery that long.",
                self.probe.timeout
            );
        }
        Ok(())
    }
}
