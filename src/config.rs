// Copyright 2025 N. Dornseif
//
// Dual-licensed under Apache 2.0 and MIT terms.

//! Recovery settings parsed from a TOML file.

use std::path::Path;

use serde::Deserialize;

use crate::conditioning::PortRange;
use crate::error::{ConfigError, Result};

/// Assumed ephemeral port range and output settings.
/// Missing keys fall back to the Linux defaults of `net.ipv4.ip_local_port_range`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Low end of the port range (inclusive).
    pub low: u32,
    /// High end of the port range (inclusive).
    pub high: u32,
    /// Number of future ports to predict.
    pub predictions: usize,
    /// Upper limit on samples the simulator and trials draw.
    pub max_samples: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            low: 32768,
            high: 60999,
            predictions: 6,
            max_samples: 16,
        }
    }
}

impl Config {
    /// Load configuration from a TOML string.
    pub fn from_toml(s: &str) -> std::result::Result<Self, ConfigError> {
        let config: Config = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file path.
    pub fn from_file(path: &Path) -> std::result::Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn validate(&self) -> Result<()> {
        self.range().map(|_| ())
    }

    pub fn range(&self) -> Result<PortRange> {
        PortRange::new(self.low, self.high)
    }
}
