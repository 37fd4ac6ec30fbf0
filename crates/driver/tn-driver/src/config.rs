//! Driver configuration

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tn_opt::PipelineConfig;

/// Which stages [`compile`](crate::compile) runs
///
/// ```toml
/// optimize_before_lowering = true
/// validate = true
///
/// [optimize]
/// max_iterations = 16
/// dead_code = false
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Rewrite passes and their iteration budget
    pub optimize: PipelineConfig,
    /// Run the rewrite passes on the syntax tree before lowering
    pub optimize_before_lowering: bool,
    /// Validate the lowered module
    pub validate: bool,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            optimize: PipelineConfig::default(),
            optimize_before_lowering: default_true(),
            validate: default_true(),
        }
    }
}

fn default_true() -> bool {
    true
}

impl DriverConfig {
    /// Parses a configuration; missing keys take their defaults
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Reads and parses a configuration file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_toml_str(&text).with_context(|| format!("failed to parse {}", path.display()))
    }
}

/// Configuration that could not be read
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Malformed TOML or a wrongly typed key
    #[error("invalid driver configuration: {0}")]
    Toml(#[from] toml::de::Error),
}
