//! Pipeline configuration

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which passes run and how many traversals are allowed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Upper bound on full traversals
    pub max_iterations: usize,
    /// Run constant folding
    pub constant_folding: bool,
    /// Run dead-code elimination
    pub dead_code: bool,
    /// Run compound-assignment desugaring
    pub desugar: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            constant_folding: true,
            dead_code: true,
            desugar: true,
        }
    }
}

fn default_max_iterations() -> usize {
    16
}

impl PipelineConfig {
    /// Parses a configuration; missing keys take their defaults
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }
}

/// Configuration that could not be read
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Malformed TOML or a wrongly typed key
    #[error("invalid configuration: {0}")]
    Toml(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_keys() {
        let config = PipelineConfig::from_toml_str("dead_code = false").unwrap();
        assert!(!config.dead_code);
        assert!(config.constant_folding);
        assert_eq!(config.max_iterations, 16);
    }

    #[test]
    fn test_empty_is_default() {
        assert_eq!(PipelineConfig::from_toml_str("").unwrap(), PipelineConfig::default());
    }

    #[test]
    fn test_wrong_type_rejected() {
        let err = PipelineConfig::from_toml_str("max_iterations = \"many\"").unwrap_err();
        assert!(err.to_string().starts_with("invalid configuration"));
    }
}
