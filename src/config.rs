//! Allow-list configuration.
//!
//! The set of trusted publisher-name prefixes is deployment configuration,
//! not a compiled-in constant, so hosts can ship their own list next to the
//! application.

use crate::policy::PublisherAllowList;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse configuration file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Gate configuration, normally loaded from a TOML file:
///
/// ```toml
/// allowed_publishers = ["TheGreenBow", "SISTECH"]
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct GateConfig {
    /// Publisher-name prefixes accepted by the policy.
    pub allowed_publishers: Vec<String>,
}

impl Default for GateConfig {
    fn default() -> Self {
        GateConfig {
            allowed_publishers: vec!["TheGreenBow".to_string(), "SISTECH".to_string()],
        }
    }
}

impl GateConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Self::from_toml_str(&std::fs::read_to_string(path)?)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    pub fn allow_list(&self) -> PublisherAllowList {
        PublisherAllowList::new(self.allowed_publishers.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_allow_list_from_toml() {
        let config =
            GateConfig::from_toml_str(r#"allowed_publishers = ["TheGreenBow", "SISTECH"]"#)
                .unwrap();
        assert_eq!(config.allowed_publishers, vec!["TheGreenBow", "SISTECH"]);
        assert!(config.allow_list().matches("TheGreenBow Networks"));
    }

    #[test]
    fn empty_list_is_valid_configuration() {
        let config = GateConfig::from_toml_str("allowed_publishers = []").unwrap();
        assert!(config.allow_list().is_empty());
    }

    #[test]
    fn missing_key_is_a_parse_error() {
        assert!(matches!(
            GateConfig::from_toml_str("other = 1"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn default_carries_the_known_vendor_prefixes() {
        let config = GateConfig::default();
        assert!(config.allow_list().matches("TheGreenBow Networks"));
        assert!(config.allow_list().matches("SISTECH SA"));
    }
}
