//! Enforcer configuration
//!
//! Loaded from TOML:
//!
//! ```toml
//! cache-capacity = 500
//! max-policy-entries = 100
//! ```

use crate::error::{PolicyError, Result};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Default number of enforcers kept in the cache
pub const DEFAULT_CACHE_CAPACITY: usize = 1000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default, rename_all = "kebab-case")]
pub struct EnforcerConfig {
    /// Maximum number of built enforcers kept by [`crate::EnforcerCache`]
    #[validate(range(min = 1, max = 1_000_000))]
    pub cache_capacity: usize,

    /// Reject policies with more entries than this
    #[validate(range(min = 1))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_policy_entries: Option<usize>,
}

impl Default for EnforcerConfig {
    fn default() -> Self {
        EnforcerConfig {
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            max_policy_entries: None,
        }
    }
}

impl EnforcerConfig {
    /// Parse and validate a TOML configuration
    ///
    /// Missing keys take their default values.
    pub fn from_toml_str(toml: &str) -> Result<Self> {
        let config: EnforcerConfig = toml::from_str(toml)?;
        config.check()?;
        Ok(config)
    }

    /// Validate field ranges
    pub fn check(&self) -> Result<()> {
        self.validate()
            .map_err(|e| PolicyError::InvalidConfig(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EnforcerConfig::default();
        assert_eq!(config.cache_capacity, DEFAULT_CACHE_CAPACITY);
        assert!(config.max_policy_entries.is_none());
        assert!(config.check().is_ok());
    }

    #[test]
    fn test_from_toml() {
        let config = EnforcerConfig::from_toml_str(
            r#"
            cache-capacity = 16
            max-policy-entries = 4
            "#,
        )
        .unwrap();
        assert_eq!(config.cache_capacity, 16);
        assert_eq!(config.max_policy_entries, Some(4));
    }

    #[test]
    fn test_missing_keys_use_defaults() {
        let config = EnforcerConfig::from_toml_str("").unwrap();
        assert_eq!(config, EnforcerConfig::default());
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = EnforcerConfig::from_toml_str("cache-capacity = 0").unwrap_err();
        assert!(matches!(err, PolicyError::InvalidConfig(_)));

        let err = EnforcerConfig::from_toml_str("max-policy-entries = 0").unwrap_err();
        assert!(matches!(err, PolicyError::InvalidConfig(_)));

        let err = EnforcerConfig::from_toml_str("cache-capacity = \"lots\"").unwrap_err();
        assert!(matches!(err, PolicyError::ConfigParse(_)));
    }
}
