//! Pool configuration, loadable from TOML.
//!
//! ```toml
//! max-ids = 1000000
//! initial-packages = 1024
//! initial-reldeps = 1024
//! initial-strings = 4096
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Default per-namespace identifier limit.
pub const DEFAULT_MAX_IDS: u32 = 1 << 24;

/// Errors that can occur when loading a pool configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read pool config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse pool config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid pool config: {0}")]
    Invalid(&'static str),
}

/// Limits and capacity hints for a [`Pool`](crate::Pool).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct PoolConfig {
    /// Maximum number of ids per namespace. Interning past it fails with
    /// [`PoolError::Exhausted`](crate::PoolError::Exhausted).
    #[serde(default = "default_max_ids")]
    pub max_ids: u32,

    /// Capacity reserved up front for package keys.
    #[serde(default = "default_initial")]
    pub initial_packages: usize,

    /// Capacity reserved up front for reldep keys.
    #[serde(default = "default_initial")]
    pub initial_reldeps: usize,

    /// Capacity reserved up front for strings.
    #[serde(default = "default_initial_strings")]
    pub initial_strings: usize,
}

fn default_max_ids() -> u32 {
    DEFAULT_MAX_IDS
}

fn default_initial() -> usize {
    1024
}

fn default_initial_strings() -> usize {
    4096
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_ids: default_max_ids(),
            initial_packages: default_initial(),
            initial_reldeps: default_initial(),
            initial_strings: default_initial_strings(),
        }
    }
}

impl PoolConfig {
    /// Load a configuration from a file path.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse a configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        tracing::debug!(max_ids = config.max_ids, "loaded pool config");
        Ok(config)
    }

    /// Set the identifier limit. The value is checked when a pool is built
    /// from this configuration.
    #[must_use]
    pub fn with_max_ids(mut self, max_ids: u32) -> Self {
        self.max_ids = max_ids;
        self
    }

    /// Check the limits; [`Pool::with_config`](crate::Pool::with_config)
    /// runs this on every configuration it is given.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.max_ids == 0 {
            return Err(ConfigError::Invalid("max-ids must be at least 1"));
        }
        // the top value is left free so `max_ids + 1` slots always fit in u32
        if self.max_ids == u32::MAX {
            return Err(ConfigError::Invalid("max-ids must be below u32::MAX"));
        }
        Ok(())
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parse_empty_uses_defaults() {
        let config = PoolConfig::parse("").unwrap();
        assert_eq!(config, PoolConfig::default());
    }

    #[test]
    fn parse_overrides() {
        let toml = r#"
max-ids = 10
initial-packages = 4
"#;
        let config = PoolConfig::parse(toml).unwrap();
        assert_eq!(config.max_ids, 10);
        assert_eq!(config.initial_packages, 4);
        assert_eq!(config.initial_reldeps, 1024);
    }

    #[test]
    fn reject_unknown_fields() {
        let err = PoolConfig::parse("max_ids = 3").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn reject_zero_limit() {
        let err = PoolConfig::parse("max-ids = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max-ids = 99").unwrap();
        let config = PoolConfig::from_path(file.path()).unwrap();
        assert_eq!(config.max_ids, 99);
    }

    #[test]
    fn toml_roundtrip() {
        let config = PoolConfig::default().with_max_ids(5);
        let text = config.to_toml_string().unwrap();
        assert_eq!(PoolConfig::parse(&text).unwrap(), config);
    }
}
