//! Session configuration, loaded from TOML.
//!
//! ```toml
//! source_prefix = "source"
//! target_prefix = "target"
//! debounce_ms = 500
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::session::Side;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("id prefixes must not be empty")]
    EmptyPrefix,
    #[error("source and target id prefixes must differ")]
    SamePrefix,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapperConfig {
    /// Prefix of ids minted for the source document.
    pub source_prefix: String,
    /// Prefix of ids minted for the target document.
    pub target_prefix: String,
    /// Quiet period before an edited text is reconciled.
    pub debounce_ms: u64,
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            source_prefix: "source".to_string(),
            target_prefix: "target".to_string(),
            debounce_ms: 500,
        }
    }
}

impl MapperConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: MapperConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_toml_str(&std::fs::read_to_string(path)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.source_prefix.is_empty() || self.target_prefix.is_empty() {
            return Err(ConfigError::EmptyPrefix);
        }
        if self.source_prefix == self.target_prefix {
            return Err(ConfigError::SamePrefix);
        }
        Ok(())
    }

    pub fn prefix(&self, side: Side) -> &str {
        match side {
            Side::Source => &self.source_prefix,
            Side::Target => &self.target_prefix,
        }
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}
