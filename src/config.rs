//! Application configuration
//!
//! Loaded from YAML by the CLI runtime. Every section has defaults, so an
//! empty or partial file is valid.

use element_locator::{LocatorTier, Resolver};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("resolver.tiers must name at least one tier")]
    EmptyTierChain,

    #[error("invalid logging.level '{0}' (expected trace, debug, info, warn or error)")]
    InvalidLogLevel(String),
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub resolver: ResolverConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Emit JSON lines instead of the human formatter
    #[serde(default)]
    pub json: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ResolverConfig {
    /// Tier cascade, in order. Tiers left out are disabled.
    #[serde(default = "LocatorTier::default_chain")]
    pub tiers: Vec<LocatorTier>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            tiers: LocatorTier::default_chain(),
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.resolver.tiers.is_empty() {
            return Err(ConfigError::EmptyTierChain);
        }
        if self.logging.level.parse::<tracing::Level>().is_err() {
            return Err(ConfigError::InvalidLogLevel(self.logging.level.clone()));
        }
        Ok(())
    }

    /// Resolver running the configured tier chain
    pub fn resolver(&self) -> Resolver {
        Resolver::with_chain(self.resolver.tiers.clone())
    }
}
