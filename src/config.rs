//! Resolver settings loaded from JSON.
//!
//! Settings are read once at startup and turned into a [`Resolver`], which is
//! then passed by reference (or cloned) to whatever resolves captures.
//!
//! ```json
//! {
//!   "matcher": {
//!     "similarity_threshold": 0.7,
//!     "base_url_weight": 0.5,
//!     "params_weight": 0.5
//!   },
//!   "volatile_key_patterns": ["(?i)session", "(?i)^utm_"]
//! }
//! ```
//!
//! Every field is optional. Missing matcher fields take their defaults and a
//! missing pattern list selects the built-in volatile key rules.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::core::volatile::{RuleError, VolatileKeyRules};
use crate::matching::engine::{MatcherConfig, Resolver};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read settings: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse settings: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error(transparent)]
    RuleError(#[from] RuleError),
}

/// Serializable resolver settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverSettings {
    pub matcher: MatcherConfig,

    /// Replacement volatile key patterns; `None` keeps the defaults
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volatile_key_patterns: Option<Vec<String>>,
}

impl ResolverSettings {
    /// Parse settings from a JSON string
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ParseError` if the JSON is malformed or has
    /// fields of the wrong type.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load settings from a JSON file
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ReadError` if the file cannot be read, or
    /// `ConfigError::ParseError` if its content is not valid settings JSON.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&content)?;
        debug!(path = %path.display(), "loaded resolver settings");
        Ok(settings)
    }

    /// Export settings to pretty-printed JSON
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ParseError` if serialization fails.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Build a resolver from these settings.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::RuleError` if a volatile key pattern does not
    /// compile.
    pub fn build_resolver(&self) -> Result<Resolver, ConfigError> {
        let rules = match &self.volatile_key_patterns {
            Some(patterns) => Arc::new(VolatileKeyRules::from_patterns(patterns)?),
            None => VolatileKeyRules::shared_default(),
        };

        debug!(
            threshold = self.matcher.similarity_threshold,
            volatile_rules = rules.len(),
            "building resolver"
        );

        Ok(Resolver::new().with_config(self.matcher).with_rules(rules))
    }
}
