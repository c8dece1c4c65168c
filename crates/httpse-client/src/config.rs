//! Client configuration

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use httpse_loader::LoadOptions;

/// Error type for reading a [`ClientConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid client config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Settings applied to every ruleset document the client loads.
///
/// Every field has a default, so `{}` is a valid config.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Activate `mixedcontent` platform rulesets.
    pub enable_mixed_rulesets: bool,
    /// Force individual rulesets on or off by name.
    pub ruleset_active_states: HashMap<String, bool>,
}

impl ClientConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&contents)
    }
}

impl From<ClientConfig> for LoadOptions {
    fn from(config: ClientConfig) -> Self {
        LoadOptions {
            enable_mixed_rulesets: config.enable_mixed_rulesets,
            ruleset_active_states: config.ruleset_active_states,
        }
    }
}
