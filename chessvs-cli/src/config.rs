//! Application configuration
//!
//! One JSON file covers both the game and the server; every field is
//! optional and falls back to its default.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use chessvs_core::GameConfig;
use chessvs_server::ServerConfig;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub game: GameConfig,
    pub server: ServerConfig,
}

impl AppConfig {
    /// Load from `path`, or defaults when no file was given
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let config: AppConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;

        tracing::debug!(?config, "loaded configuration");
        Ok(config)
    }
}
