use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::reputation;

/// Sidecar configuration, loaded from TOML. Every field has a default, so a
/// missing file or empty table is a valid configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub reputation: ReputationSettings,
    #[serde(default)]
    pub scoring: ScoringSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReputationSettings {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_client_id")]
    pub client_id: String,
    #[serde(default = "default_client_version")]
    pub client_version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScoringSettings {
    /// Flagged-URL count at which risk escalates to MEDIUM.
    #[serde(default = "default_medium_flag_count")]
    pub medium_flag_count: usize,
}

fn default_bind() -> String {
    "127.0.0.1:18900".to_string()
}

fn default_endpoint() -> String {
    reputation::DEFAULT_ENDPOINT.to_string()
}

fn default_timeout_secs() -> u64 {
    reputation::DEFAULT_TIMEOUT_SECS
}

fn default_client_id() -> String {
    "trustid-sidecar".to_string()
}

fn default_client_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_medium_flag_count() -> usize {
    2
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind: default_bind() }
    }
}

impl Default for ReputationSettings {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout_secs: default_timeout_secs(),
            client_id: default_client_id(),
            client_version: default_client_version(),
        }
    }
}

impl Default for ScoringSettings {
    fn default() -> Self {
        Self {
            medium_flag_count: default_medium_flag_count(),
        }
    }
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed reading config file: {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("invalid config file: {}", path.display()))
    }
}
