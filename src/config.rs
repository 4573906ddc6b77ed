//! Client configuration
//!
//! Loaded from an optional YAML file, with the `ARCHLENS_URL` environment
//! variable taking precedence over the file's base URL. Missing file or
//! fields fall back to defaults.

use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplorerConfig {
    /// Backend base URL
    pub base_url: String,
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        ExplorerConfig {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ExplorerConfig {
    /// Load from a YAML file, then apply the environment override
    pub fn load(path: Option<&Path>) -> ExplorerConfig {
        let mut config = path
            .and_then(|p| std::fs::read_to_string(p).ok())
            .and_then(|text| match serde_yaml::from_str::<ExplorerConfig>(&text) {
                Ok(parsed) => Some(parsed),
                Err(e) => {
                    tracing::warn!(error = %e, "config file unreadable, using defaults");
                    None
                }
            })
            .unwrap_or_default();

        if let Ok(url) = std::env::var("ARCHLENS_URL") {
            if !url.trim().is_empty() {
                config.base_url = url;
            }
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_without_a_file() {
        let config = ExplorerConfig::load(None);
        assert_eq!(config.request_timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn partial_yaml_fills_in_defaults() {
        let config: ExplorerConfig =
            serde_yaml::from_str("base_url: http://graph.internal:9000\n").unwrap();
        assert_eq!(config.base_url, "http://graph.internal:9000");
        assert_eq!(config.request_timeout_secs, DEFAULT_TIMEOUT_SECS);
    }
}
