//! Configuration management for relayd.
//!
//! Loads settings from /etc/relay/config.toml or uses defaults.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use tracing::{info, warn};

/// Config file path
pub const CONFIG_PATH: &str = "/etc/relay/config.toml";

/// Default config file path for fallback
pub const DEFAULT_CONFIG_PATH: &str = "/var/lib/relay/config.toml";

/// Chat transport configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    /// Bot API credential
    #[serde(default)]
    pub token: String,

    /// Chat id of the single operator authorized to answer tickets
    #[serde(default)]
    pub operator_id: i64,

    /// Bot API base URL
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Long-poll timeout in seconds
    #[serde(default = "default_poll_timeout")]
    pub poll_timeout_secs: u64,

    /// Optional HTTP proxy for all Bot API traffic
    #[serde(default)]
    pub proxy: Option<String>,
}

fn default_api_url() -> String {
    "https://api.telegram.org".to_string()
}

fn default_poll_timeout() -> u64 {
    30
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            operator_id: 0,
            api_url: default_api_url(),
            poll_timeout_secs: default_poll_timeout(),
            proxy: None,
        }
    }
}

/// Ticket store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// SQLite database path
    #[serde(default = "default_db_path")]
    pub db_path: String,
}

fn default_db_path() -> String {
    "/var/lib/relay/tickets.db".to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}

/// Full daemon configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub telegram: TelegramConfig,

    #[serde(default)]
    pub store: StoreConfig,
}

impl Config {
    /// Load config from file, or return defaults
    pub fn load() -> Self {
        Self::load_from_path(CONFIG_PATH)
            .or_else(|_| Self::load_from_path(DEFAULT_CONFIG_PATH))
            .unwrap_or_else(|e| {
                warn!("Config not found, using defaults: {}", e);
                Config::default()
            })
    }

    /// Load config from specific path
    fn load_from_path(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        info!("Loaded config from {}", path);
        Ok(config)
    }

    /// Reject a configuration that cannot serve traffic. The daemon fails
    /// here, at startup, instead of at the first send.
    pub fn validate(&self) -> Result<()> {
        if self.telegram.token.is_empty() {
            bail!("telegram.token is not set");
        }
        if self.telegram.operator_id == 0 {
            bail!("telegram.operator_id is not set");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.telegram.api_url, "https://api.telegram.org");
        assert_eq!(config.telegram.poll_timeout_secs, 30);
        assert_eq!(config.store.db_path, "/var/lib/relay/tickets.db");
        assert!(config.telegram.proxy.is_none());
    }

    #[test]
    fn test_parse_toml() {
        let toml_str = r#"
[telegram]
token = "123:abc"
operator_id = 99

[store]
db_path = "/tmp/tickets.db"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.telegram.token, "123:abc");
        assert_eq!(config.telegram.operator_id, 99);
        assert_eq!(config.store.db_path, "/tmp/tickets.db");
        // Defaults for missing fields
        assert_eq!(config.telegram.poll_timeout_secs, 30);
    }

    #[test]
    fn test_parse_toml_with_proxy() {
        let toml_str = r#"
[telegram]
token = "123:abc"
operator_id = 99
proxy = "http://proxy.server:3128"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(
            config.telegram.proxy.as_deref(),
            Some("http://proxy.server:3128")
        );
    }

    #[test]
    fn test_validate_rejects_missing_token() {
        let mut config = Config::default();
        config.telegram.operator_id = 99;
        assert!(config.validate().is_err());

        config.telegram.token = "123:abc".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_missing_operator() {
        let mut config = Config::default();
        config.telegram.token = "123:abc".to_string();
        assert!(config.validate().is_err());
    }
}
