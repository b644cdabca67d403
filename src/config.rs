//! Configuration management for Chatdesk
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{ChatdeskError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure for Chatdesk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Backend connection settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Chat session defaults
    #[serde(default)]
    pub chat: ChatConfig,
    /// Local message cache settings
    #[serde(default)]
    pub cache: CacheConfig,
}

/// Backend connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Base URL of the chat backend; endpoint paths are joined onto it
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Initial cookie string, e.g. `csrftoken=abc; sessionid=xyz`
    ///
    /// Seeds the client's cookie jar. The `csrftoken` cookie is echoed in the
    /// `X-CSRFToken` header of mutating requests.
    #[serde(default)]
    pub cookie: Option<String>,

    /// Request timeout in seconds; `None` waits indefinitely
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            cookie: None,
            timeout_seconds: None,
        }
    }
}

/// Chat session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Model selected when the session starts
    #[serde(default = "default_model")]
    pub default_model: String,
}

fn default_model() -> String {
    "deepseek-r1:1.5b".to_string()
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            default_model: default_model(),
        }
    }
}

/// Local cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Persist the cache to disk; when false an in-memory store is used
    #[serde(default = "default_cache_enabled")]
    pub enabled: bool,

    /// Database file; defaults to the user's data directory
    #[serde(default)]
    pub path: Option<PathBuf>,
}

fn default_cache_enabled() -> bool {
    true
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_cache_enabled(),
            path: None,
        }
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ChatdeskError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| ChatdeskError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(url) = std::env::var("CHATDESK_SERVER_URL") {
            tracing::debug!(url = %url, "Env override: CHATDESK_SERVER_URL");
            self.server.base_url = url;
        }

        if let Ok(cookie) = std::env::var("CHATDESK_COOKIE") {
            tracing::debug!("Env override: CHATDESK_COOKIE");
            self.server.cookie = Some(cookie);
        }

        if let Ok(timeout) = std::env::var("CHATDESK_TIMEOUT_SECONDS") {
            match timeout.parse::<u64>() {
                Ok(v) => self.server.timeout_seconds = Some(v),
                Err(_) => tracing::warn!("Invalid CHATDESK_TIMEOUT_SECONDS: {}", timeout),
            }
        }

        if let Ok(model) = std::env::var("CHATDESK_MODEL") {
            tracing::debug!(model = %model, "Env override: CHATDESK_MODEL");
            self.chat.default_model = model;
        }

        if let Ok(db) = std::env::var("CHATDESK_CACHE_DB") {
            tracing::debug!(db = %db, "Env override: CHATDESK_CACHE_DB");
            self.cache.path = Some(PathBuf::from(db));
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if cli.verbose {
            tracing::debug!("Verbose mode enabled");
        }

        if let Some(server) = &cli.server {
            self.server.base_url = server.clone();
        }

        if let Some(db) = &cli.cache_db {
            self.cache.path = Some(PathBuf::from(db));
        }

        if let crate::cli::Commands::Chat {
            model: Some(model), ..
        } = &cli.command
        {
            self.chat.default_model = model.clone();
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns error if the base URL is not http(s), the default model is
    /// empty, or a zero timeout is configured
    pub fn validate(&self) -> Result<()> {
        let base = self.server.base_url.trim();
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(ChatdeskError::Config(format!(
                "server.base_url must start with http:// or https://, got '{}'",
                self.server.base_url
            ))
            .into());
        }

        url::Url::parse(base)
            .map_err(|e| ChatdeskError::Config(format!("server.base_url is invalid: {}", e)))?;

        if self.chat.default_model.trim().is_empty() {
            return Err(
                ChatdeskError::Config("chat.default_model cannot be empty".to_string()).into(),
            );
        }

        if self.server.timeout_seconds == Some(0) {
            return Err(ChatdeskError::Config(
                "server.timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            chat: ChatConfig::default(),
            cache: CacheConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use serial_test::serial;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.base_url, "http://localhost:8000");
        assert_eq!(config.chat.default_model, "deepseek-r1:1.5b");
        assert!(config.server.timeout_seconds.is_none());
        assert!(config.cache.enabled);
    }

    #[test]
    fn test_config_validation_success() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_config_validation_rejects_non_http_url() {
        let mut config = Config::default();
        config.server.base_url = "ftp://example.com".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_rejects_empty_model() {
        let mut config = Config::default();
        config.chat.default_model = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_rejects_zero_timeout() {
        let mut config = Config::default();
        config.server.timeout_seconds = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_yaml() {
        let yaml = r#"
server:
  base_url: http://192.168.1.14:8000
  cookie: "csrftoken=abc123"
  timeout_seconds: 60
chat:
  default_model: qwen2:7b
cache:
  enabled: false
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.server.base_url, "http://192.168.1.14:8000");
        assert_eq!(config.server.cookie.as_deref(), Some("csrftoken=abc123"));
        assert_eq!(config.server.timeout_seconds, Some(60));
        assert_eq!(config.chat.default_model, "qwen2:7b");
        assert!(!config.cache.enabled);
    }

    #[test]
    fn test_config_from_partial_yaml_uses_defaults() {
        let config: Config = serde_yaml::from_str("chat:\n  default_model: llama3\n").unwrap();
        assert_eq!(config.server.base_url, "http://localhost:8000");
        assert_eq!(config.chat.default_model, "llama3");
    }

    #[test]
    #[serial]
    fn test_load_missing_file_applies_env_and_cli() {
        std::env::set_var("CHATDESK_MODEL", "env-model");
        std::env::set_var("CHATDESK_TIMEOUT_SECONDS", "not-a-number");

        let cli = Cli {
            server: Some("http://cli-host:1234".to_string()),
            ..Cli::default()
        };
        let config = Config::load("/nonexistent/chatdesk.yaml", &cli).unwrap();

        assert_eq!(config.server.base_url, "http://cli-host:1234");
        assert_eq!(config.chat.default_model, "env-model");
        assert!(config.server.timeout_seconds.is_none());

        std::env::remove_var("CHATDESK_MODEL");
        std::env::remove_var("CHATDESK_TIMEOUT_SECONDS");
    }

    #[test]
    #[serial]
    fn test_chat_model_flag_overrides_env() {
        std::env::set_var("CHATDESK_MODEL", "env-model");
        let cli = Cli {
            command: Commands::Chat {
                conversation: None,
                model: Some("flag-model".to_string()),
            },
            ..Cli::default()
        };
        let config = Config::load("/nonexistent/chatdesk.yaml", &cli).unwrap();
        assert_eq!(config.chat.default_model, "flag-model");
        std::env::remove_var("CHATDESK_MODEL");
    }
}
