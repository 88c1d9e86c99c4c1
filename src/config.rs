//! Configuration management for Solace
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{Result, SolaceError};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;

/// Environment variable holding the completion API key (required)
pub const API_KEY_ENV: &str = "GROQ_API_KEY";

/// Environment variable holding the session signing secret (optional)
pub const SECRET_KEY_ENV: &str = "SECRET_KEY";

/// Main configuration structure for Solace
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP listener settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Completion API settings
    #[serde(default)]
    pub provider: ProviderConfig,
    /// User store settings
    #[serde(default)]
    pub storage: StorageConfig,
    /// Session cookie settings
    #[serde(default)]
    pub session: SessionConfig,
}

/// HTTP listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Socket address to bind, e.g. `127.0.0.1:5000`
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Directory served under `/static`
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
}

fn default_bind() -> String {
    "127.0.0.1:5000".to_string()
}

fn default_static_dir() -> String {
    "static".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            static_dir: default_static_dir(),
        }
    }
}

/// Completion API configuration
///
/// Any OpenAI-compatible chat-completions endpoint works; the defaults point
/// at Groq.
#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Base URL; `/chat/completions` is appended
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Model identifier sent with every request
    #[serde(default = "default_model")]
    pub model: String,

    /// Bearer credential. Usually supplied through `GROQ_API_KEY`.
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
}

fn default_api_base() -> String {
    "https://api.groq.com/openai/v1".to_string()
}

fn default_model() -> String {
    "llama3-70b-8192".to_string()
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            model: default_model(),
            api_key: None,
        }
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// User store configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// SQLite database file. Defaults to the platform data directory.
    #[serde(default)]
    pub db_path: Option<String>,
}

/// Session cookie configuration
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Secret the signing key is derived from. Usually supplied through
    /// `SECRET_KEY`; when unset a random per-process key is used.
    #[serde(default, skip_serializing)]
    pub secret_key: Option<String>,
}

impl std::fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionConfig")
            .field("secret_key", &self.secret_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the YAML configuration file
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
            .map_err(|e| SolaceError::Config(format!("Failed to read config file: {}", e)))?;
        let config = serde_yaml::from_str(&contents).map_err(SolaceError::from)?;
        Ok(config)
    }

    fn apply_env_vars(&mut self) {
        if let Ok(api_key) = std::env::var(API_KEY_ENV) {
            self.provider.api_key = Some(api_key);
        }

        if let Ok(secret) = std::env::var(SECRET_KEY_ENV) {
            self.session.secret_key = Some(secret);
        }

        if let Ok(api_base) = std::env::var("SOLACE_API_BASE") {
            self.provider.api_base = api_base;
        }

        if let Ok(model) = std::env::var("SOLACE_MODEL") {
            self.provider.model = model;
        }

        if let Ok(bind) = std::env::var("SOLACE_BIND") {
            self.server.bind = bind;
        }

        if let Ok(static_dir) = std::env::var("SOLACE_STATIC_DIR") {
            self.server.static_dir = static_dir;
        }

        if let Ok(db_path) = std::env::var("SOLACE_DB_PATH") {
            self.storage.db_path = Some(db_path);
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if let Some(bind) = &cli.bind {
            self.server.bind = bind.clone();
        }

        if let Some(db_path) = &cli.db_path {
            self.storage.db_path = Some(db_path.clone());
        }
    }

    /// Socket address parsed from `server.bind`
    ///
    /// # Errors
    ///
    /// Returns error if the bind string is not a valid socket address
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        self.server.bind.parse().map_err(|e| {
            SolaceError::Config(format!("Invalid bind address {}: {}", self.server.bind, e)).into()
        })
    }

    /// Validate the configuration
    ///
    /// A missing API key is the one startup failure the application refuses
    /// to run without.
    ///
    /// # Errors
    ///
    /// Returns error if any validation check fails
    pub fn validate(&self) -> Result<()> {
        match self.provider.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => {}
            _ => {
                return Err(SolaceError::Config(format!(
                    "Missing {} in environment variables",
                    API_KEY_ENV
                ))
                .into());
            }
        }

        if self.provider.model.trim().is_empty() {
            return Err(
                SolaceError::Config("provider.model cannot be empty".to_string()).into(),
            );
        }

        let api_base = url::Url::parse(&self.provider.api_base).map_err(|e| {
            SolaceError::Config(format!(
                "provider.api_base is not a valid URL ({}): {}",
                self.provider.api_base, e
            ))
        })?;
        if !matches!(api_base.scheme(), "http" | "https") {
            return Err(SolaceError::Config(format!(
                "provider.api_base must use http or https, got {}",
                api_base.scheme()
            ))
            .into());
        }

        self.bind_addr()?;

        if matches!(self.session.secret_key.as_deref(), Some(s) if s.is_empty()) {
            return Err(SolaceError::Config(format!(
                "{} is set but empty; unset it or provide a secret",
                SECRET_KEY_ENV
            ))
            .into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::Parser;
    use serial_test::serial;
    use std::env;

    fn valid_config() -> Config {
        let mut config = Config::default();
        config.provider.api_key = Some("gsk_test".to_string());
        config
    }

    fn clear_env() {
        for key in [
            API_KEY_ENV,
            SECRET_KEY_ENV,
            "SOLACE_API_BASE",
            "SOLACE_MODEL",
            "SOLACE_BIND",
            "SOLACE_STATIC_DIR",
            "SOLACE_DB_PATH",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.bind, "127.0.0.1:5000");
        assert_eq!(config.server.static_dir, "static");
        assert_eq!(config.provider.model, "llama3-70b-8192");
        assert_eq!(config.provider.api_base, "https://api.groq.com/openai/v1");
        assert!(config.provider.api_key.is_none());
        assert!(config.storage.db_path.is_none());
    }

    #[test]
    fn test_config_validation_success() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_config_validation_missing_api_key() {
        let config = Config::default();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("GROQ_API_KEY"));
    }

    #[test]
    fn test_config_validation_blank_api_key() {
        let mut config = valid_config();
        config.provider.api_key = Some("   ".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_empty_model() {
        let mut config = valid_config();
        config.provider.model = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_bad_api_base() {
        let mut config = valid_config();
        config.provider.api_base = "not a url".to_string();
        assert!(config.validate().is_err());

        config.provider.api_base = "ftp://example.com".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_bad_bind() {
        let mut config = valid_config();
        config.server.bind = "localhost".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_empty_secret() {
        let mut config = valid_config();
        config.session.secret_key = Some(String::new());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_yaml_with_partial_sections() {
        let yaml = r#"
server:
  bind: "0.0.0.0:8080"
provider:
  model: "llama-3.1-8b-instant"
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.server.bind, "0.0.0.0:8080");
        assert_eq!(config.server.static_dir, "static");
        assert_eq!(config.provider.model, "llama-3.1-8b-instant");
        assert_eq!(config.provider.api_base, "https://api.groq.com/openai/v1");
    }

    #[test]
    fn test_secrets_are_not_serialized() {
        let mut config = valid_config();
        config.session.secret_key = Some("hunter2".to_string());
        let yaml = serde_yaml::to_string(&config).unwrap();
        assert!(!yaml.contains("gsk_test"));
        assert!(!yaml.contains("hunter2"));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let mut config = valid_config();
        config.session.secret_key = Some("hunter2".to_string());
        let debug = format!("{:?}", config);
        assert!(!debug.contains("gsk_test"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        clear_env();
        env::set_var(API_KEY_ENV, "gsk_env");
        env::set_var(SECRET_KEY_ENV, "env-secret");
        env::set_var("SOLACE_MODEL", "mixtral-8x7b-32768");
        env::set_var("SOLACE_DB_PATH", "/tmp/solace-test.db");

        let cli = Cli::parse_from(["solace", "--config", "does-not-exist.yaml"]);
        let config = Config::load("does-not-exist.yaml", &cli).unwrap();

        assert_eq!(config.provider.api_key.as_deref(), Some("gsk_env"));
        assert_eq!(config.session.secret_key.as_deref(), Some("env-secret"));
        assert_eq!(config.provider.model, "mixtral-8x7b-32768");
        assert_eq!(
            config.storage.db_path.as_deref(),
            Some("/tmp/solace-test.db")
        );

        clear_env();
    }

    #[test]
    #[serial]
    fn test_cli_overrides_env() {
        clear_env();
        env::set_var("SOLACE_BIND", "127.0.0.1:9000");

        let cli = Cli::parse_from([
            "solace",
            "--bind",
            "127.0.0.1:7000",
            "--db-path",
            "/tmp/cli.db",
        ]);
        let config = Config::load("does-not-exist.yaml", &cli).unwrap();

        assert_eq!(config.server.bind, "127.0.0.1:7000");
        assert_eq!(config.storage.db_path.as_deref(), Some("/tmp/cli.db"));

        clear_env();
    }

    #[test]
    #[serial]
    fn test_load_from_file() {
        clear_env();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(
            &path,
            "provider:\n  api_key: \"gsk_file\"\nstorage:\n  db_path: \"users.db\"\n",
        )
        .unwrap();

        let path_str = path.to_string_lossy().to_string();
        let cli = Cli::parse_from(["solace"]);
        let config = Config::load(&path_str, &cli).unwrap();

        assert_eq!(config.provider.api_key.as_deref(), Some("gsk_file"));
        assert_eq!(config.storage.db_path.as_deref(), Some("users.db"));
        assert!(config.validate().is_ok());
    }

    #[test]
    #[serial]
    fn test_load_rejects_malformed_file() {
        clear_env();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "server: [unclosed").unwrap();

        let cli = Cli::parse_from(["solace"]);
        let err = Config::load(&path.to_string_lossy(), &cli).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SolaceError>(),
            Some(SolaceError::Yaml(_))
        ));
    }
}
