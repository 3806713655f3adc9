//! Configuration management for the anime-helper service.
//!
//! This module handles loading and parsing configuration from TOML files,
//! with sensible defaults for all settings. Retry, timeout and cache limits
//! are fixed constants of the service and are not read from here.

use crate::Result;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Upstream catalog settings
    #[serde(default)]
    pub upstream: UpstreamConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log directory path
    pub log_dir: String,

    /// Default log level (trace, debug, info, warn, error)
    pub default_level: String,

    /// Enable console output (written to stderr)
    pub console: bool,

    /// Enable file output
    pub file: bool,

    /// Enable JSON formatting for file logs
    pub json_format: bool,
}

/// Upstream catalog endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// AniList GraphQL endpoint (primary catalog)
    pub anilist_url: String,

    /// Jikan REST base URL (fallback catalog)
    pub jikan_url: String,

    /// User-Agent sent with every upstream request
    pub user_agent: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: "logs".to_string(),
            default_level: "info".to_string(),
            console: true,
            file: false,
            json_format: false,
        }
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            anilist_url: "https://graphql.anilist.co".to_string(),
            jikan_url: "https://api.jikan.moe/v4".to_string(),
            user_agent: "anime-helper-mcp/0.1".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// If the file doesn't exist, returns the default configuration.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            tracing::warn!(
                path = %path.display(),
                "Config file not found, using defaults"
            );
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        tracing::info!(
            path = %path.display(),
            "Configuration loaded successfully"
        );

        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content = toml::to_string_pretty(self)
            .context("Failed to serialize configuration")?;

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        tracing::info!(
            path = %path.display(),
            "Configuration saved successfully"
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.upstream.anilist_url, "https://graphql.anilist.co");
        assert_eq!(config.upstream.jikan_url, "https://api.jikan.moe/v4");
        assert_eq!(config.logging.default_level, "info");
        assert!(!config.logging.file);
    }

    #[test]
    fn test_save_and_load_config() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("config.toml");

        let mut original_config = Config::default();
        original_config.upstream.user_agent = "test-agent/1.0".to_string();
        original_config.save(&config_path)?;

        assert!(config_path.exists());

        let loaded_config = Config::from_file(&config_path)?;
        assert_eq!(loaded_config.upstream.user_agent, "test-agent/1.0");
        assert_eq!(
            loaded_config.upstream.jikan_url,
            original_config.upstream.jikan_url
        );

        Ok(())
    }

    #[test]
    fn test_partial_config_uses_section_defaults() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("config.toml");
        std::fs::write(
            &config_path,
            "[logging]\nlog_dir = \"/tmp/ah\"\ndefault_level = \"debug\"\nconsole = false\nfile = true\njson_format = true\n",
        )?;

        let config = Config::from_file(&config_path)?;
        assert_eq!(config.logging.default_level, "debug");
        assert!(config.logging.json_format);
        assert_eq!(config.upstream.anilist_url, "https://graphql.anilist.co");

        Ok(())
    }

    #[test]
    fn test_load_nonexistent_config() -> Result<()> {
        let config = Config::from_file("nonexistent.toml")?;
        assert_eq!(config.upstream.jikan_url, "https://api.jikan.moe/v4");
        Ok(())
    }
}
