//! Configuration management for Topicmem
//!
//! Loads settings from TOML file at ~/.topicmem/config.toml

use crate::error::{CoreError, Result};
use crate::store::{DEFAULT_LIMIT, MAX_LIMIT, MIN_LIMIT};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// MCP server identity
    #[serde(default)]
    pub server: ServerConfig,

    /// Query defaults
    #[serde(default)]
    pub query: QueryConfig,

    /// Statistics bookkeeping
    #[serde(default)]
    pub stats: StatsConfig,
}

/// MCP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Name reported in the initialize handshake
    #[serde(default = "default_server_name")]
    pub name: String,

    /// MCP protocol version reported in the initialize handshake
    #[serde(default = "default_protocol_version")]
    pub protocol_version: String,
}

fn default_server_name() -> String {
    "topicmem".to_string()
}

fn default_protocol_version() -> String {
    "2024-11-05".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            name: default_server_name(),
            protocol_version: default_protocol_version(),
        }
    }
}

/// Query configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    /// `limit` used by view/search when the caller omits it (1-100)
    #[serde(default = "default_limit")]
    pub default_limit: usize,
}

fn default_limit() -> usize {
    DEFAULT_LIMIT
}

impl Default for QueryConfig {
    fn default() -> Self {
        QueryConfig {
            default_limit: default_limit(),
        }
    }
}

/// Statistics configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsConfig {
    /// Clamp counter underflow at zero with a warning. When false the
    /// counter is still clamped but logged as a consistency failure.
    #[serde(default = "default_true")]
    pub clamp_negative: bool,
}

fn default_true() -> bool {
    true
}

impl Default for StatsConfig {
    fn default() -> Self {
        StatsConfig {
            clamp_negative: true,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let expanded_path = expand_path(path.as_ref());

        if !expanded_path.exists() {
            return Err(CoreError::Config(format!(
                "Configuration file not found: {}",
                expanded_path.display()
            )));
        }

        let content = std::fs::read_to_string(&expanded_path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<()> {
        if !(MIN_LIMIT..=MAX_LIMIT).contains(&self.query.default_limit) {
            return Err(CoreError::Config(format!(
                "query.default_limit must be between {} and {} (got {})",
                MIN_LIMIT, MAX_LIMIT, self.query.default_limit
            )));
        }
        if self.server.name.trim().is_empty() {
            return Err(CoreError::Config("server.name must not be empty".to_string()));
        }
        Ok(())
    }

    /// Write a default configuration file
    pub fn create_default<P: AsRef<Path>>(path: P) -> Result<()> {
        let content = r#"# Topicmem Configuration

[server]
# Name reported to MCP clients
name = "topicmem"
protocol_version = "2024-11-05"

[query]
# Default result limit for view_topic and search (1-100)
default_limit = 20

[stats]
# Clamp counters at zero when a removal exceeds recorded additions
clamp_negative = true
"#;

        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;

        Ok(())
    }
}

/// Expand ~ to home directory in paths
pub fn expand_path(path: &Path) -> PathBuf {
    if let Ok(rest) = path.strip_prefix("~") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    path.to_path_buf()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.name, "topicmem");
        assert_eq!(config.server.protocol_version, "2024-11-05");
        assert_eq!(config.query.default_limit, 20);
        assert!(config.stats.clamp_negative);
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
[server]
name = "notes"

[query]
default_limit = 50

[stats]
clamp_negative = false
"#;

        let config = Config::from_toml(toml).unwrap();
        assert_eq!(config.server.name, "notes");
        assert_eq!(config.server.protocol_version, "2024-11-05");
        assert_eq!(config.query.default_limit, 50);
        assert!(!config.stats.clamp_negative);
    }

    #[test]
    fn test_reject_out_of_range_limit() {
        let toml = r#"
[query]
default_limit = 500
"#;
        assert!(matches!(Config::from_toml(toml), Err(CoreError::Config(_))));
    }

    #[test]
    fn test_create_default_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        Config::create_default(&path).unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.query.default_limit, 20);
        assert!(config.stats.clamp_negative);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        assert!(matches!(Config::from_file(&path), Err(CoreError::Config(_))));
    }
}
