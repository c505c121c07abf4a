//! Configuration management for the lobby binary.
//!
//! This module handles loading, validation, and conversion of server configuration
//! from TOML files and command-line arguments.

use lobby_server::ServerConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Application configuration loaded from TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Server configuration settings
    #[serde(default)]
    pub server: ServerSettings,
    /// Logging configuration settings
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Network binding, endpoint paths and connection limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Address the WebSocket listener binds to (e.g., "127.0.0.1:8080")
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    /// Address of the read-only query endpoint
    #[serde(default = "default_query_address")]
    pub query_address: String,
    /// Whether the query endpoint is started at all
    #[serde(default = "default_query_enabled")]
    pub query_enabled: bool,
    /// Request path accepted for the WebSocket upgrade
    #[serde(default = "default_player_path")]
    pub player_path: String,
    /// Maximum number of concurrent client connections
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
    /// Handshake timeout in seconds
    #[serde(default = "default_connection_timeout")]
    pub connection_timeout: u64,
}

fn default_bind_address() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_query_address() -> String {
    "127.0.0.1:8081".to_string()
}

fn default_query_enabled() -> bool {
    true
}

fn default_player_path() -> String {
    "/player".to_string()
}

fn default_max_connections() -> usize {
    1000
}

/// Default for connection_timeout
pub fn default_connection_timeout() -> u64 {
    60
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            query_address: default_query_address(),
            query_enabled: default_query_enabled(),
            player_path: default_player_path(),
            max_connections: default_max_connections(),
            connection_timeout: default_connection_timeout(),
        }
    }
}

/// Logging system configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log level filter (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Whether to output logs in JSON format
    #[serde(default)]
    pub json_format: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json_format: false,
        }
    }
}

impl AppConfig {
    /// Loads configuration from a TOML file.
    ///
    /// If the file doesn't exist, writes the default configuration to the
    /// given path and returns it.
    pub async fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let content = tokio::fs::read_to_string(path).await?;
            let config: AppConfig = toml::from_str(&content)?;
            Ok(config)
        } else {
            let default_config = AppConfig::default();
            let toml_content = toml::to_string_pretty(&default_config)?;
            tokio::fs::write(path, toml_content).await?;
            info!("Created default configuration file: {}", path.display());
            Ok(default_config)
        }
    }

    /// Converts into the library's [`ServerConfig`].
    pub fn to_server_config(&self) -> anyhow::Result<ServerConfig> {
        let query_address = if self.server.query_enabled {
            Some(self.server.query_address.parse()?)
        } else {
            None
        };

        Ok(ServerConfig {
            bind_address: self.server.bind_address.parse()?,
            query_address,
            player_path: self.server.player_path.clone(),
            max_connections: self.server.max_connections,
            connection_timeout: self.server.connection_timeout,
        })
    }

    /// Validates the configuration for consistency and correctness.
    ///
    /// # Returns
    ///
    /// `Ok(())` if the configuration is valid, or an error string describing the issue.
    pub fn validate(&self) -> Result<(), String> {
        if self.server.bind_address.parse::<std::net::SocketAddr>().is_err() {
            return Err(format!(
                "Invalid bind address: {}",
                &self.server.bind_address
            ));
        }

        if self.server.query_enabled
            && self.server.query_address.parse::<std::net::SocketAddr>().is_err()
        {
            return Err(format!(
                "Invalid query address: {}",
                &self.server.query_address
            ));
        }

        if self.server.connection_timeout == 0 {
            return Err("Connection timeout must be at least one second".to_string());
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(format!(
                "Invalid log level: {}. Must be one of: {valid_levels:?}",
                &self.logging.level
            ));
        }

        // path, limit and address overlap are checked by the library
        self.to_server_config()
            .map_err(|e| e.to_string())?
            .validate()
            .map_err(|e| e.to_string())
    }
}
