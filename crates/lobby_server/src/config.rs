//! Server configuration types and defaults.
//!
//! This module contains the server configuration structure and default values
//! used to initialize and customize the lobby server behavior.

use std::net::SocketAddr;

/// Configuration structure for the lobby server.
///
/// Contains the listener addresses, the WebSocket path clients connect to and
/// connection limits.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// The socket address the WebSocket listener binds to
    pub bind_address: SocketAddr,

    /// Address of the read-only query endpoint (`None` disables it)
    pub query_address: Option<SocketAddr>,

    /// Request path accepted for the WebSocket upgrade
    pub player_path: String,

    /// Maximum number of concurrent connections allowed
    pub max_connections: usize,

    /// WebSocket handshake timeout in seconds
    pub connection_timeout: u64,
}

impl ServerConfig {
    /// Checks the values that cannot be expressed through the types alone.
    pub fn validate(&self) -> Result<(), crate::ServerError> {
        if !self.player_path.starts_with('/') {
            return Err(crate::ServerError::Config(format!(
                "player path must start with '/': {}",
                self.player_path
            )));
        }
        if self.max_connections == 0 {
            return Err(crate::ServerError::Config(
                "max_connections must be greater than zero".to_string(),
            ));
        }
        if self.query_address == Some(self.bind_address) {
            return Err(crate::ServerError::Config(format!(
                "query endpoint cannot share the WebSocket address {}",
                self.bind_address
            )));
        }
        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([127, 0, 0, 1], 8080)),
            query_address: Some(SocketAddr::from(([127, 0, 0, 1], 8081))),
            player_path: "/player".to_string(),
            max_connections: 1000,
            connection_timeout: 60,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_address.port(), 8080);
        assert_eq!(config.player_path, "/player");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_relative_path() {
        let config = ServerConfig {
            player_path: "player".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_shared_address() {
        let config = ServerConfig {
            query_address: Some(SocketAddr::from(([127, 0, 0, 1], 8080))),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_connections() {
        let config = ServerConfig {
            max_connections: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
