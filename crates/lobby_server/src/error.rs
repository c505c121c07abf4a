//! Error types for the lobby server.

use thiserror::Error;

/// Failures surfaced by the server and its components.
///
/// Protocol-level problems (unknown commands, stale connections) are not
/// errors at all and never reach this type; see [`crate::SessionHub`].
#[derive(Error, Debug)]
pub enum ServerError {
    /// Socket, handshake or delivery failures
    #[error("Network error: {0}")]
    Network(String),

    /// A wire message could not be encoded
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Invalid server configuration
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for ServerError {
    fn from(err: serde_json::Error) -> Self {
        ServerError::Serialization(err.to_string())
    }
}
