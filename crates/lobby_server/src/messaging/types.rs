//! Wire message definitions for server-to-client traffic.
//!
//! Every outbound frame is a single JSON object encoded as UTF-8 text.

use crate::{player::PlayerRecord, SessionId};
use serde::{Deserialize, Serialize};

/// Private message sent once to a newly opened connection.
///
/// ```json
/// { "sessionId": "550e8400-e29b-41d4-a716-446655440000" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityMessage {
    pub session_id: SessionId,
}

/// Typed server messages, discriminated by their `type` field.
///
/// ```json
/// {
///   "type": "players",
///   "players": [
///     { "sessionId": "...", "name": "Alice", "avatar": "fox", "role": "",
///       "x": 3, "y": 4, "message": "hi" }
///   ]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMessage {
    /// Full world state, sent to everyone after each change
    Players { players: Vec<PlayerRecord> },
    /// Connection count, served by the query endpoint
    SessionCount { count: usize },
}

impl ServerMessage {
    pub fn to_json(&self) -> Result<String, crate::ServerError> {
        Ok(serde_json::to_string(self)?)
    }
}
