//! Broadcast engine.
//!
//! Serializes registry snapshots and fans them out to every connection in
//! the snapshot. Delivery is fire-and-forget through each connection's
//! outbound queue: a recipient that has gone away is skipped and reported,
//! never closed here and never allowed to abort the round. The transport's
//! own close notification is what removes it from the registry.
//!
//! Broadcasts are not linearizable across recipients. Two rounds triggered by
//! events on different connections may be observed in either order; each
//! round always carries the complete state, so the next one repairs any
//! staleness.

use crate::{
    connection::{ConnectionHandle, ConnectionId, Snapshot},
    messaging::{IdentityMessage, ServerMessage},
    SessionId, ServerError,
};
use tracing::{debug, warn};

/// Outcome of one broadcast round.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Number of connections the state message was queued for
    pub delivered: usize,
    /// Connections whose queue was already closed
    pub failed: Vec<ConnectionId>,
    /// Number of player records in the message
    pub players: usize,
}

impl BroadcastReport {
    /// `true` when every recipient accepted the message.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn attempted(&self) -> usize {
        self.delivered + self.failed.len()
    }
}

/// Queues the private `{"sessionId": ...}` message for one connection.
pub fn send_identity(handle: &ConnectionHandle, session_id: SessionId) -> Result<(), ServerError> {
    let text = serde_json::to_string(&IdentityMessage { session_id })?;
    handle.send(text)
}

/// Serializes `snapshot` once and queues it for every recipient.
///
/// Only a serialization failure is returned as an error; per-recipient
/// failures end up in [`BroadcastReport::failed`].
pub fn broadcast_state(snapshot: &Snapshot) -> Result<BroadcastReport, ServerError> {
    let text = ServerMessage::Players {
        players: snapshot.players().to_vec(),
    }
    .to_json()?;

    let mut report = BroadcastReport {
        players: snapshot.len(),
        ..Default::default()
    };

    for recipient in snapshot.recipients() {
        match recipient.send(text.clone()) {
            Ok(()) => report.delivered += 1,
            Err(e) => {
                warn!(connection_id = %recipient.id(), "Skipping recipient: {}", e);
                report.failed.push(recipient.id());
            }
        }
    }

    debug!(
        players = report.players,
        delivered = report.delivered,
        failed = report.failed.len(),
        "State broadcast queued"
    );
    Ok(report)
}
