//! Session hub: the per-connection lifecycle.
//!
//! Each connection goes `Open -> Closed`. The transport calls
//! [`SessionHub::on_open`] once, [`SessionHub::on_message`] for every inbound
//! text frame in arrival order, and [`SessionHub::on_close`] once. Every event
//! that changes the registry is followed by exactly one full-state broadcast.

use crate::{
    broadcast::{self, BroadcastReport},
    connection::{ConnectionHandle, ConnectionId, ConnectionRegistry},
    messaging::Command,
    SessionId, ServerError,
};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Orchestrates identity assignment, command handling and broadcasting for
/// all connections of one server instance.
#[derive(Debug, Default)]
pub struct SessionHub {
    registry: ConnectionRegistry,
}

impl SessionHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    /// Registers a new connection and announces it.
    ///
    /// The identity message is queued before the entry becomes visible to
    /// other connections' snapshots, so it always precedes the first state
    /// broadcast the connection receives.
    pub async fn on_open(&self, handle: ConnectionHandle) -> Result<SessionId, ServerError> {
        let connection_id = handle.id();
        let session_id = SessionId::new();

        if let Err(e) = broadcast::send_identity(&handle, session_id) {
            // already gone; its close event will clean up
            debug!(%connection_id, "Identity not delivered: {}", e);
        }
        self.registry.register(handle, session_id).await;
        info!(%connection_id, %session_id, "Session opened");

        self.broadcast().await?;
        Ok(session_id)
    }

    /// Handles one inbound text frame.
    ///
    /// Returns `None` when nothing changed: the text was not a recognized
    /// command, or the connection had already been unregistered.
    pub async fn on_message(
        &self,
        connection_id: ConnectionId,
        text: &str,
    ) -> Result<Option<BroadcastReport>, ServerError> {
        let command = Command::parse(text);
        if !command.is_recognized() {
            debug!(%connection_id, "Ignoring unrecognized message");
            return Ok(None);
        }

        let updated = self
            .registry
            .mutate(connection_id, |record| {
                record.apply(&command);
            })
            .await;

        match updated {
            Some(record) => {
                debug!(%connection_id, session_id = %record.session_id, command = command.kind(), "Player updated");
                self.broadcast().await.map(Some)
            }
            None => {
                debug!(%connection_id, "Dropping command for closed connection");
                Ok(None)
            }
        }
    }

    /// Unregisters a closed connection and announces the new state.
    ///
    /// Returns `None` if the connection was not registered.
    pub async fn on_close(
        &self,
        connection_id: ConnectionId,
    ) -> Result<Option<BroadcastReport>, ServerError> {
        match self.registry.unregister(connection_id).await {
            Some(record) => {
                info!(%connection_id, session_id = %record.session_id, "Session closed");
                self.broadcast().await.map(Some)
            }
            None => Ok(None),
        }
    }

    /// `sessionId -> name` for every open connection.
    pub async fn session_names(&self) -> BTreeMap<String, String> {
        self.registry.snapshot().await.session_names()
    }

    pub async fn connection_count(&self) -> usize {
        self.registry.len().await
    }

    async fn broadcast(&self) -> Result<BroadcastReport, ServerError> {
        // the snapshot is an owned copy; no lock is held while sending
        let snapshot = self.registry.snapshot().await;
        broadcast::broadcast_state(&snapshot)
    }
}
