//! Client connection handles.
//!
//! The core never touches sockets. A connection is represented by an id and
//! the sending half of an unbounded queue; the transport owns the receiving
//! half and drains it into the WebSocket sink from its own writer task.

use crate::ServerError;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;

static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identifier for a transport connection.
///
/// Distinct from [`crate::SessionId`]: connection ids are internal keys and
/// are never sent to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(pub u64);

impl ConnectionId {
    pub fn next() -> Self {
        Self(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Cloneable handle used to push text frames to one connection.
///
/// Sending never waits on the network; it only fails once the transport has
/// dropped the receiving half, i.e. the connection is gone.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    id: ConnectionId,
    outbound: mpsc::UnboundedSender<String>,
}

impl ConnectionHandle {
    /// Creates a handle with a fresh id together with the queue the transport
    /// drains.
    pub fn open() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (outbound, receiver) = mpsc::unbounded_channel();
        (
            Self {
                id: ConnectionId::next(),
                outbound,
            },
            receiver,
        )
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Queues a text frame for delivery.
    pub fn send(&self, text: String) -> Result<(), ServerError> {
        self.outbound
            .send(text)
            .map_err(|_| ServerError::Network(format!("connection {} is closed", self.id)))
    }
}
