//! # Lobby Server - real-time presence hub
//!
//! Clients open a WebSocket, receive a private session id, and then mutate
//! their own small record (position, name, avatar, role, last message) with
//! short text commands. After every connect, disconnect or change the server
//! sends the complete set of records to every open connection, so all
//! participants share one view of the world.
//!
//! ## Architecture Overview
//!
//! * **Identity** ([`SessionId`]) - random UUID per connection
//! * **Player store** ([`PlayerRecord`], [`PlayerStore`]) - one record per connection
//! * **Command parser** ([`Command`]) - `move:`, `name:`, `avatar:`, `role:`, `say:`
//! * **Connection registry** ([`ConnectionRegistry`]) - lock-guarded store with snapshots
//! * **Broadcast engine** ([`broadcast`]) - per-recipient, failure-isolated fan-out
//! * **Session hub** ([`SessionHub`]) - open / message / close orchestration
//! * **Server** ([`LobbyServer`]) - WebSocket transport and the query endpoint
//!
//! ### Message Flow
//!
//! 1. A client connects to `ws://<bind_address>/player`
//! 2. It receives `{"sessionId": "..."}` followed by a `players` broadcast
//! 3. It sends e.g. `move:3,4`; the hub updates its record
//! 4. Every open connection receives `{"type":"players","players":[...]}`
//!
//! Unrecognized or malformed input is dropped silently; there is no error
//! channel back to the client.
//!
//! ## Thread Safety
//!
//! The registry is the only shared mutable state. A single `RwLock` guards
//! it; snapshots are owned copies, and no lock is ever held while a message
//! is handed to a connection.

pub use config::ServerConfig;
pub use connection::{ConnectionHandle, ConnectionId, ConnectionRegistry, Snapshot};
pub use error::ServerError;
pub use hub::SessionHub;
pub use identity::SessionId;
pub use messaging::{Command, IdentityMessage, ServerMessage};
pub use player::{PlayerRecord, PlayerStore};
pub use server::{create_listener, LobbyServer};

pub mod broadcast;
pub mod config;
pub mod connection;
pub mod error;
pub mod hub;
pub mod identity;
pub mod messaging;
pub mod player;
pub mod server;
