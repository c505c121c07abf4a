//! Server module: lifecycle, WebSocket transport and query endpoint.

pub mod core;
pub mod handlers;
pub mod listener;
pub mod query;

pub use self::core::LobbyServer;
pub use listener::create_listener;
