//! Connection management for client connections.
//!
//! This module holds the transport-facing connection handle and the
//! registry that associates each live connection with its player record.

pub mod client;
pub mod registry;

pub use client::{ConnectionHandle, ConnectionId};
pub use registry::{ConnectionRegistry, Snapshot};
