//! Client/server message formats.
//!
//! Inbound traffic is plain `prefix:payload` text decoded by [`Command`];
//! outbound traffic is JSON ([`IdentityMessage`] and [`ServerMessage`]).

pub mod command;
pub mod types;

pub use command::Command;
pub use types::{IdentityMessage, ServerMessage};
