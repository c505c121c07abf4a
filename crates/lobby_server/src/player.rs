//! Player records and the per-connection state store.

use crate::{
    connection::{ConnectionHandle, ConnectionId},
    messaging::Command,
    SessionId,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Shared state of one connected participant.
///
/// Every field except `session_id` starts empty/zero and changes only through
/// [`PlayerRecord::apply`] with commands from the owning connection. A field
/// keeps its value until that same field is set again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerRecord {
    pub session_id: SessionId,
    pub name: String,
    pub avatar: String,
    pub role: String,
    pub x: i32,
    pub y: i32,
    pub message: String,
}

impl PlayerRecord {
    pub fn new(session_id: SessionId) -> Self {
        Self {
            session_id,
            name: String::new(),
            avatar: String::new(),
            role: String::new(),
            x: 0,
            y: 0,
            message: String::new(),
        }
    }

    /// Applies a parsed command. Returns `false` for [`Command::Unrecognized`],
    /// which leaves the record untouched.
    pub fn apply(&mut self, command: &Command) -> bool {
        match command {
            Command::Move { x, y } => {
                self.x = *x;
                self.y = *y;
            }
            Command::SetName(name) => self.name.clone_from(name),
            Command::SetAvatar(avatar) => self.avatar.clone_from(avatar),
            Command::SetRole(role) => self.role.clone_from(role),
            Command::SetMessage(message) => self.message.clone_from(message),
            Command::Unrecognized => return false,
        }
        true
    }
}

/// A registered connection: its outbound handle and its record.
#[derive(Debug, Clone)]
pub(crate) struct PlayerEntry {
    pub handle: ConnectionHandle,
    pub record: PlayerRecord,
}

/// One record per open connection, keyed by connection id.
///
/// Not synchronized; [`crate::ConnectionRegistry`] wraps it in a lock.
#[derive(Debug, Default)]
pub struct PlayerStore {
    entries: HashMap<ConnectionId, PlayerEntry>,
}

impl PlayerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the default record for `handle` and stores it.
    pub fn insert(&mut self, handle: ConnectionHandle, session_id: SessionId) -> PlayerRecord {
        let record = PlayerRecord::new(session_id);
        self.entries.insert(
            handle.id(),
            PlayerEntry {
                handle,
                record: record.clone(),
            },
        );
        record
    }

    pub fn remove(&mut self, id: ConnectionId) -> Option<PlayerRecord> {
        self.entries.remove(&id).map(|entry| entry.record)
    }

    pub fn get(&self, id: ConnectionId) -> Option<&PlayerRecord> {
        self.entries.get(&id).map(|entry| &entry.record)
    }

    pub fn get_mut(&mut self, id: ConnectionId) -> Option<&mut PlayerRecord> {
        self.entries.get_mut(&id).map(|entry| &mut entry.record)
    }

    pub(crate) fn entries(&self) -> impl Iterator<Item = &PlayerEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_defaults() {
        let id = SessionId::new();
        let record = PlayerRecord::new(id);
        assert_eq!(record.session_id, id);
        assert_eq!((record.x, record.y), (0, 0));
        assert!(record.name.is_empty());
        assert!(record.avatar.is_empty());
        assert!(record.role.is_empty());
        assert!(record.message.is_empty());
    }

    #[test]
    fn test_fields_persist_independently() {
        let mut record = PlayerRecord::new(SessionId::new());
        assert!(record.apply(&Command::SetMessage("hi".to_string())));
        assert!(record.apply(&Command::Move { x: 5, y: -2 }));
        assert!(record.apply(&Command::SetName("Alice".to_string())));

        assert_eq!(record.message, "hi");
        assert_eq!((record.x, record.y), (5, -2));
        assert_eq!(record.name, "Alice");

        assert!(record.apply(&Command::SetMessage(String::new())));
        assert!(record.message.is_empty());
        assert_eq!(record.name, "Alice");
    }

    #[test]
    fn test_unrecognized_leaves_record() {
        let mut record = PlayerRecord::new(SessionId::new());
        let before = record.clone();
        assert!(!record.apply(&Command::Unrecognized));
        assert_eq!(record, before);
    }

    #[test]
    fn test_store_insert_remove() {
        let mut store = PlayerStore::new();
        let (handle, _rx) = ConnectionHandle::open();
        let id = handle.id();
        let session = SessionId::new();

        let record = store.insert(handle, session);
        assert_eq!(record.session_id, session);
        assert_eq!(store.len(), 1);

        store.get_mut(id).unwrap().apply(&Command::SetRole("scout".to_string()));
        assert_eq!(store.get(id).unwrap().role, "scout");

        let removed = store.remove(id).unwrap();
        assert_eq!(removed.role, "scout");
        assert!(store.is_empty());
        assert!(store.remove(id).is_none());
    }
}
