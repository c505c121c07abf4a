//! Concurrency-safe connection registry.
//!
//! All writers (register, unregister, mutate) and the single reader
//! (snapshot) go through one `RwLock` around the [`PlayerStore`], so a
//! snapshot always sees whole records and a consistent set of connections.
//! Critical sections only touch memory; nothing awaits while the lock is held.

use crate::{
    connection::{ConnectionHandle, ConnectionId},
    player::{PlayerRecord, PlayerStore},
    SessionId,
};
use std::collections::BTreeMap;
use tokio::sync::RwLock;

/// Point-in-time copy of the registry.
///
/// `players` and `recipients` describe exactly the same set of connections.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    players: Vec<PlayerRecord>,
    recipients: Vec<ConnectionHandle>,
}

impl Snapshot {
    pub fn players(&self) -> &[PlayerRecord] {
        &self.players
    }

    pub fn recipients(&self) -> &[ConnectionHandle] {
        &self.recipients
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// `sessionId -> name` projection served by the query endpoint.
    pub fn session_names(&self) -> BTreeMap<String, String> {
        self.players
            .iter()
            .map(|p| (p.session_id.to_string(), p.name.clone()))
            .collect()
    }
}

/// Maps live connections to their player records.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    store: RwLock<PlayerStore>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Associates `handle` with a fresh record carrying `session_id`.
    ///
    /// The entry is visible to every snapshot taken after this returns.
    pub async fn register(&self, handle: ConnectionHandle, session_id: SessionId) -> PlayerRecord {
        self.store.write().await.insert(handle, session_id)
    }

    /// Removes the connection. Unknown ids are ignored.
    pub async fn unregister(&self, id: ConnectionId) -> Option<PlayerRecord> {
        self.store.write().await.remove(id)
    }

    /// Applies `update` to the connection's record and returns the result.
    ///
    /// Returns `None` when the connection has already been unregistered; a
    /// message racing its own close is expected and not an error.
    pub async fn mutate<F>(&self, id: ConnectionId, update: F) -> Option<PlayerRecord>
    where
        F: FnOnce(&mut PlayerRecord),
    {
        let mut store = self.store.write().await;
        let record = store.get_mut(id)?;
        update(record);
        Some(record.clone())
    }

    pub async fn get(&self, id: ConnectionId) -> Option<PlayerRecord> {
        self.store.read().await.get(id).cloned()
    }

    /// Copies every registered record and handle under one read lock.
    pub async fn snapshot(&self) -> Snapshot {
        let store = self.store.read().await;
        let mut snapshot = Snapshot {
            players: Vec::with_capacity(store.len()),
            recipients: Vec::with_capacity(store.len()),
        };
        for entry in store.entries() {
            snapshot.players.push(entry.record.clone());
            snapshot.recipients.push(entry.handle.clone());
        }
        snapshot
    }

    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.store.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messaging::Command;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_register_and_snapshot() {
        let registry = ConnectionRegistry::new();
        let mut receivers = Vec::new();
        for _ in 0..5 {
            let (handle, rx) = ConnectionHandle::open();
            receivers.push(rx);
            registry.register(handle, SessionId::new()).await;
        }

        let snapshot = registry.snapshot().await;
        assert_eq!(snapshot.len(), 5);
        assert_eq!(snapshot.recipients().len(), 5);
        let ids: HashSet<_> = snapshot.players().iter().map(|p| p.session_id).collect();
        assert_eq!(ids.len(), 5);
    }

    #[tokio::test]
    async fn test_unregister_unknown_is_noop() {
        let registry = ConnectionRegistry::new();
        let (handle, _rx) = ConnectionHandle::open();
        let id = handle.id();
        registry.register(handle, SessionId::new()).await;

        assert!(registry.unregister(id).await.is_some());
        assert!(registry.unregister(id).await.is_none());
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn test_mutate_stale_connection() {
        let registry = ConnectionRegistry::new();
        let (handle, _rx) = ConnectionHandle::open();
        let id = handle.id();
        registry.register(handle, SessionId::new()).await;
        registry.unregister(id).await;

        let result = registry
            .mutate(id, |record| {
                record.apply(&Command::SetName("ghost".to_string()));
            })
            .await;
        assert!(result.is_none());
        assert!(registry.snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn test_session_names_projection() {
        let registry = ConnectionRegistry::new();
        let (handle, _rx) = ConnectionHandle::open();
        let id = handle.id();
        let session = SessionId::new();
        registry.register(handle, session).await;
        registry
            .mutate(id, |record| {
                record.apply(&Command::SetName("Alice".to_string()));
            })
            .await;

        let names = registry.snapshot().await.session_names();
        assert_eq!(names.get(&session.to_string()).map(String::as_str), Some("Alice"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_mutations_are_never_torn() {
        let registry = Arc::new(ConnectionRegistry::new());
        let mut tasks = Vec::new();

        for n in 0..16 {
            let registry = registry.clone();
            tasks.push(tokio::spawn(async move {
                let (handle, _rx) = ConnectionHandle::open();
                let id = handle.id();
                registry.register(handle, SessionId::new()).await;
                for i in 0..200 {
                    // x, y and name always move together
                    registry
                        .mutate(id, |record| {
                            record.x = i;
                            record.y = -i;
                            record.name = format!("p{n}-{i}");
                        })
                        .await;
                }
                if n % 2 == 0 {
                    registry.unregister(id).await;
                }
            }));
        }

        let reader = {
            let registry = registry.clone();
            tokio::spawn(async move {
                for _ in 0..500 {
                    for player in registry.snapshot().await.players() {
                        if player.name.is_empty() {
                            assert_eq!((player.x, player.y), (0, 0));
                            continue;
                        }
                        let i: i32 = player.name.rsplit('-').next().unwrap().parse().unwrap();
                        assert_eq!(player.x, i);
                        assert_eq!(player.y, -i);
                    }
                    tokio::task::yield_now().await;
                }
            })
        };

        for task in tasks {
            task.await.unwrap();
        }
        reader.await.unwrap();
        assert_eq!(registry.len().await, 8);
    }
}
