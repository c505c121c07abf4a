//! Hub-level tests driving the session lifecycle without a network.
//!
//! Connections are plain `ConnectionHandle`s; their receivers stand in for
//! the transport's writer tasks.

use lobby_server::{ConnectionHandle, IdentityMessage, PlayerRecord, ServerMessage, SessionHub};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;

struct TestClient {
    handle: ConnectionHandle,
    rx: UnboundedReceiver<String>,
}

impl TestClient {
    fn new() -> Self {
        let (handle, rx) = ConnectionHandle::open();
        Self { handle, rx }
    }

    fn drain(&mut self) -> Vec<String> {
        let mut frames = Vec::new();
        while let Ok(text) = self.rx.try_recv() {
            frames.push(text);
        }
        frames
    }

    fn broadcasts(&mut self) -> Vec<Vec<PlayerRecord>> {
        self.drain()
            .into_iter()
            .filter_map(|text| match serde_json::from_str::<ServerMessage>(&text) {
                Ok(ServerMessage::Players { players }) => Some(players),
                _ => None,
            })
            .collect()
    }
}

#[tokio::test]
async fn test_n_opens_yield_n_distinct_records() {
    let hub = SessionHub::new();
    let mut clients: Vec<TestClient> = (0..25).map(|_| TestClient::new()).collect();
    for client in &clients {
        hub.on_open(client.handle.clone()).await.unwrap();
    }

    let snapshot = hub.registry().snapshot().await;
    assert_eq!(snapshot.len(), 25);
    let ids: HashSet<_> = snapshot.players().iter().map(|p| p.session_id).collect();
    assert_eq!(ids.len(), 25);

    // the last client saw exactly one broadcast, containing everyone
    let last = clients.last_mut().unwrap().broadcasts();
    assert_eq!(last.len(), 1);
    assert_eq!(last[0].len(), 25);
}

#[tokio::test]
async fn test_identity_matches_broadcast_entry() {
    let hub = SessionHub::new();
    let mut client = TestClient::new();
    hub.on_open(client.handle.clone()).await.unwrap();

    let frames = client.drain();
    let identity: IdentityMessage = serde_json::from_str(&frames[0]).unwrap();
    let Ok(ServerMessage::Players { players }) = serde_json::from_str::<ServerMessage>(&frames[1]) else {
        panic!("second frame should be a players broadcast: {}", frames[1]);
    };
    assert!(players.iter().any(|p| p.session_id == identity.session_id));
}

#[tokio::test]
async fn test_every_connection_sees_every_change() {
    let hub = SessionHub::new();
    let mut alice = TestClient::new();
    let mut bob = TestClient::new();
    let alice_id = alice.handle.id();
    let alice_session = hub.on_open(alice.handle.clone()).await.unwrap();
    hub.on_open(bob.handle.clone()).await.unwrap();
    alice.drain();
    bob.drain();

    hub.on_message(alice_id, "name:  Alice  ").await.unwrap();
    hub.on_message(alice_id, "avatar:fox").await.unwrap();
    hub.on_message(alice_id, "move:abc,4").await.unwrap();
    hub.on_message(alice_id, "say:hi all").await.unwrap();

    let seen_by_bob = bob.broadcasts();
    assert_eq!(seen_by_bob.len(), 3);
    assert_eq!(alice.broadcasts().len(), 3);

    let last = seen_by_bob.last().unwrap();
    let alice_record = last.iter().find(|p| p.session_id == alice_session).unwrap();
    assert_eq!(alice_record.name, "Alice");
    assert_eq!(alice_record.avatar, "fox");
    assert_eq!(alice_record.message, "hi all");
    assert_eq!((alice_record.x, alice_record.y), (0, 0));
}

#[tokio::test]
async fn test_close_removes_record_from_later_snapshots() {
    let hub = SessionHub::new();
    let mut stay = TestClient::new();
    let leave = TestClient::new();
    let leave_id = leave.handle.id();
    hub.on_open(stay.handle.clone()).await.unwrap();
    let leaving_session = hub.on_open(leave.handle.clone()).await.unwrap();
    stay.drain();

    hub.on_close(leave_id).await.unwrap();

    let seen = stay.broadcasts();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].len(), 1);
    assert!(seen[0].iter().all(|p| p.session_id != leaving_session));
    assert!(!hub.session_names().await.contains_key(&leaving_session.to_string()));
}

#[tokio::test]
async fn test_stale_recipient_does_not_block_others() {
    let hub = SessionHub::new();
    let mut first = TestClient::new();
    let mut last = TestClient::new();
    let TestClient { handle: stale_handle, rx: stale_rx } = TestClient::new();
    let first_id = first.handle.id();

    hub.on_open(first.handle.clone()).await.unwrap();
    hub.on_open(stale_handle.clone()).await.unwrap();
    hub.on_open(last.handle.clone()).await.unwrap();
    first.drain();
    last.drain();
    drop(stale_rx);

    let report = hub.on_message(first_id, "move:7,7").await.unwrap().unwrap();
    assert_eq!(report.failed, vec![stale_handle.id()]);
    assert_eq!(report.delivered, 2);

    assert_eq!(first.broadcasts().len(), 1);
    assert_eq!(last.broadcasts().len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_sessions() {
    let hub = Arc::new(SessionHub::new());
    let mut tasks = Vec::new();

    for n in 0..32 {
        let hub = hub.clone();
        tasks.push(tokio::spawn(async move {
            let mut client = TestClient::new();
            let id = client.handle.id();
            hub.on_open(client.handle.clone()).await.unwrap();
            hub.on_message(id, &format!("name:player-{n}")).await.unwrap();
            for step in 0..20 {
                hub.on_message(id, &format!("move:{step},{n}")).await.unwrap();
            }

            // every record in every snapshot this client saw is internally consistent
            for players in client.broadcasts() {
                for p in players {
                    if let Some(owner) = p.name.strip_prefix("player-") {
                        let owner: i32 = owner.parse().unwrap();
                        assert!(p.y == 0 || p.y == owner);
                    }
                }
            }

            if n % 4 == 0 {
                hub.on_close(id).await.unwrap();
            }
        }));
    }

    for task in tasks {
        task.await.unwrap();
    }
    assert_eq!(hub.connection_count().await, 24);
}
