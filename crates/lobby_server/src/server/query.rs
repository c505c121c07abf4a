//! Read-only HTTP query endpoint.
//!
//! * `GET /sessions` - JSON object mapping `sessionId` to display name
//! * `GET /sessions/count` - `{"type":"sessionCount","count":N}`

use crate::{hub::SessionHub, messaging::ServerMessage};
use axum::{extract::State, routing::get, Json, Router};
use std::collections::BTreeMap;
use std::sync::Arc;

pub fn router(hub: Arc<SessionHub>) -> Router {
    Router::new()
        .route("/sessions", get(list_sessions))
        .route("/sessions/count", get(session_count))
        .with_state(hub)
}

async fn list_sessions(State(hub): State<Arc<SessionHub>>) -> Json<BTreeMap<String, String>> {
    Json(hub.session_names().await)
}

async fn session_count(State(hub): State<Arc<SessionHub>>) -> Json<ServerMessage> {
    Json(ServerMessage::SessionCount {
        count: hub.connection_count().await,
    })
}
