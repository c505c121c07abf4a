//! WebSocket transport for individual connections.
//!
//! Each accepted TCP stream gets its own task. After the upgrade the stream
//! is split: a writer task drains the connection's outbound queue into the
//! sink, while the reader loop feeds text frames to the hub one at a time,
//! which keeps per-connection ordering without any extra locking.

use crate::{hub::SessionHub, ConnectionHandle, ServerConfig, ServerError};
use futures::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio::sync::OwnedSemaphorePermit;
use tokio::time::{timeout, Duration};
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::http::StatusCode;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{accept_hdr_async, WebSocketStream};
use tracing::{debug, error, info, warn};

/// How long a closing connection may take to flush its outbound queue.
const WRITER_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Runs one client connection from handshake to close.
///
/// The permit counts against `max_connections` and is released when this
/// returns.
pub async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    hub: Arc<SessionHub>,
    config: Arc<ServerConfig>,
    _permit: OwnedSemaphorePermit,
) -> Result<(), ServerError> {
    let ws_stream = accept_websocket(stream, addr, &config).await?;
    let (mut sink, mut source) = ws_stream.split();

    let (handle, mut outbound) = ConnectionHandle::open();
    let connection_id = handle.id();
    info!(%connection_id, "Connection established from {}", addr);

    let mut writer = tokio::spawn(async move {
        while let Some(text) = outbound.recv().await {
            if let Err(e) = sink.send(Message::text(text)).await {
                debug!(%connection_id, "Write failed, stopping writer: {}", e);
                break;
            }
        }
        let _ = sink.close().await;
    });

    if let Err(e) = hub.on_open(handle).await {
        error!(%connection_id, "Failed to open session: {}", e);
    }

    while let Some(frame) = source.next().await {
        match frame {
            Ok(Message::Text(text)) => {
                if let Err(e) = hub.on_message(connection_id, text.as_str()).await {
                    error!(%connection_id, "Failed to handle message: {}", e);
                }
            }
            Ok(Message::Close(_)) => {
                debug!(%connection_id, "Client requested close");
                break;
            }
            // tungstenite answers pings itself on the next read or write
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {}
            Ok(Message::Binary(data)) => {
                debug!(%connection_id, "Ignoring {} byte binary frame", data.len());
            }
            Ok(Message::Frame(_)) => {}
            Err(e) => {
                warn!(%connection_id, "WebSocket error: {}", e);
                break;
            }
        }
    }

    if let Err(e) = hub.on_close(connection_id).await {
        error!(%connection_id, "Failed to close session: {}", e);
    }

    // Unregistering dropped the last handle, so the writer drains what is
    // queued, flushes the close reply and exits on its own.
    let drained = match timeout(WRITER_DRAIN_TIMEOUT, &mut writer).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(ServerError::Internal(format!(
            "Writer task for {connection_id} failed: {e}"
        ))),
        Err(_) => {
            debug!(%connection_id, "Writer did not finish in time, aborting");
            writer.abort();
            Ok(())
        }
    };

    info!(%connection_id, "Connection from {} closed", addr);
    drained
}

/// Completes the handshake and immediately closes with "try again later".
///
/// Used when the server is at `max_connections`; the connection is never
/// registered.
pub async fn reject_connection(
    stream: TcpStream,
    addr: SocketAddr,
    config: Arc<ServerConfig>,
) -> Result<(), ServerError> {
    let mut ws_stream = accept_websocket(stream, addr, &config).await?;
    warn!("Rejecting {}: connection limit of {} reached", addr, config.max_connections);
    ws_stream
        .close(Some(CloseFrame {
            code: CloseCode::Again,
            reason: "server full".into(),
        }))
        .await
        .map_err(|e| ServerError::Network(format!("Close to {addr} failed: {e}")))
}

async fn accept_websocket(
    stream: TcpStream,
    addr: SocketAddr,
    config: &ServerConfig,
) -> Result<WebSocketStream<TcpStream>, ServerError> {
    let player_path = config.player_path.clone();
    let check_path = move |request: &Request, response: Response| -> Result<Response, ErrorResponse> {
        if request.uri().path() == player_path {
            Ok(response)
        } else {
            let mut rejection = ErrorResponse::new(Some(format!(
                "no websocket endpoint at {}",
                request.uri().path()
            )));
            *rejection.status_mut() = StatusCode::NOT_FOUND;
            Err(rejection)
        }
    };

    let handshake = accept_hdr_async(stream, check_path);
    match timeout(Duration::from_secs(config.connection_timeout), handshake).await {
        Ok(Ok(ws_stream)) => Ok(ws_stream),
        Ok(Err(e)) => Err(ServerError::Network(format!(
            "WebSocket handshake with {addr} failed: {e}"
        ))),
        Err(_) => Err(ServerError::Network(format!(
            "WebSocket handshake with {addr} timed out"
        ))),
    }
}
