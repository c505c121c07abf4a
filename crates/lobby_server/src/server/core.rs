//! Core lobby server implementation.
//!
//! This module contains the `LobbyServer` struct, which owns the session hub
//! and runs the WebSocket accept loop and the query endpoint until shutdown.

use crate::{
    config::ServerConfig,
    error::ServerError,
    hub::SessionHub,
    server::{
        handlers::{handle_connection, reject_connection},
        listener::create_listener,
        query,
    },
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{watch, Semaphore};
use tokio::time::{sleep, Duration};
use tracing::{debug, error, info, warn};

/// Pause after a failed `accept`, e.g. when out of file descriptors.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// The lobby server.
///
/// Owns exactly one [`SessionHub`]; every connection accepted by this server
/// shares it. Separate instances are fully isolated from each other.
///
/// # Lifecycle
///
/// 1. [`LobbyServer::start`] binds the WebSocket and query listeners
/// 2. One task per accepted connection runs the WebSocket session
/// 3. [`LobbyServer::shutdown`] stops accepting and stops the query endpoint
pub struct LobbyServer {
    /// Server configuration settings
    config: Arc<ServerConfig>,

    /// Registry and broadcast orchestration shared by all connections
    hub: Arc<SessionHub>,

    /// Set once to stop the server; late subscribers still observe it
    shutdown_sender: watch::Sender<bool>,

    /// One permit per open connection, sized by `max_connections`
    connection_limit: Arc<Semaphore>,
}

impl LobbyServer {
    pub fn new(config: ServerConfig) -> Self {
        let (shutdown_sender, _) = watch::channel(false);
        let connection_limit = Arc::new(Semaphore::new(config.max_connections));

        Self {
            config: Arc::new(config),
            hub: Arc::new(SessionHub::new()),
            shutdown_sender,
            connection_limit,
        }
    }

    /// Binds the configured addresses and serves until shutdown.
    pub async fn start(&self) -> Result<(), ServerError> {
        self.config.validate()?;

        let listener = create_listener(self.config.bind_address)?;
        info!(
            "🚀 Lobby listening on ws://{}{}",
            self.config.bind_address, self.config.player_path
        );

        let query_listener = match self.config.query_address {
            Some(addr) => {
                let listener = create_listener(addr)?;
                info!("🔎 Query endpoint on http://{}/sessions", addr);
                Some(listener)
            }
            None => {
                info!("Query endpoint disabled");
                None
            }
        };

        self.serve(listener, query_listener).await
    }

    /// Serves on already bound listeners.
    ///
    /// Lets callers bind ephemeral ports themselves and learn the addresses
    /// before the server starts.
    pub async fn serve(
        &self,
        listener: TcpListener,
        query_listener: Option<TcpListener>,
    ) -> Result<(), ServerError> {
        let query_task = query_listener.map(|listener| {
            let router = query::router(self.hub.clone());
            let shutdown = self.shutdown_sender.subscribe();
            tokio::spawn(async move {
                axum::serve(listener, router)
                    .with_graceful_shutdown(wait_for_shutdown(shutdown))
                    .await
            })
        });

        let accept_loop = async {
            loop {
                match listener.accept().await {
                    Ok((stream, addr)) => self.dispatch(stream, addr),
                    Err(e) => {
                        error!("Failed to accept connection: {}", e);
                        sleep(ACCEPT_BACKOFF).await;
                    }
                }
            }
        };

        tokio::select! {
            _ = accept_loop => {}
            _ = wait_for_shutdown(self.shutdown_sender.subscribe()) => {
                info!("Shutdown signal received");
            }
        }

        if let Some(task) = query_task {
            match task.await {
                Ok(Ok(())) => debug!("Query endpoint stopped"),
                Ok(Err(e)) => warn!("Query endpoint failed: {}", e),
                Err(e) => warn!("Query endpoint task failed: {}", e),
            }
        }

        info!("Server stopped");
        Ok(())
    }

    /// Hands an accepted stream to its own task.
    fn dispatch(&self, stream: TcpStream, addr: SocketAddr) {
        let config = self.config.clone();

        match self.connection_limit.clone().try_acquire_owned() {
            Ok(permit) => {
                let hub = self.hub.clone();
                tokio::spawn(async move {
                    if let Err(e) = handle_connection(stream, addr, hub, config, permit).await {
                        warn!("Connection error: {}", e);
                    }
                });
            }
            Err(_) => {
                tokio::spawn(async move {
                    if let Err(e) = reject_connection(stream, addr, config).await {
                        debug!("Rejection of {} did not complete: {}", addr, e);
                    }
                });
            }
        }
    }

    /// Stops the accept loop and the query endpoint.
    ///
    /// Open connections are left to finish on their own.
    pub async fn shutdown(&self) -> Result<(), ServerError> {
        info!("🛑 Shutting down server...");
        self.shutdown_sender.send_replace(true);
        Ok(())
    }

    pub fn hub(&self) -> Arc<SessionHub> {
        self.hub.clone()
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

/// Resolves once shutdown has been requested, including before the call.
async fn wait_for_shutdown(mut receiver: watch::Receiver<bool>) {
    // a dropped sender means the server is gone as well
    let _ = receiver.wait_for(|stopped| *stopped).await;
}
