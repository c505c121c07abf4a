//! TCP listener construction.

use crate::ServerError;
use socket2::{Domain, Protocol, Socket, Type};
use std::net::{SocketAddr, TcpListener as StdTcpListener};
use tokio::net::TcpListener;

const LISTEN_BACKLOG: i32 = 1024;

/// Binds a non-blocking listener with `SO_REUSEADDR` set, ready for tokio.
///
/// Must be called from within a tokio runtime.
pub fn create_listener(addr: SocketAddr) -> Result<TcpListener, ServerError> {
    let domain = if addr.is_ipv6() { Domain::IPV6 } else { Domain::IPV4 };
    let socket = Socket::new(domain, Type::STREAM, Some(Protocol::TCP))
        .map_err(|e| ServerError::Network(format!("Socket creation failed: {e}")))?;

    socket
        .set_reuse_address(true)
        .map_err(|e| ServerError::Network(format!("SO_REUSEADDR failed: {e}")))?;
    socket
        .set_nonblocking(true)
        .map_err(|e| ServerError::Network(format!("Non-blocking mode failed: {e}")))?;

    socket
        .bind(&addr.into())
        .map_err(|e| ServerError::Network(format!("Bind to {addr} failed: {e}")))?;
    socket
        .listen(LISTEN_BACKLOG)
        .map_err(|e| ServerError::Network(format!("Listen on {addr} failed: {e}")))?;

    let std_listener: StdTcpListener = socket.into();
    TcpListener::from_std(std_listener)
        .map_err(|e| ServerError::Network(format!("Tokio listener creation failed: {e}")))
}
