//! WebSocket listener and connection types, built on `tokio-tungstenite`.
//!
//! Clients speak JSON over WebSocket text frames. This module only handles
//! the socket plumbing — framing and event semantics live in the handler.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::StreamExt;
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;

/// Counter for generating unique connection IDs.
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

pub(crate) type WsStream = WebSocketStream<TcpStream>;
pub(crate) type WsSink = SplitSink<WsStream, Message>;
pub(crate) type WsSource = SplitStream<WsStream>;

/// Errors from the socket layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Binding the TCP listener failed.
    #[error("bind failed: {0}")]
    Bind(std::io::Error),

    /// Accepting a TCP connection failed.
    #[error("accept failed: {0}")]
    Accept(std::io::Error),

    /// The WebSocket upgrade handshake failed.
    #[error("websocket handshake failed: {0}")]
    Handshake(tokio_tungstenite::tungstenite::Error),
}

/// Identifies one accepted connection, for log correlation only.
///
/// Connection ids are process-unique and unrelated to player identity —
/// a player is known by the name in their `join` event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct ConnectionId(u64);

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C-{}", self.0)
    }
}

/// A WebSocket listener accepting game connections.
pub(crate) struct WsListener {
    listener: TcpListener,
}

impl WsListener {
    /// Binds to the given address.
    pub(crate) async fn bind(addr: &str) -> Result<Self, TransportError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(TransportError::Bind)?;
        tracing::info!(addr, "WebSocket listener bound");
        Ok(Self { listener })
    }

    /// Returns the local address the listener is bound to.
    pub(crate) fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.listener.local_addr()
    }

    /// Accepts one connection and performs the WebSocket upgrade.
    pub(crate) async fn accept(&self) -> Result<WsConnection, TransportError> {
        let (stream, addr) = self
            .listener
            .accept()
            .await
            .map_err(TransportError::Accept)?;

        let ws = tokio_tungstenite::accept_async(stream)
            .await
            .map_err(TransportError::Handshake)?;

        let id = ConnectionId(
            NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed),
        );
        tracing::debug!(%id, %addr, "accepted WebSocket connection");

        Ok(WsConnection { id, ws })
    }
}

/// A single accepted WebSocket connection.
pub(crate) struct WsConnection {
    id: ConnectionId,
    ws: WsStream,
}

impl WsConnection {
    pub(crate) fn id(&self) -> ConnectionId {
        self.id
    }

    /// Splits the connection into independent write and read halves, so a
    /// writer task can pump outbound events while the handler reads.
    pub(crate) fn split(self) -> (WsSink, WsSource) {
        self.ws.split()
    }
}
