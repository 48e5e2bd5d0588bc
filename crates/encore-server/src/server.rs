//! `EncoreServer` builder and accept loop.
//!
//! This is the entry point for running an Encore game server. It ties
//! together all the layers: catalog scan → room registry → WebSocket
//! accept loop → per-connection handlers.

use std::path::PathBuf;
use std::sync::Arc;

use encore_protocol::JsonCodec;
use encore_room::RoomRegistry;
use tokio::sync::Mutex;

use crate::handler::handle_connection;
use crate::ws::WsListener;
use crate::ServerError;

/// Shared server state passed to each connection handler task.
///
/// Wrapped in `Arc` so it can be cheaply cloned across tasks. The registry
/// lock is only held for room lookup/creation, never across room I/O.
pub(crate) struct ServerState {
    pub(crate) rooms: Mutex<RoomRegistry>,
    pub(crate) codec: JsonCodec,
}

/// Builder for configuring and starting an Encore server.
///
/// # Example
///
/// ```rust,ignore
/// let server = EncoreServer::builder()
///     .bind("0.0.0.0:8080")
///     .media_dir("media")
///     .build()
///     .await?;
/// server.run().await
/// ```
pub struct EncoreServerBuilder {
    bind_addr: String,
    media_dir: PathBuf,
    channel_size: Option<usize>,
}

impl EncoreServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            media_dir: PathBuf::from("media"),
            channel_size: None,
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the directory scanned for the media catalog.
    pub fn media_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.media_dir = dir.into();
        self
    }

    /// Sets the room actor command channel size.
    pub fn channel_size(mut self, size: usize) -> Self {
        self.channel_size = Some(size);
        self
    }

    /// Scans the catalog, binds the listener, and builds the server.
    ///
    /// The catalog is scanned exactly once, at startup. All rooms created
    /// over the server's lifetime share the resulting snapshot.
    pub async fn build(self) -> Result<EncoreServer, ServerError> {
        let catalog: Arc<[_]> =
            encore_catalog::scan(&self.media_dir)?.into();
        tracing::info!(
            media_dir = %self.media_dir.display(),
            items = catalog.len(),
            "media catalog ready"
        );

        let listener = WsListener::bind(&self.bind_addr).await?;

        let registry = match self.channel_size {
            Some(size) => {
                RoomRegistry::with_channel_size(catalog, size)
            }
            None => RoomRegistry::new(catalog),
        };
        let state = Arc::new(ServerState {
            rooms: Mutex::new(registry),
            codec: JsonCodec,
        });

        Ok(EncoreServer { listener, state })
    }
}

impl Default for EncoreServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running Encore game server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct EncoreServer {
    listener: WsListener,
    state: Arc<ServerState>,
}

impl EncoreServer {
    /// Creates a new builder.
    pub fn builder() -> EncoreServerBuilder {
        EncoreServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.listener.local_addr()
    }

    /// Runs the server accept loop.
    ///
    /// Accepts incoming connections and spawns a handler task for each.
    /// Runs until the process is terminated.
    pub async fn run(self) -> Result<(), ServerError> {
        tracing::info!("Encore server running");

        loop {
            match self.listener.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) =
                            handle_connection(conn, state).await
                        {
                            tracing::debug!(
                                error = %e,
                                "connection ended with error"
                            );
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
