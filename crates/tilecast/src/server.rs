//! `TilecastServer` builder and accept loop.
//!
//! This is the entry point for running the relay. It ties the layers
//! together: transport → protocol → engine → store.

use std::sync::Arc;

use tilecast_protocol::JsonCodec;
use tilecast_room::{ConnectionRegistry, SyncEngine};
use tilecast_store::RoomStore;
use tilecast_transport::{Transport, WebSocketTransport};

use crate::handler::handle_connection;
use crate::TilecastError;

/// Shared server state passed to each connection handler task.
pub(crate) struct ServerState<S: RoomStore> {
    pub(crate) engine: SyncEngine<S>,
    pub(crate) codec: JsonCodec,
}

/// Builder for configuring and starting a relay.
///
/// # Example
///
/// ```rust,ignore
/// let server = TilecastServerBuilder::new()
///     .bind("0.0.0.0:3000")
///     .build(store)
///     .await?;
/// server.run().await
/// ```
pub struct TilecastServerBuilder {
    bind_addr: String,
}

impl TilecastServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:3000".to_string(),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Builds the server around the given room store.
    pub async fn build<S: RoomStore>(
        self,
        store: S,
    ) -> Result<TilecastServer<S>, TilecastError> {
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;

        let state = Arc::new(ServerState {
            engine: SyncEngine::new(store, ConnectionRegistry::new()),
            codec: JsonCodec,
        });

        Ok(TilecastServer { transport, state })
    }
}

impl Default for TilecastServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running relay.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct TilecastServer<S: RoomStore> {
    transport: WebSocketTransport,
    state: Arc<ServerState<S>>,
}

impl<S: RoomStore> TilecastServer<S> {
    /// Creates a new builder.
    pub fn builder() -> TilecastServerBuilder {
        TilecastServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// Runs the accept loop.
    ///
    /// Each accepted connection gets its own handler task. Runs until
    /// the process is terminated.
    pub async fn run(mut self) -> Result<(), TilecastError> {
        tracing::info!("Tilecast relay running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, state).await {
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
