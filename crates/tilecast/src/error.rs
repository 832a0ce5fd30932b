//! Unified error type for the relay.

use tilecast_protocol::ProtocolError;
use tilecast_room::SyncError;
use tilecast_store::StoreError;
use tilecast_transport::TransportError;

/// Top-level error wrapping the layer-specific errors.
///
/// The `#[from]` attributes let `?` convert sub-crate errors
/// automatically, so embedders deal with one type.
#[derive(Debug, thiserror::Error)]
pub enum TilecastError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, invalid envelope).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A synchronization failure (store trouble during a room pass).
    #[error(transparent)]
    Sync(#[from] SyncError),

    /// A store error outside a room pass (connect, health check).
    #[error(transparent)]
    Store(#[from] StoreError),
}
