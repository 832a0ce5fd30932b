//! # Tilecast
//!
//! A relay server for shared tabletop sessions. Authoritative per-room
//! board state lives in an external store; every mutation a participant
//! sends is applied to the stored state and fanned out to the room's
//! surviving occupants, excluding the sender.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tilecast::prelude::*;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let store = MemoryStore::new();
//! let server = TilecastServerBuilder::new()
//!     .bind("0.0.0.0:3000")
//!     .build(store)
//!     .await?;
//! server.run().await?;
//! # Ok(())
//! # }
//! ```

mod error;
mod handler;
mod server;

pub use error::TilecastError;
pub use server::{TilecastServer, TilecastServerBuilder};

/// One-stop imports for building and embedding the relay.
pub mod prelude {
    pub use crate::{TilecastError, TilecastServer, TilecastServerBuilder};
    pub use tilecast_protocol::{
        BoardData, Center, ClientCommand, ClientEnvelope, Codec, JsonCodec,
        ParticipantId, PieceAction, PieceKind, PieceState, PieceUpdate, Room,
        RoomName, ServerEvent, Tile, Train,
    };
    pub use tilecast_room::{ConnectionRegistry, SyncEngine, SyncError};
    pub use tilecast_store::{
        CouchRoomStore, MemoryStore, RoomStore, StoreConfig, StoreError,
    };
}
