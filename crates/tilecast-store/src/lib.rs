//! Room store adapter for Tilecast.
//!
//! Rooms are persisted whole: one entry per room name, the value a
//! JSON-serialized [`Room`](tilecast_protocol::Room). The adapter does
//! no interpretation of the stored bytes beyond JSON encode/decode at
//! its boundary: absence means "room does not exist yet", and a value
//! that fails to decode is a contract violation surfaced as
//! [`StoreError::Corrupt`], never defaulted.
//!
//! Backends:
//!
//! - [`CouchRoomStore`]: an external CouchDB-style document store over
//!   HTTP; the production backend.
//! - [`MemoryStore`]: in-process map for tests and development.

#![allow(async_fn_in_trait)]

mod config;
mod couch;
mod error;
mod memory;

pub use config::StoreConfig;
pub use couch::CouchRoomStore;
pub use error::StoreError;
pub use memory::MemoryStore;

use tilecast_protocol::{Room, RoomName};

/// Abstraction over the external key-value service holding room state.
///
/// All operations are asynchronous and may fail with a connectivity
/// error; callers surface failures to the originating participant and
/// abandon the mutation; no retries happen at this layer.
pub trait RoomStore: Send + Sync + 'static {
    /// Fetches a room's state. `Ok(None)` means the room has never
    /// been created.
    fn get(
        &self,
        room: &RoomName,
    ) -> impl std::future::Future<Output = Result<Option<Room>, StoreError>> + Send;

    /// Persists a room's state, replacing any previous value whole.
    fn set(
        &self,
        room: &RoomName,
        state: &Room,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;

    /// Checks that the store is reachable.
    fn ping(&self) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;
}
