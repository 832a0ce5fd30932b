//! In-process store backend for tests and development.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tilecast_protocol::{Room, RoomName};

use crate::{RoomStore, StoreError};

/// A [`RoomStore`] backed by an in-process map.
///
/// Values are held as serialized JSON, not live structs, so the decode
/// path, including surfacing of corrupt documents, behaves exactly
/// like the external store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Plants a raw value under a room key, bypassing serialization.
    /// Test hook for exercising the corrupt-document path.
    pub fn insert_raw(&self, room: &RoomName, value: impl Into<String>) {
        self.entries
            .lock()
            .expect("store mutex poisoned")
            .insert(room.as_str().to_string(), value.into());
    }
}

impl RoomStore for MemoryStore {
    async fn get(&self, room: &RoomName) -> Result<Option<Room>, StoreError> {
        let raw = self
            .entries
            .lock()
            .expect("store mutex poisoned")
            .get(room.as_str())
            .cloned();

        match raw {
            None => Ok(None),
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|source| StoreError::Corrupt {
                    key: room.as_str().to_string(),
                    source,
                }),
        }
    }

    async fn set(&self, room: &RoomName, state: &Room) -> Result<(), StoreError> {
        let raw = serde_json::to_string(state).map_err(|source| StoreError::Corrupt {
            key: room.as_str().to_string(),
            source,
        })?;
        self.entries
            .lock()
            .expect("store mutex poisoned")
            .insert(room.as_str().to_string(), raw);
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
