//! The connection registry: participant ids mapped to live outbound
//! channels.
//!
//! Each accepted connection registers the sending half of its outbound
//! queue here; the writer task on the other end drains the queue onto
//! the socket. The registry holds no room-domain state; it only
//! answers "is this participant still reachable" and delivers events
//! to specific participants.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tilecast_protocol::{ParticipantId, ServerEvent};
use tokio::sync::mpsc;

/// Sending half of a participant's outbound event queue.
pub type EventSender = mpsc::UnboundedSender<ServerEvent>;
/// Receiving half, drained by the connection's writer task.
pub type EventReceiver = mpsc::UnboundedReceiver<ServerEvent>;

/// Cheaply cloneable handle to the live-connection table.
#[derive(Debug, Clone, Default)]
pub struct ConnectionRegistry {
    inner: Arc<Mutex<HashMap<ParticipantId, EventSender>>>,
}

impl ConnectionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a participant's outbound channel. Replaces any stale
    /// entry left under the same id.
    pub fn register(&self, id: ParticipantId, sender: EventSender) {
        tracing::debug!(participant = %id, "registering connection");
        self.lock().insert(id, sender);
    }

    /// Removes a participant's entry. Called when their connection
    /// handler exits.
    pub fn unregister(&self, id: &ParticipantId) {
        tracing::debug!(participant = %id, "unregistering connection");
        self.lock().remove(id);
    }

    /// Whether the participant is registered and their channel is
    /// still open.
    pub fn is_live(&self, id: &ParticipantId) -> bool {
        self.lock().get(id).is_some_and(|tx| !tx.is_closed())
    }

    /// Delivers an event to one participant. Silently drops the event
    /// if the participant is gone: dead connections are recovered by
    /// pruning, not by send failures.
    pub fn send(&self, id: &ParticipantId, event: ServerEvent) {
        if let Some(tx) = self.lock().get(id) {
            let _ = tx.send(event);
        }
    }

    /// Number of registered connections.
    pub fn connected_count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<ParticipantId, EventSender>> {
        self.inner.lock().expect("registry lock poisoned")
    }
}
