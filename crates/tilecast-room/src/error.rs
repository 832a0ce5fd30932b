//! Error types for the synchronization engine.

use tilecast_store::StoreError;

/// Errors a synchronization pass can fail with.
///
/// Only store trouble surfaces here: stale connections are pruned and
/// unresolved piece references are logged no-ops. The session layer
/// turns a `SyncError` into an `error` event for the originating
/// participant and nothing else.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// Reading or writing the room's persisted state failed, or the
    /// stored document was corrupt.
    #[error(transparent)]
    Store(#[from] StoreError),
}
