//! Room synchronization engine for Tilecast.
//!
//! Every inbound room operation runs the same pass: load the room from
//! the store, apply the mutation, prune the roster against live
//! connections, persist, and fan the result out to the surviving
//! occupants, excluding the originator.
//!
//! # Key types
//!
//! - [`SyncEngine`]: the three mutating operations (join, board
//!   replace, piece update)
//! - [`ConnectionRegistry`]: live-connection table used for pruning
//!   and addressed delivery
//! - [`SyncError`]: what an operation can fail with (store failures;
//!   everything else is a logged no-op)

mod engine;
mod error;
mod registry;

pub use engine::SyncEngine;
pub use error::SyncError;
pub use registry::{ConnectionRegistry, EventReceiver, EventSender};
