//! Wire protocol for Tilecast.
//!
//! This crate defines the language clients and the relay speak, and the
//! shape of what the relay persists:
//!
//! - **Board model** ([`Room`], [`BoardData`], [`Tile`], [`Train`],
//!   [`Center`], [`PieceUpdate`]): the JSON shape that is both stored
//!   per room and forwarded to participants.
//! - **Envelopes** ([`ClientEnvelope`], [`ClientCommand`],
//!   [`ServerEvent`]): the room-scoped event wrapper on the wire.
//! - **Identity** ([`ParticipantId`], [`RoomName`]): who is connected
//!   and which room a message targets.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how messages become
//!   bytes and back.
//!
//! The protocol layer knows nothing about connections or the store;
//! it only defines shapes and their serialization.

mod board;
mod codec;
mod error;
mod types;

pub use board::{
    BoardData, Center, PieceAction, PieceKind, PieceState, PieceUpdate, Room,
    Tile, Train,
};
pub use codec::{Codec, JsonCodec};
pub use error::ProtocolError;
pub use types::{
    ClientCommand, ClientEnvelope, ConnectedPayload, ErrorPayload,
    ParticipantId, PlayerConnectedPayload, RoomName, ServerEvent,
};
