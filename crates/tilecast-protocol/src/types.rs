//! Identity types and message envelopes.

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

use crate::board::{BoardData, PieceUpdate};
use crate::ProtocolError;

use std::fmt;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A participant's identity: the session identifier minted for their
/// connection when it is accepted.
///
/// Stable for the connection's lifetime, process-unique, and reused as
/// the room-membership key in every persisted roster. Serializes as a
/// plain JSON string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(String);

impl ParticipantId {
    /// Wraps an existing identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Mints a fresh random identifier for a newly accepted connection.
    pub fn generate() -> Self {
        use rand::distr::Alphanumeric;
        use rand::Rng;

        let id: String = rand::rng()
            .sample_iter(Alphanumeric)
            .take(16)
            .map(char::from)
            .collect();
        Self(id)
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A room's name: the key under which its state lives in the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomName(String);

impl RoomName {
    /// Wraps a room name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Inbound envelope
// ---------------------------------------------------------------------------

/// The room-scoped event envelope every client message arrives in:
/// `{ "event": ..., "room": ..., "data"?: ... }`.
///
/// The envelope decodes leniently: an unknown `event` tag or a missing
/// `room` is a droppable message, not a decode failure. Interpretation
/// of `data` happens in [`ClientEnvelope::command`], per event tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientEnvelope {
    pub event: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room: Option<RoomName>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

/// A validated, typed command extracted from a [`ClientEnvelope`].
#[derive(Debug, Clone, PartialEq)]
pub enum ClientCommand {
    /// `connect`: join the envelope's room.
    Join,
    /// `update` / `setup`: replace the room's board wholesale.
    UpdateBoard(BoardData),
    /// `pieceUpdate`: mutate a single piece.
    UpdatePiece(PieceUpdate),
}

impl ClientEnvelope {
    /// Interprets the envelope's `data` according to its event tag.
    ///
    /// Returns `Ok(None)` for unknown event tags (the caller logs and
    /// drops them) and `Err` when a known tag carries a malformed or
    /// missing payload.
    pub fn command(&self) -> Result<Option<ClientCommand>, ProtocolError> {
        match self.event.as_str() {
            "connect" => Ok(Some(ClientCommand::Join)),
            "update" | "setup" => {
                let board = self.typed_data::<BoardData>()?;
                Ok(Some(ClientCommand::UpdateBoard(board)))
            }
            "pieceUpdate" => {
                let update = self.typed_data::<PieceUpdate>()?;
                Ok(Some(ClientCommand::UpdatePiece(update)))
            }
            _ => Ok(None),
        }
    }

    fn typed_data<T: serde::de::DeserializeOwned>(&self) -> Result<T, ProtocolError> {
        let data = self.data.clone().ok_or_else(|| {
            ProtocolError::InvalidMessage(format!(
                "`{}` event carries no data payload",
                self.event
            ))
        })?;
        serde_json::from_value(data).map_err(ProtocolError::Decode)
    }
}

// ---------------------------------------------------------------------------
// Outbound events
// ---------------------------------------------------------------------------

/// Payload of the `connected` event sent to a joiner: the board as it
/// stands plus the (pruned) roster, joiner included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectedPayload {
    pub board_data: BoardData,
    pub players: Vec<ParticipantId>,
}

/// Payload of the `playerConnected` notification sent to a room's
/// existing occupants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerConnectedPayload {
    pub player_id: ParticipantId,
}

/// Payload of the `error` event, the only participant-visible failure
/// signal. Human-readable message, no error-code taxonomy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub message: String,
}

/// A message from the relay to one participant, serialized as
/// `{ "event": "<tag>", "data": ... }`.
///
/// Forwarded board snapshots and piece descriptors are tagged with
/// whatever `event` field they themselves declare, so the tag is
/// dynamic, which is why serialization is hand-written rather than a
/// serde-tagged enum.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerEvent {
    /// Join acknowledgment carrying board + roster.
    Connected(ConnectedPayload),
    /// A peer joined the room.
    PlayerConnected(PlayerConnectedPayload),
    /// A forwarded whole-board snapshot, tagged by its own `event`.
    Board(BoardData),
    /// A forwarded piece descriptor, tagged by its own `event`.
    Piece(PieceUpdate),
    /// Operation failed; sent to the originating participant only.
    Error(ErrorPayload),
}

impl ServerEvent {
    /// Builds a `connected` event.
    pub fn connected(board_data: BoardData, players: Vec<ParticipantId>) -> Self {
        Self::Connected(ConnectedPayload {
            board_data,
            players,
        })
    }

    /// Builds a `playerConnected` notification.
    pub fn player_connected(player_id: ParticipantId) -> Self {
        Self::PlayerConnected(PlayerConnectedPayload { player_id })
    }

    /// Builds an `error` event.
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error(ErrorPayload {
            message: message.into(),
        })
    }

    /// The wire tag this event is published under.
    pub fn tag(&self) -> &str {
        match self {
            Self::Connected(_) => "connected",
            Self::PlayerConnected(_) => "playerConnected",
            Self::Board(board) => &board.event,
            Self::Piece(update) => &update.event,
            Self::Error(_) => "error",
        }
    }
}

impl Serialize for ServerEvent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("ServerEvent", 2)?;
        s.serialize_field("event", self.tag())?;
        match self {
            Self::Connected(payload) => s.serialize_field("data", payload)?,
            Self::PlayerConnected(payload) => s.serialize_field("data", payload)?,
            Self::Board(board) => s.serialize_field("data", board)?,
            Self::Piece(update) => s.serialize_field("data", update)?,
            Self::Error(payload) => s.serialize_field("data", payload)?,
        }
        s.end()
    }
}
