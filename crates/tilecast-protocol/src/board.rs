//! The room state model: what a room's stored JSON looks like, and the
//! piece descriptors that mutate it.
//!
//! Field names here are the wire contract: clients and the store both
//! see camelCase JSON, so every struct pins its serialized names with
//! serde attributes rather than relying on Rust field names.

use serde::{Deserialize, Serialize};

use crate::types::ParticipantId;

/// A room as persisted in the store: its occupant roster plus the board.
///
/// Absence of a room key in the store means "room does not exist yet";
/// a room is never deleted once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    /// Participant ids in join order. Pruned against live connections on
    /// every mutating operation.
    #[serde(default)]
    pub players: Vec<ParticipantId>,

    #[serde(default)]
    pub board_data: BoardData,
}

impl Room {
    /// The seed state for a lazily-created room: a single occupant and
    /// an empty board.
    pub fn seeded(joiner: ParticipantId) -> Self {
        Self {
            players: vec![joiner],
            board_data: BoardData::default(),
        }
    }
}

/// The shared board: tile layout, the room's single center object, and
/// train tokens.
///
/// Every field tolerates absence when decoding, since stored documents
/// older clients may be partially populated. A document that is not
/// valid JSON at all is a store-level contract violation, not something
/// this type papers over.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardData {
    /// Tag of the last structural operation (`setup` or `update`),
    /// forwarded to clients verbatim.
    #[serde(default)]
    pub event: String,

    #[serde(default)]
    pub tiles: Vec<Tile>,

    #[serde(default)]
    pub center: Center,

    #[serde(default)]
    pub trains: Vec<Train>,
}

impl Default for BoardData {
    fn default() -> Self {
        Self {
            event: "setup".to_string(),
            tiles: Vec::new(),
            center: Center::default(),
            trains: Vec::new(),
        }
    }
}

/// A placed tile. `name` is the lookup key within a room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    pub name: String,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub rotation: f64,
    #[serde(default)]
    pub flipped: bool,
}

/// The room's single center object. Always present once a room is set up.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Center {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
}

/// A train token. `name` is the lookup key within a room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Train {
    pub name: String,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
}

/// A piece-level mutation, sent by a client and forwarded whole to the
/// rest of the room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PieceUpdate {
    /// Event tag the descriptor carries (`pieceUpdate` in practice);
    /// used as-is when forwarding.
    #[serde(default)]
    pub event: String,

    pub piece: PieceKind,

    pub name: String,

    #[serde(default)]
    pub state: PieceState,
}

/// Which kind of board element a piece update addresses.
///
/// Unrecognized tags are kept verbatim: the mutation becomes a no-op
/// but the descriptor is still forwarded unchanged, matching the
/// relay's shape-check-only validation posture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PieceKind {
    Train,
    Center,
    Tile,
    Other(String),
}

impl From<String> for PieceKind {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "train" => Self::Train,
            "center" => Self::Center,
            "tile" => Self::Tile,
            _ => Self::Other(tag),
        }
    }
}

impl From<PieceKind> for String {
    fn from(kind: PieceKind) -> Self {
        match kind {
            PieceKind::Train => "train".to_string(),
            PieceKind::Center => "center".to_string(),
            PieceKind::Tile => "tile".to_string(),
            PieceKind::Other(tag) => tag,
        }
    }
}

/// The action a tile update requests. Same verbatim treatment of
/// unrecognized tags as [`PieceKind`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PieceAction {
    Move,
    Create,
    Destroy,
    Other(String),
}

impl From<String> for PieceAction {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "move" => Self::Move,
            "create" => Self::Create,
            "destroy" => Self::Destroy,
            _ => Self::Other(tag),
        }
    }
}

impl From<PieceAction> for String {
    fn from(action: PieceAction) -> Self {
        match action {
            PieceAction::Move => "move".to_string(),
            PieceAction::Create => "create".to_string(),
            PieceAction::Destroy => "destroy".to_string(),
            PieceAction::Other(tag) => tag,
        }
    }
}

/// The fields a piece update may carry. All optional: a move typically
/// sends coordinates only, a create sends the full set.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PieceState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<PieceAction>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flipped: Option<bool>,
}
