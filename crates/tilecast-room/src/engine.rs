//! The synchronization engine: read-modify-prune-write-broadcast.
//!
//! Operations on the same room may interleave at the store await
//! points; there is no per-room lock or concurrency token, so the
//! last writer to finish its cycle wins. Accepted for the expected
//! write rates (a handful of players per room).

use tilecast_protocol::{
    BoardData, ParticipantId, PieceAction, PieceKind, PieceUpdate, Room,
    RoomName, ServerEvent, Tile,
};
use tilecast_store::RoomStore;

use crate::{ConnectionRegistry, SyncError};

/// Applies room operations against the store and fans results out to
/// the room's surviving occupants.
pub struct SyncEngine<S> {
    store: S,
    registry: ConnectionRegistry,
}

impl<S: RoomStore> SyncEngine<S> {
    /// Creates an engine over the given store and connection registry.
    pub fn new(store: S, registry: ConnectionRegistry) -> Self {
        Self { store, registry }
    }

    /// The registry connections are tracked in.
    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    /// The store room state is persisted in.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Joins a participant to a room, creating the room on first join.
    ///
    /// Existing occupants with live connections are told about the
    /// joiner; the joiner receives a `connected` event with the board
    /// as it stands and the pruned roster (themselves included).
    pub async fn join_room(
        &self,
        room: &RoomName,
        joiner: &ParticipantId,
    ) -> Result<(), SyncError> {
        let Some(mut state) = self.store.get(room).await? else {
            let fresh = Room::seeded(joiner.clone());
            self.store.set(room, &fresh).await?;
            tracing::info!(%room, participant = %joiner, "room created");
            self.registry.send(
                joiner,
                ServerEvent::connected(fresh.board_data, fresh.players),
            );
            return Ok(());
        };

        if !state.players.contains(joiner) {
            state.players.push(joiner.clone());
        }

        let notice = ServerEvent::player_connected(joiner.clone());
        state.players = self.prune_and_forward(state.players, joiner, &notice);

        self.store.set(room, &state).await?;
        tracing::info!(
            %room,
            participant = %joiner,
            players = state.players.len(),
            "participant joined"
        );

        self.registry.send(
            joiner,
            ServerEvent::connected(state.board_data, state.players),
        );
        Ok(())
    }

    /// Replaces a room's board wholesale and forwards the new board to
    /// every surviving occupant except the sender.
    ///
    /// An update for a room nobody has joined is a logged no-op.
    pub async fn update_board(
        &self,
        room: &RoomName,
        board: BoardData,
        sender: &ParticipantId,
    ) -> Result<(), SyncError> {
        let Some(mut state) = self.store.get(room).await? else {
            tracing::warn!(%room, "board update for nonexistent room, dropping");
            return Ok(());
        };

        state.board_data = board;

        let snapshot = ServerEvent::Board(state.board_data.clone());
        state.players = self.prune_and_forward(state.players, sender, &snapshot);

        self.store.set(room, &state).await?;
        tracing::debug!(%room, tag = %state.board_data.event, "board replaced");
        Ok(())
    }

    /// Applies a single piece mutation and forwards the full descriptor
    /// to every surviving occupant except the sender.
    ///
    /// An update for a room nobody has joined is a logged no-op; so is
    /// a piece reference that doesn't resolve, though the descriptor is still
    /// forwarded.
    pub async fn update_piece(
        &self,
        room: &RoomName,
        update: PieceUpdate,
        sender: &ParticipantId,
    ) -> Result<(), SyncError> {
        let Some(mut state) = self.store.get(room).await? else {
            tracing::warn!(%room, "piece update for nonexistent room, dropping");
            return Ok(());
        };

        apply_piece(&mut state.board_data, &update);

        let descriptor = ServerEvent::Piece(update);
        state.players = self.prune_and_forward(state.players, sender, &descriptor);

        self.store.set(room, &state).await?;
        Ok(())
    }

    /// One pass over the roster: occupants whose connection is gone are
    /// dropped, everyone else survives, and survivors other than
    /// `sender` receive `event`.
    fn prune_and_forward(
        &self,
        players: Vec<ParticipantId>,
        sender: &ParticipantId,
        event: &ServerEvent,
    ) -> Vec<ParticipantId> {
        let mut survivors = Vec::with_capacity(players.len());
        for player in players {
            if !self.registry.is_live(&player) {
                tracing::debug!(participant = %player, "pruning stale participant");
                continue;
            }
            if &player != sender {
                self.registry.send(&player, event.clone());
            }
            survivors.push(player);
        }
        survivors
    }
}

/// Mutates the board according to a piece descriptor.
///
/// Unresolved names and unrecognized tags are logged no-ops; the caller
/// forwards the descriptor regardless.
fn apply_piece(board: &mut BoardData, update: &PieceUpdate) {
    match &update.piece {
        PieceKind::Train => {
            let Some(train) = board
                .trains
                .iter_mut()
                .find(|train| train.name == update.name)
            else {
                tracing::debug!(name = %update.name, "no such train, ignoring");
                return;
            };
            if let Some(x) = update.state.x {
                train.x = x;
            }
            if let Some(y) = update.state.y {
                train.y = y;
            }
        }
        PieceKind::Center => {
            // Exactly one center per room, so no lookup.
            if let Some(x) = update.state.x {
                board.center.x = x;
            }
            if let Some(y) = update.state.y {
                board.center.y = y;
            }
        }
        PieceKind::Tile => apply_tile(board, update),
        PieceKind::Other(kind) => {
            tracing::debug!(piece = %kind, "unrecognized piece kind, ignoring");
        }
    }
}

fn apply_tile(board: &mut BoardData, update: &PieceUpdate) {
    match &update.state.action {
        Some(PieceAction::Move) => {
            let Some(tile) = board
                .tiles
                .iter_mut()
                .find(|tile| tile.name == update.name)
            else {
                tracing::debug!(name = %update.name, "no such tile, ignoring move");
                return;
            };
            if let Some(x) = update.state.x {
                tile.x = x;
            }
            if let Some(y) = update.state.y {
                tile.y = y;
            }
            // Clients send rotation 0 and flipped false for "unchanged":
            // only truthy values are ever written by a move.
            if let Some(rotation) = update.state.rotation {
                if rotation != 0.0 {
                    tile.rotation = rotation;
                }
            }
            if update.state.flipped == Some(true) {
                tile.flipped = true;
            }
        }
        Some(PieceAction::Create) => {
            // No dedup: a second create under the same name appends a
            // second record.
            board.tiles.push(Tile {
                name: update.name.clone(),
                x: update.state.x.unwrap_or_default(),
                y: update.state.y.unwrap_or_default(),
                rotation: update.state.rotation.unwrap_or_default(),
                flipped: update.state.flipped.unwrap_or_default(),
            });
        }
        Some(PieceAction::Destroy) => {
            board.tiles.retain(|tile| tile.name != update.name);
        }
        Some(PieceAction::Other(action)) => {
            tracing::debug!(name = %update.name, %action, "unrecognized tile action, ignoring");
        }
        None => {
            tracing::debug!(name = %update.name, "tile update without action, ignoring");
        }
    }
}
