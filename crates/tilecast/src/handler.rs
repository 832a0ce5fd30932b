//! Per-connection session lifecycle: registration, the read/dispatch
//! loop, the outbound writer task, and disconnect cleanup.
//!
//! Each accepted connection gets its own Tokio task running this
//! handler. The flow is:
//!   1. Mint a participant id and register an outbound channel
//!   2. Spawn a writer task draining that channel onto the socket
//!   3. Loop: receive envelopes → dispatch to the engine
//!   4. On close: unregister; peers observe the departure when the
//!      next room mutation prunes the roster

use std::sync::Arc;

use tilecast_protocol::{
    ClientCommand, ClientEnvelope, Codec, JsonCodec, ParticipantId, ServerEvent,
};
use tilecast_room::EventReceiver;
use tilecast_store::RoomStore;
use tilecast_transport::{Connection, WebSocketConnection};

use crate::server::ServerState;
use crate::TilecastError;

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<S: RoomStore>(
    conn: WebSocketConnection,
    state: Arc<ServerState<S>>,
) -> Result<(), TilecastError> {
    let conn_id = conn.id();
    let participant = ParticipantId::generate();
    tracing::info!(%conn_id, %participant, "participant connected");

    let conn = Arc::new(conn);
    let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
    state.engine.registry().register(participant.clone(), tx);

    let writer = tokio::spawn(write_outbound(Arc::clone(&conn), rx, state.codec));

    let result = read_loop(&conn, &state, &participant).await;

    // Unregistering closes the outbound channel; the writer drains what
    // is queued and exits. Peers learn of the departure on the next
    // mutating operation's prune; there is no eager broadcast.
    state.engine.registry().unregister(&participant);
    let _ = writer.await;
    tracing::info!(%conn_id, %participant, "participant disconnected");

    result
}

/// Drains the participant's outbound queue onto the socket.
async fn write_outbound(
    conn: Arc<WebSocketConnection>,
    mut rx: EventReceiver,
    codec: JsonCodec,
) {
    while let Some(event) = rx.recv().await {
        let bytes = match codec.encode(&event) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::error!(error = %e, "failed to encode outbound event");
                continue;
            }
        };
        if let Err(e) = conn.send(&bytes).await {
            tracing::debug!(error = %e, "outbound send failed, stopping writer");
            break;
        }
    }
}

/// Receives envelopes until the connection closes or fails.
async fn read_loop<S: RoomStore>(
    conn: &WebSocketConnection,
    state: &ServerState<S>,
    participant: &ParticipantId,
) -> Result<(), TilecastError> {
    loop {
        let data = match conn.recv().await {
            Ok(Some(data)) => data,
            Ok(None) => {
                tracing::info!(%participant, "connection closed cleanly");
                return Ok(());
            }
            Err(e) => {
                tracing::debug!(%participant, error = %e, "recv error");
                return Err(e.into());
            }
        };

        let envelope: ClientEnvelope = match state.codec.decode(&data) {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::debug!(
                    %participant, error = %e,
                    "failed to decode envelope, dropping"
                );
                continue;
            }
        };

        dispatch(state, participant, envelope).await;
    }
}

/// Routes one envelope to the engine.
///
/// Malformed input never reaches the sender as an error; it is logged
/// and dropped. Only store failures inside the engine produce a
/// participant-visible `error` event, and only to the originator.
async fn dispatch<S: RoomStore>(
    state: &ServerState<S>,
    participant: &ParticipantId,
    envelope: ClientEnvelope,
) {
    let Some(room) = envelope.room.clone() else {
        tracing::warn!(
            %participant, event = %envelope.event,
            "message without room, dropping"
        );
        return;
    };

    let command = match envelope.command() {
        Ok(Some(command)) => command,
        Ok(None) => {
            tracing::debug!(
                %participant, event = %envelope.event,
                "unknown event tag, dropping"
            );
            return;
        }
        Err(e) => {
            tracing::warn!(
                %participant, %room, error = %e,
                "malformed payload, dropping"
            );
            return;
        }
    };

    let result = match command {
        ClientCommand::Join => state.engine.join_room(&room, participant).await,
        ClientCommand::UpdateBoard(board) => {
            state.engine.update_board(&room, board, participant).await
        }
        ClientCommand::UpdatePiece(update) => {
            state.engine.update_piece(&room, update, participant).await
        }
    };

    if let Err(e) = result {
        tracing::error!(%participant, %room, error = %e, "room operation failed");
        state
            .engine
            .registry()
            .send(participant, ServerEvent::error(e.to_string()));
    }
}
