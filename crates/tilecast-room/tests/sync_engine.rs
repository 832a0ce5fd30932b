//! Scenario tests for the synchronization engine: join, board
//! replacement, piece updates, roster pruning, and fan-out exclusion,
//! all driven against the in-memory store and real registry channels.

use tilecast_protocol::{
    BoardData, Center, ParticipantId, PieceAction, PieceKind, PieceState,
    PieceUpdate, RoomName, ServerEvent, Tile,
};
use tilecast_room::{ConnectionRegistry, EventReceiver, SyncEngine};
use tilecast_store::{MemoryStore, RoomStore};

// =========================================================================
// Helpers
// =========================================================================

fn pid(id: &str) -> ParticipantId {
    ParticipantId::new(id)
}

fn room(name: &str) -> RoomName {
    RoomName::new(name)
}

fn engine() -> SyncEngine<MemoryStore> {
    SyncEngine::new(MemoryStore::new(), ConnectionRegistry::new())
}

/// Registers a live participant and returns the receiving end of their
/// outbound queue.
fn connect(engine: &SyncEngine<MemoryStore>, id: &str) -> EventReceiver {
    let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
    engine.registry().register(pid(id), tx);
    rx
}

/// Registers a participant whose connection is already gone.
fn connect_stale(engine: &SyncEngine<MemoryStore>, id: &str) {
    let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
    drop(rx);
    engine.registry().register(pid(id), tx);
}

/// Drains every event queued so far.
fn drain(rx: &mut EventReceiver) -> Vec<ServerEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

fn piece(kind: PieceKind, name: &str, state: PieceState) -> PieceUpdate {
    PieceUpdate {
        event: "pieceUpdate".into(),
        piece: kind,
        name: name.into(),
        state,
    }
}

fn create_tile(name: &str, x: f64, y: f64) -> PieceUpdate {
    piece(
        PieceKind::Tile,
        name,
        PieceState {
            action: Some(PieceAction::Create),
            x: Some(x),
            y: Some(y),
            ..PieceState::default()
        },
    )
}

// =========================================================================
// JoinRoom
// =========================================================================

#[tokio::test]
async fn first_join_creates_room_with_seed_state() {
    let engine = engine();
    let mut p1 = connect(&engine, "P1");

    engine.join_room(&room("table1"), &pid("P1")).await.unwrap();

    let stored = engine_store(&engine).get(&room("table1")).await.unwrap().unwrap();
    assert_eq!(stored.players, vec![pid("P1")]);
    assert!(stored.board_data.tiles.is_empty());
    assert!(stored.board_data.trains.is_empty());
    assert_eq!(stored.board_data.center, Center { x: 0.0, y: 0.0 });

    let events = drain(&mut p1);
    assert_eq!(events.len(), 1);
    match &events[0] {
        ServerEvent::Connected(payload) => {
            assert_eq!(payload.players, vec![pid("P1")]);
            assert!(payload.board_data.tiles.is_empty());
        }
        other => panic!("expected connected, got {other:?}"),
    }
}

#[tokio::test]
async fn second_join_notifies_existing_occupants() {
    let engine = engine();
    let mut p1 = connect(&engine, "P1");
    let mut p2 = connect(&engine, "P2");

    engine.join_room(&room("table1"), &pid("P1")).await.unwrap();
    drain(&mut p1);

    engine.join_room(&room("table1"), &pid("P2")).await.unwrap();

    // P1 hears about P2 exactly once.
    let p1_events = drain(&mut p1);
    assert_eq!(p1_events.len(), 1);
    match &p1_events[0] {
        ServerEvent::PlayerConnected(payload) => {
            assert_eq!(payload.player_id, pid("P2"));
        }
        other => panic!("expected playerConnected, got {other:?}"),
    }

    // P2's connected payload includes both occupants, in join order.
    let p2_events = drain(&mut p2);
    assert_eq!(p2_events.len(), 1);
    match &p2_events[0] {
        ServerEvent::Connected(payload) => {
            assert_eq!(payload.players, vec![pid("P1"), pid("P2")]);
        }
        other => panic!("expected connected, got {other:?}"),
    }

    let stored = engine_store(&engine).get(&room("table1")).await.unwrap().unwrap();
    assert_eq!(stored.players, vec![pid("P1"), pid("P2")]);
}

#[tokio::test]
async fn join_prunes_stale_occupants() {
    let engine = engine();
    let mut p1 = connect(&engine, "P1");

    engine.join_room(&room("table1"), &pid("P1")).await.unwrap();
    connect_stale(&engine, "P2");
    engine.join_room(&room("table1"), &pid("P2")).await.unwrap();
    drain(&mut p1);

    let mut p3 = connect(&engine, "P3");
    engine.join_room(&room("table1"), &pid("P3")).await.unwrap();

    // P2's dead entry is gone; survivors are P1 and the joiner.
    let stored = engine_store(&engine).get(&room("table1")).await.unwrap().unwrap();
    assert_eq!(stored.players, vec![pid("P1"), pid("P3")]);

    let p1_events = drain(&mut p1);
    assert_eq!(p1_events.len(), 1);
    assert_eq!(p1_events[0].tag(), "playerConnected");

    let p3_events = drain(&mut p3);
    match &p3_events[0] {
        ServerEvent::Connected(payload) => {
            assert_eq!(payload.players, vec![pid("P1"), pid("P3")]);
        }
        other => panic!("expected connected, got {other:?}"),
    }
}

#[tokio::test]
async fn rejoin_does_not_duplicate_roster_entry() {
    let engine = engine();
    let mut p1 = connect(&engine, "P1");

    engine.join_room(&room("table1"), &pid("P1")).await.unwrap();
    engine.join_room(&room("table1"), &pid("P1")).await.unwrap();

    let stored = engine_store(&engine).get(&room("table1")).await.unwrap().unwrap();
    assert_eq!(stored.players, vec![pid("P1")]);

    // Two connected acks, no self-notification.
    let events = drain(&mut p1);
    assert_eq!(events.len(), 2);
    assert!(events.iter().all(|event| event.tag() == "connected"));
}

#[tokio::test]
async fn join_surfaces_corrupt_room_state() {
    let store = MemoryStore::new();
    store.insert_raw(&room("table1"), "{definitely not json");
    let engine = SyncEngine::new(store, ConnectionRegistry::new());
    let mut p1 = connect(&engine, "P1");

    let result = engine.join_room(&room("table1"), &pid("P1")).await;
    assert!(result.is_err());

    // The engine reports the failure to its caller; nothing is sent on
    // its own authority.
    assert!(drain(&mut p1).is_empty());
}

// =========================================================================
// UpdateBoard
// =========================================================================

#[tokio::test]
async fn board_update_replaces_state_and_forwards_to_peers() {
    let engine = engine();
    let mut p1 = connect(&engine, "P1");
    let mut p2 = connect(&engine, "P2");
    engine.join_room(&room("table1"), &pid("P1")).await.unwrap();
    engine.join_room(&room("table1"), &pid("P2")).await.unwrap();
    drain(&mut p1);
    drain(&mut p2);

    let board = BoardData {
        event: "update".into(),
        tiles: vec![Tile {
            name: "3x4".into(),
            x: 100.0,
            y: 100.0,
            rotation: 0.0,
            flipped: false,
        }],
        center: Center { x: 50.0, y: 60.0 },
        trains: Vec::new(),
    };
    engine
        .update_board(&room("table1"), board.clone(), &pid("P1"))
        .await
        .unwrap();

    // The sender never receives its own echo.
    assert!(drain(&mut p1).is_empty());

    let p2_events = drain(&mut p2);
    assert_eq!(p2_events.len(), 1);
    match &p2_events[0] {
        ServerEvent::Board(forwarded) => {
            assert_eq!(forwarded, &board);
            assert_eq!(p2_events[0].tag(), "update");
        }
        other => panic!("expected board snapshot, got {other:?}"),
    }

    let stored = engine_store(&engine).get(&room("table1")).await.unwrap().unwrap();
    assert_eq!(stored.board_data, board);
}

#[tokio::test]
async fn board_update_for_unknown_room_is_a_silent_no_op() {
    let engine = engine();
    let mut p1 = connect(&engine, "P1");

    engine
        .update_board(&room("nowhere"), BoardData::default(), &pid("P1"))
        .await
        .unwrap();

    assert!(drain(&mut p1).is_empty());
    assert!(engine_store(&engine).get(&room("nowhere")).await.unwrap().is_none());
}

// =========================================================================
// UpdatePiece
// =========================================================================

#[tokio::test]
async fn piece_update_forwards_descriptor_and_prunes() {
    let engine = engine();
    let mut p1 = connect(&engine, "P1");
    let mut q = connect(&engine, "Q");
    engine.join_room(&room("table1"), &pid("P1")).await.unwrap();
    engine.join_room(&room("table1"), &pid("Q")).await.unwrap();
    connect_stale(&engine, "R");
    engine.join_room(&room("table1"), &pid("R")).await.unwrap();
    drain(&mut p1);
    drain(&mut q);

    let update = create_tile("3x4", 100.0, 100.0);
    engine
        .update_piece(&room("table1"), update.clone(), &pid("P1"))
        .await
        .unwrap();

    // Q is live and not the sender: exactly one forwarded descriptor.
    let q_events = drain(&mut q);
    assert_eq!(q_events.len(), 1);
    match &q_events[0] {
        ServerEvent::Piece(forwarded) => assert_eq!(forwarded, &update),
        other => panic!("expected piece descriptor, got {other:?}"),
    }

    // P never echoes; R is pruned from the persisted roster.
    assert!(drain(&mut p1).is_empty());
    let stored = engine_store(&engine).get(&room("table1")).await.unwrap().unwrap();
    assert_eq!(stored.players, vec![pid("P1"), pid("Q")]);
    assert_eq!(stored.board_data.tiles.len(), 1);
}

#[tokio::test]
async fn duplicate_create_persists_two_records() {
    let engine = engine();
    let _p1 = connect(&engine, "P1");
    engine.join_room(&room("table1"), &pid("P1")).await.unwrap();

    let update = create_tile("5x5", 1.0, 2.0);
    engine
        .update_piece(&room("table1"), update.clone(), &pid("P1"))
        .await
        .unwrap();
    engine
        .update_piece(&room("table1"), update, &pid("P1"))
        .await
        .unwrap();

    let stored = engine_store(&engine).get(&room("table1")).await.unwrap().unwrap();
    let named: Vec<_> = stored
        .board_data
        .tiles
        .iter()
        .filter(|tile| tile.name == "5x5")
        .collect();
    assert_eq!(named.len(), 2, "create must not dedup");
}

#[tokio::test]
async fn destroy_is_idempotent_across_operations() {
    let engine = engine();
    let _p1 = connect(&engine, "P1");
    engine.join_room(&room("table1"), &pid("P1")).await.unwrap();
    engine
        .update_piece(&room("table1"), create_tile("5x5", 0.0, 0.0), &pid("P1"))
        .await
        .unwrap();

    let destroy = piece(
        PieceKind::Tile,
        "5x5",
        PieceState {
            action: Some(PieceAction::Destroy),
            ..PieceState::default()
        },
    );
    engine
        .update_piece(&room("table1"), destroy.clone(), &pid("P1"))
        .await
        .unwrap();
    engine
        .update_piece(&room("table1"), destroy, &pid("P1"))
        .await
        .unwrap();

    let stored = engine_store(&engine).get(&room("table1")).await.unwrap().unwrap();
    assert!(stored.board_data.tiles.iter().all(|tile| tile.name != "5x5"));
}

#[tokio::test]
async fn move_rotation_zero_is_persisted_as_unchanged() {
    let engine = engine();
    let _p1 = connect(&engine, "P1");
    engine.join_room(&room("table1"), &pid("P1")).await.unwrap();
    engine
        .update_piece(
            &room("table1"),
            piece(
                PieceKind::Tile,
                "3x4",
                PieceState {
                    action: Some(PieceAction::Create),
                    x: Some(0.0),
                    y: Some(0.0),
                    rotation: Some(90.0),
                    ..PieceState::default()
                },
            ),
            &pid("P1"),
        )
        .await
        .unwrap();

    engine
        .update_piece(
            &room("table1"),
            piece(
                PieceKind::Tile,
                "3x4",
                PieceState {
                    action: Some(PieceAction::Move),
                    x: Some(10.0),
                    y: Some(20.0),
                    rotation: Some(0.0),
                    ..PieceState::default()
                },
            ),
            &pid("P1"),
        )
        .await
        .unwrap();

    let stored = engine_store(&engine).get(&room("table1")).await.unwrap().unwrap();
    let tile = &stored.board_data.tiles[0];
    assert_eq!((tile.x, tile.y), (10.0, 20.0));
    assert_eq!(tile.rotation, 90.0, "rotation 0 must not be written");
}

#[tokio::test]
async fn piece_update_for_unknown_room_is_a_silent_no_op() {
    let engine = engine();
    let mut p1 = connect(&engine, "P1");

    engine
        .update_piece(&room("nowhere"), create_tile("5x5", 0.0, 0.0), &pid("P1"))
        .await
        .unwrap();

    assert!(drain(&mut p1).is_empty());
    assert!(engine_store(&engine).get(&room("nowhere")).await.unwrap().is_none());
}

#[tokio::test]
async fn names_stay_unique_without_duplicate_creates() {
    let engine = engine();
    let _p1 = connect(&engine, "P1");
    engine.join_room(&room("table1"), &pid("P1")).await.unwrap();

    engine
        .update_piece(&room("table1"), create_tile("a", 0.0, 0.0), &pid("P1"))
        .await
        .unwrap();
    engine
        .update_piece(&room("table1"), create_tile("b", 1.0, 1.0), &pid("P1"))
        .await
        .unwrap();
    engine
        .update_piece(
            &room("table1"),
            piece(
                PieceKind::Tile,
                "a",
                PieceState {
                    action: Some(PieceAction::Move),
                    x: Some(5.0),
                    y: Some(5.0),
                    ..PieceState::default()
                },
            ),
            &pid("P1"),
        )
        .await
        .unwrap();
    engine
        .update_piece(
            &room("table1"),
            piece(
                PieceKind::Tile,
                "b",
                PieceState {
                    action: Some(PieceAction::Destroy),
                    ..PieceState::default()
                },
            ),
            &pid("P1"),
        )
        .await
        .unwrap();

    let stored = engine_store(&engine).get(&room("table1")).await.unwrap().unwrap();
    let mut names: Vec<_> = stored
        .board_data
        .tiles
        .iter()
        .map(|tile| tile.name.clone())
        .collect();
    names.sort();
    names.dedup();
    assert_eq!(names.len(), stored.board_data.tiles.len());
}

// =========================================================================
// Full scenario
// =========================================================================

#[tokio::test]
async fn table1_join_create_join_scenario() {
    let engine = engine();
    let mut p1 = connect(&engine, "P1");

    // P1 connects to an empty room.
    engine.join_room(&room("table1"), &pid("P1")).await.unwrap();
    drain(&mut p1);

    // P1 creates tile 3x4 at (100, 100).
    engine
        .update_piece(&room("table1"), create_tile("3x4", 100.0, 100.0), &pid("P1"))
        .await
        .unwrap();

    // P2 connects.
    let mut p2 = connect(&engine, "P2");
    engine.join_room(&room("table1"), &pid("P2")).await.unwrap();

    // P2 sees the tile P1 placed, and the full roster.
    let p2_events = drain(&mut p2);
    assert_eq!(p2_events.len(), 1);
    match &p2_events[0] {
        ServerEvent::Connected(payload) => {
            assert_eq!(payload.players, vec![pid("P1"), pid("P2")]);
            assert_eq!(payload.board_data.tiles.len(), 1);
            let tile = &payload.board_data.tiles[0];
            assert_eq!(tile.name, "3x4");
            assert_eq!((tile.x, tile.y), (100.0, 100.0));
        }
        other => panic!("expected connected, got {other:?}"),
    }

    // P1 is told about P2.
    let p1_events = drain(&mut p1);
    assert_eq!(p1_events.len(), 1);
    match &p1_events[0] {
        ServerEvent::PlayerConnected(payload) => {
            assert_eq!(payload.player_id, pid("P2"));
        }
        other => panic!("expected playerConnected, got {other:?}"),
    }
}

// =========================================================================
// Store access helper
// =========================================================================

/// Reads back through the engine's own store handle.
fn engine_store(engine: &SyncEngine<MemoryStore>) -> MemoryStore {
    engine.store().clone()
}
