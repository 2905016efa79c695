//! Integration tests for the session coordinator, driven through its handle.
//!
//! Runs on a paused Tokio clock: timer-driven events arrive only when every
//! task is idle, so each test sees a deterministic event order.

use std::time::Duration;

use doodle::prelude::*;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::Instant;

const ALICE: PlayerId = PlayerId(1);
const BOB: PlayerId = PlayerId(2);
const CAROL: PlayerId = PlayerId(3);

fn join(lobby: &str, username: &str) -> ClientEvent {
    ClientEvent::JoinLobby {
        lobby_id: LobbyId::from(lobby),
        username: username.into(),
    }
}

fn choose(lobby: &str, word: &str) -> ClientEvent {
    ClientEvent::ChooseWord {
        lobby_id: LobbyId::from(lobby),
        word: word.into(),
    }
}

fn say(lobby: &str, sender: &str, text: &str) -> ClientEvent {
    ClientEvent::SendMessage {
        text: text.into(),
        sender: sender.into(),
        lobby_id: LobbyId::from(lobby),
    }
}

fn stroke(lobby: &str, x: f64, y: f64) -> ClientEvent {
    ClientEvent::Drawing {
        lobby_id: LobbyId::from(lobby),
        x,
        y,
    }
}

async fn next(rx: &mut UnboundedReceiver<ServerEvent>) -> ServerEvent {
    rx.recv().await.expect("coordinator is running")
}

/// Spawns a coordinator and seats alice (drawer) and bob in lobby L1, with
/// their join events already consumed.
async fn two_player_lobby() -> (
    CoordinatorHandle,
    UnboundedReceiver<ServerEvent>,
    UnboundedReceiver<ServerEvent>,
) {
    let handle = SessionCoordinator::spawn(LobbyConfig::default());
    let mut alice = handle.connect(ALICE).unwrap();
    let mut bob = handle.connect(BOB).unwrap();

    handle.dispatch(ALICE, join("L1", "alice")).unwrap();
    assert!(matches!(next(&mut alice).await, ServerEvent::UpdatePlayers(_)));
    assert_eq!(next(&mut alice).await, ServerEvent::StartRound { drawer: ALICE });

    handle.dispatch(BOB, join("L1", "bob")).unwrap();
    assert!(matches!(next(&mut alice).await, ServerEvent::UpdatePlayers(_)));
    assert!(matches!(next(&mut bob).await, ServerEvent::UpdatePlayers(_)));

    (handle, alice, bob)
}

// =========================================================================
// Joining and leaving
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_first_join_broadcasts_players_then_round_start() {
    let handle = SessionCoordinator::spawn(LobbyConfig::default());
    let mut alice = handle.connect(ALICE).unwrap();

    handle.dispatch(ALICE, join("L1", "alice")).unwrap();
    assert_eq!(
        next(&mut alice).await,
        ServerEvent::UpdatePlayers(vec![Player::new(ALICE, "alice")])
    );
    assert_eq!(next(&mut alice).await, ServerEvent::StartRound { drawer: ALICE });

    let snap = handle.snapshot(LobbyId::from("L1")).await.unwrap().unwrap();
    assert_eq!(snap.phase, LobbyPhase::AwaitingWord);
    assert_eq!(snap.round_time_remaining, 120);
}

#[tokio::test(start_paused = true)]
async fn test_duplicate_username_still_receives_lobby_events() {
    let (handle, mut alice, _bob) = two_player_lobby().await;
    let mut carol = handle.connect(CAROL).unwrap();

    handle.dispatch(CAROL, join("L1", "bob")).unwrap();
    let expected = ServerEvent::UpdatePlayers(vec![
        Player::new(ALICE, "alice"),
        Player::new(BOB, "bob"),
    ]);
    assert_eq!(next(&mut carol).await, expected);
    assert_eq!(next(&mut alice).await, expected);
}

#[tokio::test(start_paused = true)]
async fn test_disconnect_updates_remaining_players() {
    let (handle, mut alice, bob) = two_player_lobby().await;

    handle.disconnect(BOB).unwrap();
    drop(bob);
    assert_eq!(
        next(&mut alice).await,
        ServerEvent::UpdatePlayers(vec![Player::new(ALICE, "alice")])
    );
}

#[tokio::test(start_paused = true)]
async fn test_snapshot_of_unknown_lobby_is_none() {
    let handle = SessionCoordinator::spawn(LobbyConfig::default());
    assert_eq!(handle.snapshot(LobbyId::from("nope")).await.unwrap(), None);
}

#[tokio::test(start_paused = true)]
async fn test_coordinator_stops_when_handles_are_dropped() {
    let handle = SessionCoordinator::spawn(LobbyConfig::default());
    let mut alice = handle.connect(ALICE).unwrap();
    handle.dispatch(ALICE, join("L1", "alice")).unwrap();
    drop(handle);

    // Queued events still arrive, then the channel closes.
    assert!(matches!(alice.recv().await, Some(ServerEvent::UpdatePlayers(_))));
    assert!(matches!(alice.recv().await, Some(ServerEvent::StartRound { .. })));
    assert_eq!(alice.recv().await, None);
}

// =========================================================================
// Drawing
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_drawer_strokes_reach_everyone_else() {
    let (handle, mut alice, mut bob) = two_player_lobby().await;

    handle
        .dispatch(
            ALICE,
            ClientEvent::StartDrawing {
                lobby_id: LobbyId::from("L1"),
                x: 1.0,
                y: 2.0,
            },
        )
        .unwrap();
    handle.dispatch(ALICE, stroke("L1", 3.0, 4.0)).unwrap();

    assert_eq!(next(&mut bob).await, ServerEvent::StartDrawing(Point { x: 1.0, y: 2.0 }));
    assert_eq!(next(&mut bob).await, ServerEvent::Drawing(Point { x: 3.0, y: 4.0 }));

    // The drawer's own strokes are not echoed back.
    handle.dispatch(ALICE, say("L1", "alice", "hi")).unwrap();
    assert!(matches!(next(&mut alice).await, ServerEvent::ReceiveMessage { .. }));
}

#[tokio::test(start_paused = true)]
async fn test_non_drawer_strokes_are_dropped() {
    let (handle, mut alice, _bob) = two_player_lobby().await;

    handle.dispatch(BOB, stroke("L1", 9.0, 9.0)).unwrap();
    handle.dispatch(BOB, say("L1", "bob", "oops")).unwrap();

    assert_eq!(
        next(&mut alice).await,
        ServerEvent::ReceiveMessage {
            text: "oops".into(),
            sender: "bob".into(),
        }
    );
}

// =========================================================================
// Rounds
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_timer_ticks_are_broadcast_each_second() {
    let (_handle, mut alice, mut bob) = two_player_lobby().await;
    let start = Instant::now();

    assert_eq!(next(&mut alice).await, ServerEvent::UpdateTimer(119));
    assert_eq!(start.elapsed(), Duration::from_secs(1));
    assert_eq!(next(&mut bob).await, ServerEvent::UpdateTimer(119));
    assert_eq!(next(&mut alice).await, ServerEvent::UpdateTimer(118));
}

#[tokio::test(start_paused = true)]
async fn test_non_drawer_cannot_choose_word() {
    let (handle, mut alice, _bob) = two_player_lobby().await;

    handle.dispatch(BOB, choose("L1", "dog")).unwrap();
    handle.dispatch(BOB, say("L1", "bob", "dog")).unwrap();

    assert!(matches!(next(&mut alice).await, ServerEvent::ReceiveMessage { .. }));
    let snap = handle.snapshot(LobbyId::from("L1")).await.unwrap().unwrap();
    assert!(snap.secret_word.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_correct_guess_announces_winner_and_rotates() {
    let (handle, mut alice, mut bob) = two_player_lobby().await;

    handle.dispatch(ALICE, choose("L1", "cat")).unwrap();
    assert_eq!(next(&mut bob).await, ServerEvent::WordChosen { word_length: 3 });
    assert_eq!(next(&mut alice).await, ServerEvent::WordChosen { word_length: 3 });

    let won_at = Instant::now();
    handle.dispatch(BOB, say("L1", "bob", "CAT")).unwrap();
    for rx in [&mut alice, &mut bob] {
        assert_eq!(
            next(rx).await,
            ServerEvent::ReceiveMessage {
                text: "CAT".into(),
                sender: "bob".into(),
            }
        );
        assert_eq!(
            next(rx).await,
            ServerEvent::WinnerAnnounced {
                winner: "bob".into(),
                word: "cat".into(),
            }
        );
    }

    assert_eq!(next(&mut alice).await, ServerEvent::StartRound { drawer: BOB });
    assert_eq!(won_at.elapsed(), Duration::from_secs(7));

    // Bob now draws; alice's strokes are no longer relayed.
    handle.dispatch(ALICE, stroke("L1", 0.0, 0.0)).unwrap();
    handle.dispatch(BOB, stroke("L1", 5.0, 5.0)).unwrap();
    assert_eq!(next(&mut alice).await, ServerEvent::Drawing(Point { x: 5.0, y: 5.0 }));
}

#[tokio::test(start_paused = true)]
async fn test_timeout_rotates_with_fresh_round() {
    let config = LobbyConfig {
        round_secs: 3,
        ..LobbyConfig::default()
    };
    let handle = SessionCoordinator::spawn(config);
    let mut alice = handle.connect(ALICE).unwrap();
    let _bob = handle.connect(BOB).unwrap();
    handle.dispatch(ALICE, join("L1", "alice")).unwrap();
    handle.dispatch(BOB, join("L1", "bob")).unwrap();
    handle.dispatch(ALICE, choose("L1", "cat")).unwrap();

    let mut seen = Vec::new();
    loop {
        let event = next(&mut alice).await;
        let done = matches!(event, ServerEvent::StartRound { drawer } if drawer == BOB);
        seen.push(event);
        if done {
            break;
        }
    }
    assert_eq!(
        &seen[seen.len() - 4..],
        &[
            ServerEvent::UpdateTimer(2),
            ServerEvent::UpdateTimer(1),
            ServerEvent::UpdateTimer(0),
            ServerEvent::StartRound { drawer: BOB },
        ]
    );

    let snap = handle.snapshot(LobbyId::from("L1")).await.unwrap().unwrap();
    assert_eq!(snap.round_time_remaining, 3);
    assert!(snap.secret_word.is_empty());
    assert_eq!(snap.current_drawer, Some(BOB));
}
