//! Per-lobby state.

use doodle_protocol::{LobbyId, Player, PlayerId};
use doodle_timer::{Delay, RoundTimer};
use serde::Serialize;

use crate::LobbyPhase;

/// One lobby's mutable state. Owned by the registry, never shared.
#[derive(Debug)]
pub(crate) struct Lobby {
    pub(crate) id: LobbyId,
    /// Join order. Rotation follows this order.
    pub(crate) players: Vec<Player>,
    pub(crate) current_drawer: Option<PlayerId>,
    pub(crate) round_time_remaining: u32,
    pub(crate) secret_word: String,
    pub(crate) phase: LobbyPhase,
    /// Bumped on every round start. Timer events carry the round they were
    /// armed for, so events from a replaced timer can be recognized.
    pub(crate) round: u64,
    pub(crate) timer: RoundTimer,
    pub(crate) pending_rotation: Delay,
}

impl Lobby {
    pub(crate) fn new(id: LobbyId, round_secs: u32) -> Self {
        Self {
            id,
            players: Vec::new(),
            current_drawer: None,
            round_time_remaining: round_secs,
            secret_word: String::new(),
            phase: LobbyPhase::Idle,
            round: 0,
            timer: RoundTimer::idle(),
            pending_rotation: Delay::default(),
        }
    }

    pub(crate) fn contains(&self, player: PlayerId) -> bool {
        self.players.iter().any(|p| p.id == player)
    }

    pub(crate) fn username_taken(&self, username: &str) -> bool {
        self.players.iter().any(|p| p.username == username)
    }

    pub(crate) fn username_of(&self, player: PlayerId) -> Option<&str> {
        self.players
            .iter()
            .find(|p| p.id == player)
            .map(|p| p.username.as_str())
    }

    /// Removes the player if present. Returns `true` if the list changed.
    pub(crate) fn remove_player(&mut self, player: PlayerId) -> bool {
        let before = self.players.len();
        self.players.retain(|p| p.id != player);
        self.players.len() != before
    }

    /// Cancels the round timer and any scheduled rotation.
    pub(crate) fn stop_clocks(&mut self) {
        self.timer.cancel();
        self.pending_rotation.cancel();
    }

    /// Moves to `next` if the state machine allows it.
    pub(crate) fn enter(&mut self, next: LobbyPhase) -> bool {
        if !self.phase.can_transition_to(next) {
            tracing::error!(
                lobby_id = %self.id,
                from = %self.phase,
                to = %next,
                "illegal lobby phase transition refused"
            );
            return false;
        }
        if self.phase != next {
            tracing::debug!(lobby_id = %self.id, from = %self.phase, to = %next, "lobby phase");
        }
        self.phase = next;
        true
    }

    pub(crate) fn snapshot(&self) -> LobbySnapshot {
        LobbySnapshot {
            lobby_id: self.id.clone(),
            players: self.players.clone(),
            current_drawer: self.current_drawer,
            round_time_remaining: self.round_time_remaining,
            secret_word: self.secret_word.clone(),
            phase: self.phase,
            round: self.round,
            timer_running: self.timer.is_running(),
            rotation_pending: self.pending_rotation.is_pending(),
        }
    }
}

/// A point-in-time copy of a lobby, for logging and tests.
///
/// Includes the secret word, so never send it to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LobbySnapshot {
    pub lobby_id: LobbyId,
    pub players: Vec<Player>,
    pub current_drawer: Option<PlayerId>,
    pub round_time_remaining: u32,
    pub secret_word: String,
    pub phase: LobbyPhase,
    pub round: u64,
    pub timer_running: bool,
    pub rotation_pending: bool,
}
