//! Lobby registry: creates lobbies on demand, tracks membership, and drives
//! each lobby's round cycle.

use std::collections::{BTreeSet, HashMap};

use doodle_protocol::{LobbyId, Player, PlayerId, Recipient, ServerEvent};
use doodle_timer::{Delay, RoundTimer, TimerConfig};
use tokio::sync::mpsc;

use crate::lobby::Lobby;
use crate::{LobbyConfig, LobbyError, LobbyPhase, LobbySnapshot, guess, rotation};

// ---------------------------------------------------------------------------
// Registry I/O types
// ---------------------------------------------------------------------------

/// An event the registry wants delivered inside a lobby's channel.
#[derive(Debug, Clone, PartialEq)]
pub struct Outbound {
    pub lobby_id: LobbyId,
    pub recipient: Recipient,
    pub event: ServerEvent,
}

/// What a lobby timer observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    /// The round clock ticked; seconds left.
    Tick(u32),
    /// The round clock ran out.
    Expired,
    /// The pause after a correct guess is over.
    RotationDue,
}

/// A timer report, tagged with the lobby and round it was armed for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerEvent {
    pub lobby_id: LobbyId,
    pub round: u64,
    pub kind: TimerKind,
}

/// Result of [`LobbyRegistry::submit_guess`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuessOutcome {
    /// The lobby does not exist. Nothing was sent.
    NoOp,
    /// The message was relayed as chat.
    BroadcastOnly,
    /// The message was relayed and it named the word.
    Winner,
}

// ---------------------------------------------------------------------------
// LobbyRegistry
// ---------------------------------------------------------------------------

/// Owns every lobby and the player → lobbies index.
///
/// All methods are synchronous and must be called from a single task. The
/// registry's timers run as separate tasks but only ever send a
/// [`TimerEvent`] back; the owner applies it with [`Self::handle_timer`].
pub struct LobbyRegistry {
    config: LobbyConfig,
    lobbies: HashMap<LobbyId, Lobby>,
    /// Every lobby each player has joined. Lobbies are never deleted, so
    /// entries only go away when the player disconnects.
    memberships: HashMap<PlayerId, BTreeSet<LobbyId>>,
    timer_tx: mpsc::UnboundedSender<TimerEvent>,
    outbox: Vec<Outbound>,
}

impl LobbyRegistry {
    /// Creates an empty registry and the receiver its timers report to.
    pub fn new(config: LobbyConfig) -> (Self, mpsc::UnboundedReceiver<TimerEvent>) {
        let (timer_tx, timer_rx) = mpsc::unbounded_channel();
        let registry = Self {
            config: config.validated(),
            lobbies: HashMap::new(),
            memberships: HashMap::new(),
            timer_tx,
            outbox: Vec::new(),
        };
        (registry, timer_rx)
    }

    /// Returns the (validated) configuration.
    pub fn config(&self) -> &LobbyConfig {
        &self.config
    }

    /// Drains the events queued since the last call, oldest first.
    pub fn take_outbound(&mut self) -> Vec<Outbound> {
        std::mem::take(&mut self.outbox)
    }

    // -----------------------------------------------------------------------
    // Membership
    // -----------------------------------------------------------------------

    /// Adds `player` to the lobby, creating it if needed, and returns the
    /// lobby's player list.
    ///
    /// A join from a connection that is already listed, or under a username
    /// already taken in the lobby, leaves the list as it is; the list is
    /// still re-broadcast. If the lobby has no round going, one starts with
    /// the joiner drawing.
    pub fn join_lobby(&mut self, lobby_id: &LobbyId, player: PlayerId, username: &str) -> Vec<Player> {
        let round_secs = self.config.round_secs;
        let lobby = self.lobbies.entry(lobby_id.clone()).or_insert_with(|| {
            tracing::info!(%lobby_id, "lobby created");
            Lobby::new(lobby_id.clone(), round_secs)
        });

        if lobby.contains(player) || lobby.username_taken(username) {
            tracing::debug!(%lobby_id, %player, username, "duplicate join ignored");
        } else {
            lobby.players.push(Player::new(player, username));
            self.memberships
                .entry(player)
                .or_default()
                .insert(lobby_id.clone());
            tracing::info!(
                %lobby_id,
                %player,
                username,
                player_count = lobby.players.len(),
                "player joined lobby"
            );
        }

        let players = lobby.players.clone();
        self.outbox.push(Outbound {
            lobby_id: lobby_id.clone(),
            recipient: Recipient::All,
            event: ServerEvent::UpdatePlayers(players.clone()),
        });

        if lobby.phase == LobbyPhase::Idle && !players.is_empty() {
            lobby.current_drawer = if lobby.contains(player) {
                Some(player)
            } else {
                players.first().map(|p| p.id)
            };
            self.start_round(lobby_id);
        }
        players
    }

    /// Removes `player` from every lobby it joined.
    ///
    /// Returns each affected lobby with its remaining players. Lobbies are
    /// kept even when they empty out, and the round keeps running: the
    /// timer moves the lobby on when it expires.
    pub fn leave_lobby(&mut self, player: PlayerId) -> Vec<(LobbyId, Vec<Player>)> {
        let Some(lobby_ids) = self.memberships.remove(&player) else {
            return Vec::new();
        };

        let mut affected = Vec::with_capacity(lobby_ids.len());
        for lobby_id in lobby_ids {
            let Some(lobby) = self.lobbies.get_mut(&lobby_id) else {
                continue;
            };
            if !lobby.remove_player(player) {
                continue;
            }
            tracing::info!(
                %lobby_id,
                %player,
                player_count = lobby.players.len(),
                "player left lobby"
            );
            let players = lobby.players.clone();
            self.outbox.push(Outbound {
                lobby_id: lobby_id.clone(),
                recipient: Recipient::All,
                event: ServerEvent::UpdatePlayers(players.clone()),
            });
            affected.push((lobby_id, players));
        }
        affected
    }

    // -----------------------------------------------------------------------
    // Round play
    // -----------------------------------------------------------------------

    /// Sets the secret word for the round and returns its length in
    /// characters.
    ///
    /// Only the current drawer may choose, only while the round is live,
    /// and the word must be non-empty. Choosing again replaces the word
    /// without touching the clock: the countdown armed by
    /// [`Self::start_round`] is the only one a round ever has.
    pub fn choose_word(
        &mut self,
        lobby_id: &LobbyId,
        player: PlayerId,
        word: &str,
    ) -> Result<usize, LobbyError> {
        let lobby = self
            .lobbies
            .get_mut(lobby_id)
            .ok_or_else(|| LobbyError::NotFound(lobby_id.clone()))?;

        if lobby.current_drawer != Some(player) {
            return Err(LobbyError::NotDrawer(player, lobby_id.clone()));
        }
        if !lobby.phase.accepts_word() {
            return Err(LobbyError::InvalidPhase(lobby_id.clone(), lobby.phase));
        }
        if word.is_empty() {
            return Err(LobbyError::EmptyWord);
        }

        lobby.secret_word = word.to_owned();
        lobby.enter(LobbyPhase::RoundActive);
        let word_length = word.chars().count();
        tracing::info!(%lobby_id, %player, word_length, round = lobby.round, "word chosen");

        self.outbox.push(Outbound {
            lobby_id: lobby_id.clone(),
            recipient: Recipient::All,
            event: ServerEvent::WordChosen { word_length },
        });
        Ok(word_length)
    }

    /// Relays a chat line and checks it against the secret word.
    ///
    /// The sender shown to the lobby is the name `player` joined with, or
    /// `claimed_sender` if the connection is not listed in this lobby. A
    /// match only counts while the round is active; the first one ends the
    /// round and schedules the next turn.
    pub fn submit_guess(
        &mut self,
        lobby_id: &LobbyId,
        player: PlayerId,
        text: &str,
        claimed_sender: &str,
    ) -> GuessOutcome {
        let Some(lobby) = self.lobbies.get_mut(lobby_id) else {
            tracing::debug!(%lobby_id, %player, "message for unknown lobby dropped");
            return GuessOutcome::NoOp;
        };

        let sender = lobby
            .username_of(player)
            .unwrap_or(claimed_sender)
            .to_owned();
        self.outbox.push(Outbound {
            lobby_id: lobby_id.clone(),
            recipient: Recipient::All,
            event: ServerEvent::ReceiveMessage {
                text: text.to_owned(),
                sender: sender.clone(),
            },
        });

        if lobby.phase != LobbyPhase::RoundActive || !guess::matches(&lobby.secret_word, text) {
            return GuessOutcome::BroadcastOnly;
        }

        tracing::info!(%lobby_id, %player, winner = %sender, round = lobby.round, "word guessed");
        self.outbox.push(Outbound {
            lobby_id: lobby_id.clone(),
            recipient: Recipient::All,
            event: ServerEvent::WinnerAnnounced {
                winner: sender,
                word: lobby.secret_word.clone(),
            },
        });

        lobby.timer.cancel();
        lobby.enter(LobbyPhase::RoundEnding);
        lobby.pending_rotation =
            arm_rotation(&self.timer_tx, self.config.winner_delay, lobby_id, lobby.round);
        GuessOutcome::Winner
    }

    /// Starts a fresh round with the current drawer.
    ///
    /// Falls back to the first player when no drawer is set. Does nothing
    /// for an unknown or empty lobby.
    pub fn start_round(&mut self, lobby_id: &LobbyId) {
        let Some(lobby) = self.lobbies.get_mut(lobby_id) else {
            return;
        };
        if lobby.players.is_empty() {
            tracing::debug!(%lobby_id, "no players, round not started");
            return;
        }
        if lobby.current_drawer.is_none() {
            lobby.current_drawer = lobby.players.first().map(|p| p.id);
        }
        let Some(drawer) = lobby.current_drawer else {
            return;
        };

        lobby.stop_clocks();
        lobby.round += 1;
        lobby.round_time_remaining = self.config.round_secs;
        lobby.secret_word.clear();
        lobby.enter(LobbyPhase::AwaitingWord);
        tracing::info!(%lobby_id, %drawer, round = lobby.round, "round started");

        self.outbox.push(Outbound {
            lobby_id: lobby_id.clone(),
            recipient: Recipient::All,
            event: ServerEvent::StartRound { drawer },
        });
        lobby.timer = arm_round_timer(
            &self.timer_tx,
            self.config.timer_config(),
            lobby_id,
            lobby.round,
        );
    }

    /// Hands the drawing to the next player and starts their round.
    ///
    /// With nobody left the lobby goes idle: no drawer, no word, no clock.
    /// The next player to join starts it again.
    pub fn next_turn(&mut self, lobby_id: &LobbyId) {
        let Some(lobby) = self.lobbies.get_mut(lobby_id) else {
            return;
        };

        if lobby.players.is_empty() {
            lobby.stop_clocks();
            lobby.current_drawer = None;
            lobby.secret_word.clear();
            lobby.round_time_remaining = self.config.round_secs;
            lobby.enter(LobbyPhase::Idle);
            tracing::info!(%lobby_id, "lobby empty, going idle");
            return;
        }

        lobby.current_drawer = rotation::next_drawer(&lobby.players, lobby.current_drawer);
        self.start_round(lobby_id);
    }

    /// Applies a report from one of the registry's timers.
    ///
    /// Reports armed for an earlier round, or that no longer fit the
    /// lobby's phase, are dropped.
    pub fn handle_timer(&mut self, event: TimerEvent) {
        let Some(lobby) = self.lobbies.get_mut(&event.lobby_id) else {
            return;
        };
        if event.round != lobby.round {
            tracing::trace!(
                lobby_id = %event.lobby_id,
                event_round = event.round,
                round = lobby.round,
                "stale timer event ignored"
            );
            return;
        }

        match event.kind {
            TimerKind::Tick(remaining) => {
                if !lobby.phase.is_round_live() {
                    return;
                }
                lobby.round_time_remaining = remaining;
                self.outbox.push(Outbound {
                    lobby_id: event.lobby_id,
                    recipient: Recipient::All,
                    event: ServerEvent::UpdateTimer(remaining),
                });
            }
            TimerKind::Expired => {
                if !lobby.phase.is_round_live() {
                    return;
                }
                lobby.timer = RoundTimer::idle();
                tracing::info!(lobby_id = %event.lobby_id, round = lobby.round, "round timed out");
                self.next_turn(&event.lobby_id);
            }
            TimerKind::RotationDue => {
                if lobby.phase != LobbyPhase::RoundEnding {
                    return;
                }
                lobby.pending_rotation = Delay::default();
                self.next_turn(&event.lobby_id);
            }
        }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// The current drawer of a lobby, if any.
    pub fn current_drawer(&self, lobby_id: &LobbyId) -> Option<PlayerId> {
        self.lobbies.get(lobby_id)?.current_drawer
    }

    /// Returns `true` if `player` is drawing in `lobby_id`.
    pub fn is_drawer(&self, lobby_id: &LobbyId, player: PlayerId) -> bool {
        self.current_drawer(lobby_id) == Some(player)
    }

    pub fn snapshot(&self, lobby_id: &LobbyId) -> Option<LobbySnapshot> {
        self.lobbies.get(lobby_id).map(Lobby::snapshot)
    }

    /// Lobbies `player` is listed in, in lobby id order.
    pub fn lobbies_of(&self, player: PlayerId) -> Vec<LobbyId> {
        self.memberships
            .get(&player)
            .map(|ids| ids.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn lobby_count(&self) -> usize {
        self.lobbies.len()
    }
}

// ---------------------------------------------------------------------------
// Timer wiring
// ---------------------------------------------------------------------------

fn arm_round_timer(
    tx: &mpsc::UnboundedSender<TimerEvent>,
    config: TimerConfig,
    lobby_id: &LobbyId,
    round: u64,
) -> RoundTimer {
    let tick_tx = tx.clone();
    let tick_lobby = lobby_id.clone();
    let expire_tx = tx.clone();
    let expire_lobby = lobby_id.clone();
    RoundTimer::start(
        config,
        move |remaining| {
            let _ = tick_tx.send(TimerEvent {
                lobby_id: tick_lobby.clone(),
                round,
                kind: TimerKind::Tick(remaining),
            });
        },
        move || {
            let _ = expire_tx.send(TimerEvent {
                lobby_id: expire_lobby,
                round,
                kind: TimerKind::Expired,
            });
        },
    )
}

fn arm_rotation(
    tx: &mpsc::UnboundedSender<TimerEvent>,
    after: std::time::Duration,
    lobby_id: &LobbyId,
    round: u64,
) -> Delay {
    let tx = tx.clone();
    let lobby_id = lobby_id.clone();
    Delay::start(after, move || {
        let _ = tx.send(TimerEvent {
            lobby_id,
            round,
            kind: TimerKind::RotationDue,
        });
    })
}
