//! Event and identity types for Doodle's wire format.
//!
//! Events are adjacently tagged: the event name lives in `"event"` and the
//! payload in `"data"`. Event names are kebab-case and payload fields are
//! camelCase, which is what the browser client sends and expects.

use std::fmt;

use doodle_transport::ConnectionId;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// Identifies a player. One player per connection, so this is the
/// connection's id lifted into the protocol.
///
/// Serializes as a plain number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

impl From<ConnectionId> for PlayerId {
    fn from(id: ConnectionId) -> Self {
        Self(id.into_inner())
    }
}

/// Identifies a lobby. Chosen by clients, so any string is valid.
///
/// The lobby id doubles as the name of the broadcast channel its players
/// are subscribed to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LobbyId(pub String);

impl LobbyId {
    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LobbyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LobbyId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for LobbyId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A player as listed in `update-players`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// The connection this player is bound to.
    pub id: PlayerId,
    /// Display name chosen at join time.
    pub username: String,
}

impl Player {
    /// Creates a player entry.
    pub fn new(id: PlayerId, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
        }
    }
}

/// A point on the drawing canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

// ---------------------------------------------------------------------------
// Recipient
// ---------------------------------------------------------------------------

/// Who inside a lobby's channel should receive an outbound event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recipient {
    /// Every connection subscribed to the lobby's channel.
    All,
    /// Everyone in the channel except this connection.
    AllExcept(PlayerId),
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Events sent by a client.
///
/// Disconnects are not events: the server observes the connection closing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "event",
    content = "data",
    rename_all = "kebab-case",
    rename_all_fields = "camelCase"
)]
pub enum ClientEvent {
    /// Join (and lazily create) a lobby under a display name.
    JoinLobby { lobby_id: LobbyId, username: String },

    /// The drawer picks the secret word for the current round.
    ChooseWord { lobby_id: LobbyId, word: String },

    /// The drawer starts a new stroke.
    StartDrawing { lobby_id: LobbyId, x: f64, y: f64 },

    /// The drawer extends the current stroke.
    Drawing { lobby_id: LobbyId, x: f64, y: f64 },

    /// A chat line, which is also a guess.
    ///
    /// `sender` is the display name the client claims. The server prefers
    /// the name the connection joined with.
    SendMessage {
        text: String,
        #[serde(default)]
        sender: String,
        lobby_id: LobbyId,
    },
}

impl ClientEvent {
    /// The lobby this event is addressed to.
    pub fn lobby_id(&self) -> &LobbyId {
        match self {
            Self::JoinLobby { lobby_id, .. }
            | Self::ChooseWord { lobby_id, .. }
            | Self::StartDrawing { lobby_id, .. }
            | Self::Drawing { lobby_id, .. }
            | Self::SendMessage { lobby_id, .. } => lobby_id,
        }
    }
}

/// Events sent by the server to a lobby's channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "event",
    content = "data",
    rename_all = "kebab-case",
    rename_all_fields = "camelCase"
)]
pub enum ServerEvent {
    /// The lobby's full player list, in rotation order.
    UpdatePlayers(Vec<Player>),

    /// A new round began with this drawer.
    StartRound { drawer: PlayerId },

    /// Seconds left in the current round.
    UpdateTimer(u32),

    /// The drawer chose a word. Only its length is revealed.
    WordChosen { word_length: usize },

    /// A chat line relayed to the lobby.
    ReceiveMessage { text: String, sender: String },

    /// Someone guessed the word.
    WinnerAnnounced { winner: String, word: String },

    /// Relayed stroke start from the drawer.
    StartDrawing(Point),

    /// Relayed stroke segment from the drawer.
    Drawing(Point),
}
