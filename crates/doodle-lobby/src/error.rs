//! Error types for the lobby layer.

use doodle_protocol::{LobbyId, PlayerId};

use crate::LobbyPhase;

/// Why a lobby operation was rejected.
///
/// None of these reach clients. The coordinator logs them and drops the
/// event.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum LobbyError {
    /// The lobby does not exist.
    #[error("lobby {0} not found")]
    NotFound(LobbyId),

    /// The player is not the current drawer of the lobby.
    #[error("player {0} is not the drawer in lobby {1}")]
    NotDrawer(PlayerId, LobbyId),

    /// The lobby is not in a phase where this is allowed.
    #[error("lobby {0} does not accept this in phase {1}")]
    InvalidPhase(LobbyId, LobbyPhase),

    /// The chosen word was empty.
    #[error("chosen word is empty")]
    EmptyWord,
}
