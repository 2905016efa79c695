//! Unified error type for the Doodle server.

use doodle_lobby::LobbyError;
use doodle_protocol::ProtocolError;
use doodle_transport::TransportError;

/// Top-level error that wraps every crate-specific error.
///
/// The `#[from]` attribute on each variant lets `?` convert sub-crate
/// errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum DoodleError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A lobby operation was rejected.
    #[error(transparent)]
    Lobby(#[from] LobbyError),

    /// The coordinator task has stopped.
    #[error("session coordinator is not running")]
    CoordinatorUnavailable,
}
