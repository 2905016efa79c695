//! Lobby state for Doodle: who is in which lobby, who draws, what the word
//! is, and how long the round has left.
//!
//! # Key types
//!
//! - [`LobbyRegistry`]: owns every lobby; all mutations go through it
//! - [`LobbyPhase`]: per-lobby round state machine
//! - [`LobbyConfig`]: round length, tick period, post-win pause
//! - [`TimerEvent`]: what the registry's timers report back
//! - [`Outbound`]: an event the registry wants published to a lobby
//!
//! The registry never performs I/O. Operations queue [`Outbound`] events
//! that the owner drains with [`LobbyRegistry::take_outbound`], and timers
//! report through a channel whose receiver is handed out at construction.
//! The owner is expected to feed those [`TimerEvent`]s back through
//! [`LobbyRegistry::handle_timer`] from the same task that handles client
//! events.

mod config;
mod error;
pub mod guess;
mod lobby;
mod registry;
pub mod rotation;

pub use config::{LobbyConfig, LobbyPhase};
pub use error::LobbyError;
pub use lobby::LobbySnapshot;
pub use registry::{GuessOutcome, LobbyRegistry, Outbound, TimerEvent, TimerKind};
