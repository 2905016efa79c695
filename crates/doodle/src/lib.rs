//! # Doodle
//!
//! Server for a real-time multiplayer drawing-and-guessing game.
//!
//! Players join named lobbies over WebSocket. In each round one player draws
//! and picks a secret word; the strokes are relayed live to the others, who
//! guess in chat. A correct guess or a two-minute timeout hands the drawing
//! to the next player.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use doodle::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), DoodleError> {
//!     doodle::init_tracing();
//!     let server = DoodleServer::builder().bind("0.0.0.0:5000").build().await?;
//!     server.run().await
//! }
//! ```

mod coordinator;
mod error;
mod handler;
mod hub;
mod server;

pub use coordinator::{CoordinatorCommand, CoordinatorHandle, SessionCoordinator};
pub use error::DoodleError;
pub use hub::EventSender;
pub use server::{DEFAULT_BIND_ADDR, DoodleServer, DoodleServerBuilder};

use tracing_subscriber::EnvFilter;

/// Installs a `tracing` subscriber that honours `RUST_LOG`.
///
/// Falls back to `info` when `RUST_LOG` is unset or invalid. Does nothing
/// if a global subscriber is already installed.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

pub mod prelude {
    //! Everything needed to run a server or drive a coordinator.

    pub use crate::{
        CoordinatorHandle, DoodleError, DoodleServer, DoodleServerBuilder, SessionCoordinator,
    };
    pub use doodle_lobby::{LobbyConfig, LobbyPhase, LobbySnapshot};
    pub use doodle_protocol::{ClientEvent, LobbyId, Player, PlayerId, Point, ServerEvent};
}
