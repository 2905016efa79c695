//! Wire protocol for Doodle.
//!
//! - **Types** ([`ClientEvent`], [`ServerEvent`], [`LobbyId`], [`PlayerId`],
//!   [`Player`], [`Recipient`]): what travels between browser and server.
//! - **Codec** ([`Codec`], [`JsonCodec`]): how events become text frames.
//! - **Errors** ([`ProtocolError`]).
//!
//! Every frame is one event in the form `{"event": "<name>", "data": ...}`.
//!
//! ```text
//! Transport (text frames) → Protocol (events) → Coordinator (lobbies)
//! ```

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{ClientEvent, LobbyId, Player, PlayerId, Point, Recipient, ServerEvent};
