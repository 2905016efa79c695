//! Per-connection handler: decode inbound frames, encode outbound events.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Register with the coordinator and get an outbound event queue
//!   2. Spawn a writer task that drains that queue onto the socket
//!   3. Loop: receive frames → decode → forward to the coordinator
//!   4. On close, the drop guard tells the coordinator the player is gone

use std::sync::Arc;

use doodle_protocol::{ClientEvent, Codec, PlayerId, ServerEvent};
use doodle_transport::{Connection, WebSocketConnection};
use tokio::sync::mpsc;

use crate::DoodleError;
use crate::coordinator::CoordinatorHandle;
use crate::server::ServerState;

/// Drop guard that reports the disconnect when the handler exits.
///
/// Runs on every exit path, including early returns and panics.
struct DisconnectGuard {
    player: PlayerId,
    coordinator: CoordinatorHandle,
}

impl Drop for DisconnectGuard {
    fn drop(&mut self) {
        let _ = self.coordinator.disconnect(self.player);
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<C: Codec>(
    conn: WebSocketConnection,
    state: Arc<ServerState<C>>,
) -> Result<(), DoodleError> {
    let conn = Arc::new(conn);
    let player = PlayerId::from(conn.id());
    tracing::debug!(%player, "handling new connection");

    let events = state.coordinator.connect(player)?;
    let _guard = DisconnectGuard {
        player,
        coordinator: state.coordinator.clone(),
    };
    let writer = tokio::spawn(write_events(Arc::clone(&conn), events, Arc::clone(&state)));

    loop {
        let frame = match conn.recv().await {
            Ok(Some(frame)) => frame,
            Ok(None) => {
                tracing::info!(%player, "connection closed cleanly");
                break;
            }
            Err(e) => {
                tracing::debug!(%player, error = %e, "recv error");
                break;
            }
        };

        let event: ClientEvent = match state.codec.decode(&frame) {
            Ok(event) => event,
            Err(e) => {
                tracing::debug!(%player, error = %e, "malformed frame dropped");
                continue;
            }
        };
        state.coordinator.dispatch(player, event)?;
    }

    writer.abort();
    Ok(())
}

/// Drains the connection's outbound queue onto the socket.
///
/// Ends when the coordinator drops the queue or the socket stops taking
/// writes.
async fn write_events<C: Codec>(
    conn: Arc<WebSocketConnection>,
    mut events: mpsc::UnboundedReceiver<ServerEvent>,
    state: Arc<ServerState<C>>,
) {
    let player = PlayerId::from(conn.id());
    while let Some(event) = events.recv().await {
        let frame = match state.codec.encode(&event) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::warn!(%player, error = %e, "failed to encode event");
                continue;
            }
        };
        if let Err(e) = conn.send(&frame).await {
            tracing::debug!(%player, error = %e, "send failed, writer stopping");
            break;
        }
    }
}
