//! `DoodleServer` builder and accept loop.
//!
//! This is the entry point for running a Doodle server. It ties together
//! the layers: transport → protocol → coordinator → lobbies.

use std::net::SocketAddr;
use std::sync::Arc;

use doodle_lobby::LobbyConfig;
use doodle_protocol::{Codec, JsonCodec};
use doodle_transport::{Transport, WebSocketTransport};

use crate::DoodleError;
use crate::coordinator::{CoordinatorHandle, SessionCoordinator};
use crate::handler::handle_connection;

/// Address used when [`DoodleServerBuilder::bind`] is not called.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5000";

/// Shared state passed to each connection handler task.
pub(crate) struct ServerState<C: Codec> {
    pub(crate) coordinator: CoordinatorHandle,
    pub(crate) codec: C,
}

/// Builder for configuring and starting a Doodle server.
///
/// # Example
///
/// ```rust,no_run
/// use doodle::prelude::*;
///
/// # async fn start() -> Result<(), DoodleError> {
/// let server = DoodleServerBuilder::new()
///     .bind("0.0.0.0:5000")
///     .lobby_config(LobbyConfig::default())
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct DoodleServerBuilder {
    bind_addr: String,
    lobby_config: LobbyConfig,
}

impl DoodleServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            lobby_config: LobbyConfig::default(),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the round configuration shared by every lobby.
    pub fn lobby_config(mut self, config: LobbyConfig) -> Self {
        self.lobby_config = config;
        self
    }

    /// Binds the listener and starts the coordinator.
    ///
    /// Uses `JsonCodec` and `WebSocketTransport`, which is what browsers
    /// speak.
    pub async fn build(self) -> Result<DoodleServer<JsonCodec>, DoodleError> {
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;
        let coordinator = SessionCoordinator::spawn(self.lobby_config);

        let state = Arc::new(ServerState {
            coordinator,
            codec: JsonCodec,
        });
        Ok(DoodleServer { transport, state })
    }
}

impl Default for DoodleServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Doodle server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct DoodleServer<C: Codec = JsonCodec> {
    transport: WebSocketTransport,
    state: Arc<ServerState<C>>,
}

impl DoodleServer<JsonCodec> {
    /// Creates a new builder.
    pub fn builder() -> DoodleServerBuilder {
        DoodleServerBuilder::new()
    }
}

impl<C: Codec> DoodleServer<C> {
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, DoodleError> {
        Ok(self.transport.local_addr()?)
    }

    /// A handle to the coordinator, for inspecting lobbies.
    pub fn coordinator(&self) -> CoordinatorHandle {
        self.state.coordinator.clone()
    }

    /// Runs the accept loop.
    ///
    /// Spawns a handler task for each connection. Runs until the process is
    /// terminated; a failed accept is logged and the loop continues.
    pub async fn run(mut self) -> Result<(), DoodleError> {
        tracing::info!(addr = ?self.transport.local_addr().ok(), "Doodle server running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(error = %e, "connection ended with error");
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
