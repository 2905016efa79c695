//! Session coordinator: the single task that owns all lobby state.
//!
//! Connection handlers talk to it through a [`CoordinatorHandle`]. Lobby
//! timers report back through the registry's timer channel. Both feed one
//! `select!` loop, so every mutation runs to completion before the next one
//! starts and no lobby state is ever locked.

use doodle_lobby::{LobbyConfig, LobbyRegistry, LobbySnapshot, TimerEvent};
use doodle_protocol::{ClientEvent, LobbyId, PlayerId, Point, Recipient, ServerEvent};
use tokio::sync::{mpsc, oneshot};

use crate::DoodleError;
use crate::hub::{ChannelHub, EventSender};

/// Commands accepted by the coordinator.
#[derive(Debug)]
pub enum CoordinatorCommand {
    /// A connection opened. Events for it go to `outbound`.
    Connect {
        player: PlayerId,
        outbound: EventSender,
    },

    /// A decoded event from a connection.
    Event { player: PlayerId, event: ClientEvent },

    /// A connection closed.
    Disconnect { player: PlayerId },

    /// Request a copy of a lobby's state.
    Snapshot {
        lobby_id: LobbyId,
        reply: oneshot::Sender<Option<LobbySnapshot>>,
    },
}

/// Handle to a running coordinator. Cheap to clone.
#[derive(Debug, Clone)]
pub struct CoordinatorHandle {
    sender: mpsc::UnboundedSender<CoordinatorCommand>,
}

impl CoordinatorHandle {
    /// Registers a connection and returns the queue its events arrive on.
    pub fn connect(&self, player: PlayerId) -> Result<mpsc::UnboundedReceiver<ServerEvent>, DoodleError> {
        let (outbound, events) = mpsc::unbounded_channel();
        self.send(CoordinatorCommand::Connect { player, outbound })?;
        Ok(events)
    }

    /// Forwards a client event.
    pub fn dispatch(&self, player: PlayerId, event: ClientEvent) -> Result<(), DoodleError> {
        self.send(CoordinatorCommand::Event { player, event })
    }

    /// Reports a closed connection.
    pub fn disconnect(&self, player: PlayerId) -> Result<(), DoodleError> {
        self.send(CoordinatorCommand::Disconnect { player })
    }

    /// Returns a copy of a lobby's state, or `None` if it does not exist.
    pub async fn snapshot(&self, lobby_id: LobbyId) -> Result<Option<LobbySnapshot>, DoodleError> {
        let (reply, response) = oneshot::channel();
        self.send(CoordinatorCommand::Snapshot { lobby_id, reply })?;
        response
            .await
            .map_err(|_| DoodleError::CoordinatorUnavailable)
    }

    fn send(&self, command: CoordinatorCommand) -> Result<(), DoodleError> {
        self.sender
            .send(command)
            .map_err(|_| DoodleError::CoordinatorUnavailable)
    }
}

/// The coordinator actor. Runs inside its own Tokio task.
pub struct SessionCoordinator {
    registry: LobbyRegistry,
    hub: ChannelHub,
    commands: mpsc::UnboundedReceiver<CoordinatorCommand>,
    timers: mpsc::UnboundedReceiver<TimerEvent>,
}

impl SessionCoordinator {
    /// Spawns a coordinator on the current runtime.
    ///
    /// The task stops once every handle has been dropped, taking all lobby
    /// timers down with it.
    pub fn spawn(config: LobbyConfig) -> CoordinatorHandle {
        let (sender, commands) = mpsc::unbounded_channel();
        let (registry, timers) = LobbyRegistry::new(config);
        let coordinator = Self {
            registry,
            hub: ChannelHub::new(),
            commands,
            timers,
        };
        tokio::spawn(coordinator.run());
        CoordinatorHandle { sender }
    }

    async fn run(mut self) {
        tracing::info!("session coordinator started");

        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(command) => self.handle_command(command),
                    None => break,
                },
                Some(event) = self.timers.recv() => self.registry.handle_timer(event),
            }
            self.flush();
        }

        tracing::info!(lobbies = self.registry.lobby_count(), "session coordinator stopped");
    }

    fn handle_command(&mut self, command: CoordinatorCommand) {
        match command {
            CoordinatorCommand::Connect { player, outbound } => {
                tracing::debug!(%player, "connection registered");
                self.hub.register(player, outbound);
            }
            CoordinatorCommand::Event { player, event } => self.handle_event(player, event),
            CoordinatorCommand::Disconnect { player } => {
                tracing::debug!(%player, "connection gone");
                self.hub.unregister(player);
                self.registry.leave_lobby(player);
            }
            CoordinatorCommand::Snapshot { lobby_id, reply } => {
                let _ = reply.send(self.registry.snapshot(&lobby_id));
            }
        }
    }

    fn handle_event(&mut self, player: PlayerId, event: ClientEvent) {
        tracing::trace!(%player, lobby_id = %event.lobby_id(), "client event");
        match event {
            ClientEvent::JoinLobby { lobby_id, username } => {
                self.hub.join_channel(&lobby_id, player);
                self.registry.join_lobby(&lobby_id, player, &username);
            }
            ClientEvent::ChooseWord { lobby_id, word } => {
                if let Err(e) = self.registry.choose_word(&lobby_id, player, &word) {
                    tracing::debug!(%player, error = %e, "choose-word dropped");
                }
            }
            ClientEvent::StartDrawing { lobby_id, x, y } => {
                self.relay_stroke(&lobby_id, player, ServerEvent::StartDrawing(Point { x, y }));
            }
            ClientEvent::Drawing { lobby_id, x, y } => {
                self.relay_stroke(&lobby_id, player, ServerEvent::Drawing(Point { x, y }));
            }
            ClientEvent::SendMessage {
                text,
                sender,
                lobby_id,
            } => {
                self.registry.submit_guess(&lobby_id, player, &text, &sender);
            }
        }
    }

    /// Strokes go to everyone else in the lobby, and only from the drawer.
    fn relay_stroke(&self, lobby_id: &LobbyId, player: PlayerId, event: ServerEvent) {
        if !self.registry.is_drawer(lobby_id, player) {
            tracing::debug!(%lobby_id, %player, "stroke from non-drawer dropped");
            return;
        }
        self.hub.publish(lobby_id, Recipient::AllExcept(player), &event);
    }

    /// Publishes everything the registry queued.
    fn flush(&mut self) {
        for outbound in self.registry.take_outbound() {
            self.hub
                .publish(&outbound.lobby_id, outbound.recipient, &outbound.event);
        }
    }
}
