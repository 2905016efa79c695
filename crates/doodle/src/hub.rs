//! Channel hub: fan-out of server events to connections.
//!
//! Every connection registers an outbound sender. Joining a lobby subscribes
//! the connection to the channel named after the lobby; publishing to a
//! channel delivers to its subscribers according to a [`Recipient`].

use std::collections::{BTreeSet, HashMap};

use doodle_protocol::{LobbyId, PlayerId, Recipient, ServerEvent};
use tokio::sync::mpsc;

/// Outbound queue of one connection. The connection's writer task drains it.
pub type EventSender = mpsc::UnboundedSender<ServerEvent>;

#[derive(Debug, Default)]
pub(crate) struct ChannelHub {
    connections: HashMap<PlayerId, EventSender>,
    channels: HashMap<LobbyId, BTreeSet<PlayerId>>,
}

impl ChannelHub {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn register(&mut self, player: PlayerId, sender: EventSender) {
        self.connections.insert(player, sender);
    }

    /// Forgets the connection and drops it from every channel.
    pub(crate) fn unregister(&mut self, player: PlayerId) {
        self.connections.remove(&player);
        self.channels.retain(|_, members| {
            members.remove(&player);
            !members.is_empty()
        });
    }

    /// Subscribes a registered connection to a lobby's channel.
    ///
    /// Returns `false` if the connection is unknown.
    pub(crate) fn join_channel(&mut self, lobby_id: &LobbyId, player: PlayerId) -> bool {
        if !self.connections.contains_key(&player) {
            return false;
        }
        self.channels
            .entry(lobby_id.clone())
            .or_default()
            .insert(player);
        true
    }

    /// Delivers `event` inside the lobby's channel and returns how many
    /// connections it was queued for.
    ///
    /// Connections whose writer has gone away are skipped; their disconnect
    /// cleans them up.
    pub(crate) fn publish(
        &self,
        lobby_id: &LobbyId,
        recipient: Recipient,
        event: &ServerEvent,
    ) -> usize {
        let Some(members) = self.channels.get(lobby_id) else {
            return 0;
        };

        let mut delivered = 0;
        for player in members {
            let wanted = match recipient {
                Recipient::All => true,
                Recipient::AllExcept(excluded) => *player != excluded,
            };
            if !wanted {
                continue;
            }
            if let Some(sender) = self.connections.get(player) {
                if sender.send(event.clone()).is_ok() {
                    delivered += 1;
                }
            }
        }
        delivered
    }

    #[cfg(test)]
    fn members(&self, lobby_id: &LobbyId) -> Vec<PlayerId> {
        self.channels
            .get(lobby_id)
            .map(|m| m.iter().copied().collect())
            .unwrap_or_default()
    }
}
