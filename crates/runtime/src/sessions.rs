//! Connection registry: which live connection speaks for which player.
//!
//! A connection starts anonymous and is bound to a player by a successful
//! signup or login. A player has at most one bound connection; binding a new
//! one supersedes the old, which drops back to anonymous.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use game_core::{PlayerId, Recipient};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(pub u64);

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Binding {
    Anonymous,
    Player(PlayerId),
}

impl Binding {
    pub fn player(self) -> Option<PlayerId> {
        match self {
            Binding::Anonymous => None,
            Binding::Player(player) => Some(player),
        }
    }

    pub fn recipient(self) -> Recipient {
        match self {
            Binding::Anonymous => Recipient::Anonymous,
            Binding::Player(player) => Recipient::Player(player),
        }
    }
}

/// What changed when a connection was bound.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Rebinding {
    /// The player's previous connection, now anonymous.
    pub superseded: Option<ConnectionId>,
    /// A different player this connection spoke for until now.
    pub released: Option<PlayerId>,
}

#[derive(Debug, Default)]
pub struct SessionRegistry {
    next_id: u64,
    connections: BTreeMap<ConnectionId, Binding>,
    players: BTreeMap<PlayerId, ConnectionId>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new anonymous connection.
    pub fn open(&mut self) -> ConnectionId {
        let id = ConnectionId(self.next_id);
        self.next_id += 1;
        self.connections.insert(id, Binding::Anonymous);
        id
    }

    pub fn lookup(&self, connection: ConnectionId) -> Option<Binding> {
        self.connections.get(&connection).copied()
    }

    pub fn connection_of(&self, player: PlayerId) -> Option<ConnectionId> {
        self.players.get(&player).copied()
    }

    /// Binds `connection` to `player`.
    pub fn bind(&mut self, connection: ConnectionId, player: PlayerId) -> Rebinding {
        let mut outcome = Rebinding::default();

        if let Some(Binding::Player(previous)) = self.connections.get(&connection).copied()
            && previous != player
        {
            self.players.remove(&previous);
            outcome.released = Some(previous);
        }

        if let Some(old) = self.players.insert(player, connection)
            && old != connection
        {
            self.connections.insert(old, Binding::Anonymous);
            outcome.superseded = Some(old);
        }

        self.connections.insert(connection, Binding::Player(player));
        outcome
    }

    /// Forgets a connection. Returns its binding if it was registered.
    pub fn close(&mut self, connection: ConnectionId) -> Option<Binding> {
        let binding = self.connections.remove(&connection)?;
        if let Binding::Player(player) = binding
            && self.players.get(&player) == Some(&connection)
        {
            self.players.remove(&player);
        }
        Some(binding)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ConnectionId, Binding)> + '_ {
        self.connections
            .iter()
            .map(|(connection, binding)| (*connection, *binding))
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}
