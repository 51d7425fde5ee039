//! Event types for different topics.

use serde::{Deserialize, Serialize};

use game_core::{PhaseKind, PlayerId};

use crate::sessions::ConnectionId;

/// Events related to game state changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A command was applied and persisted.
    CommandApplied {
        revision: u64,
        player: Option<PlayerId>,
        action: String,
    },

    /// A command was rejected; state is unchanged.
    CommandRejected {
        player: Option<PlayerId>,
        action: String,
        code: String,
    },

    /// The phase moved, possibly through several resolutions in one command.
    PhaseChanged {
        revision: u64,
        from: PhaseKind,
        to: PhaseKind,
        round: u32,
    },

    /// A mutation was rolled back because the store refused it.
    StoreFailed { revision: u64, error: String },
}

/// Events related to connections and identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionEvent {
    Connected {
        connection: ConnectionId,
    },
    Bound {
        connection: ConnectionId,
        player: PlayerId,
    },
    Superseded {
        connection: ConnectionId,
        player: PlayerId,
    },
    Disconnected {
        connection: ConnectionId,
        player: Option<PlayerId>,
    },
}
