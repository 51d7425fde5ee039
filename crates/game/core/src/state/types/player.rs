use crate::roles::{Faction, RoleId};

use super::{PlayerId, SecretToken};

/// Identity of one human participant.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlayerRecord {
    pub id: PlayerId,
    pub name: String,
    pub token: SecretToken,
    pub connected: bool,
}

impl PlayerRecord {
    pub fn new(id: PlayerId, name: impl Into<String>, token: SecretToken) -> Self {
        Self {
            id,
            name: name.into(),
            token,
            connected: true,
        }
    }
}

/// A seer's private result for one night.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Investigation {
    pub round: u32,
    pub target: PlayerId,
    pub faction: Faction,
}

impl Investigation {
    pub fn is_werewolf(&self) -> bool {
        self.faction.is_werewolf()
    }
}

/// Per-player in-game state: assigned role, life, and role-private scratch.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Seat {
    pub role: RoleId,
    pub alive: bool,
    /// Seer only: every investigation this game, oldest first.
    pub investigations: Vec<Investigation>,
    /// Guard only: who was protected on the previous night.
    pub previous_target: Option<PlayerId>,
    /// Hunter only: set while the revenge shot is owed.
    pub pending_revenge: bool,
}

impl Seat {
    pub fn new(role: RoleId) -> Self {
        Self {
            role,
            alive: true,
            investigations: Vec::new(),
            previous_target: None,
            pending_revenge: false,
        }
    }
}
