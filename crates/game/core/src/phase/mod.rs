//! Phase state machine.
//!
//! ```text
//! lobby ─start─▶ night(1) ─▶ day(1) ─▶ night(2) ─▶ … ─▶ finished(winner)
//!                   │           │                          │
//!                   └──▶ hunter_revenge(source, r) ◀──┘     └─play_again─▶ lobby
//! ```
//!
//! Transitions are driven by [`controller`] only, after a resolver completes.

pub mod controller;

use std::fmt;

use crate::state::PlayerId;

pub use controller::{check_winner, play_again};

/// The phase of the single global game, with its round.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Phase {
    #[default]
    Lobby,
    Night {
        round: u32,
    },
    Day {
        round: u32,
    },
    /// A just-eliminated hunter owes one shot before play continues.
    HunterRevenge {
        source: RevengeSource,
        round: u32,
        hunter: PlayerId,
    },
    Finished {
        winner: Winner,
        round: u32,
    },
}

impl Phase {
    pub fn kind(&self) -> PhaseKind {
        match self {
            Phase::Lobby => PhaseKind::Lobby,
            Phase::Night { .. } => PhaseKind::Night,
            Phase::Day { .. } => PhaseKind::Day,
            Phase::HunterRevenge { .. } => PhaseKind::HunterRevenge,
            Phase::Finished { .. } => PhaseKind::Finished,
        }
    }

    /// Round number; 0 while in the lobby.
    pub fn round(&self) -> u32 {
        match *self {
            Phase::Lobby => 0,
            Phase::Night { round }
            | Phase::Day { round }
            | Phase::HunterRevenge { round, .. }
            | Phase::Finished { round, .. } => round,
        }
    }

    pub fn winner(&self) -> Option<Winner> {
        match *self {
            Phase::Finished { winner, .. } => Some(winner),
            _ => None,
        }
    }

    /// Returns true while a game is being played (not lobby, not finished).
    pub fn in_game(&self) -> bool {
        matches!(
            self,
            Phase::Night { .. } | Phase::Day { .. } | Phase::HunterRevenge { .. }
        )
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Lobby => write!(f, "lobby"),
            Phase::Night { round } => write!(f, "night({round})"),
            Phase::Day { round } => write!(f, "day({round})"),
            Phase::HunterRevenge {
                source,
                round,
                hunter,
            } => write!(f, "hunter_revenge({source}, {round}, {hunter})"),
            Phase::Finished { winner, .. } => write!(f, "finished({winner})"),
        }
    }
}

/// Discriminant of [`Phase`] without its data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case")]
pub enum PhaseKind {
    Lobby,
    Night,
    Day,
    HunterRevenge,
    Finished,
}

/// Where a hunter's revenge interrupt was entered from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case")]
pub enum RevengeSource {
    Night,
    Day,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case")]
pub enum Winner {
    Villagers,
    Werewolves,
}
