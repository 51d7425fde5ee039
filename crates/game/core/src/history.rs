//! Game history log and public announcements.
//!
//! Every entry carries a [`Disclosure`] policy; a recipient's history is the
//! subsequence of entries whose policy admits them.

use crate::phase::{PhaseKind, Winner};
use crate::roles::{Faction, RoleCatalog, RoleId};
use crate::state::{GameState, PlayerId};

/// Who may see a history entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Disclosure {
    Public,
    /// Only the acting player.
    Actor(PlayerId),
    /// Players holding a werewolf-faction role.
    Werewolves,
}

impl Disclosure {
    /// Returns true if `recipient` may see an entry with this policy.
    pub fn admits(
        &self,
        recipient: Option<PlayerId>,
        state: &GameState,
        catalog: &RoleCatalog,
    ) -> bool {
        match *self {
            Disclosure::Public => true,
            Disclosure::Actor(actor) => recipient == Some(actor),
            Disclosure::Werewolves => recipient
                .and_then(|id| state.seat(id))
                .is_some_and(|seat| catalog.faction_of(seat.role).is_werewolf()),
        }
    }
}

/// Why a day vote ended without an elimination.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case")]
pub enum NoEliminationReason {
    /// Two or more targets shared the highest count.
    Tie,
    /// Passes outnumbered every single target and formed a majority.
    Passes,
    /// A single leader existed but fell short of the majority.
    NoMajority,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum HistoryKind {
    GameStarted { players: usize },
    RoleAssigned { role: RoleId },
    /// `target` of the entry is `None` for a "no kill" vote.
    WolfVote,
    Investigated { faction: Faction },
    Protected,
    NightDeath,
    QuietNight,
    DayVote,
    DayPass,
    DayElimination { votes: usize },
    NoElimination { reason: NoEliminationReason },
    HunterShot,
    GameOver { winner: Winner },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HistoryEntry {
    pub seq: u64,
    pub round: u32,
    pub phase: PhaseKind,
    pub actor: Option<PlayerId>,
    pub kind: HistoryKind,
    pub target: Option<PlayerId>,
    pub disclosure: Disclosure,
}

/// Append-only log of the current (or most recently finished) game.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HistoryLog {
    entries: Vec<HistoryEntry>,
    next_seq: u64,
}

impl HistoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a log from stored entries; sequence numbers continue after the last one.
    pub fn from_entries(mut entries: Vec<HistoryEntry>) -> Self {
        entries.sort_by_key(|entry| entry.seq);
        let next_seq = entries.last().map(|entry| entry.seq + 1).unwrap_or(0);
        Self { entries, next_seq }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn record(
        &mut self,
        round: u32,
        phase: PhaseKind,
        actor: Option<PlayerId>,
        kind: HistoryKind,
        target: Option<PlayerId>,
        disclosure: Disclosure,
    ) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.push(HistoryEntry {
            seq,
            round,
            phase,
            actor,
            kind,
            target,
            disclosure,
        });
        seq
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Entries visible to `recipient`, in log order.
    pub fn visible_to<'a>(
        &'a self,
        recipient: Option<PlayerId>,
        state: &'a GameState,
        catalog: &'a RoleCatalog,
    ) -> impl Iterator<Item = &'a HistoryEntry> + 'a {
        self.entries
            .iter()
            .filter(move |entry| entry.disclosure.admits(recipient, state, catalog))
    }
}

/// Public result shown at the top of every view until the next resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Announcement {
    NightDeath { victim: PlayerId },
    QuietNight,
    DayElimination { victim: PlayerId, votes: usize },
    NoElimination { reason: NoEliminationReason },
    HunterShot { hunter: PlayerId, target: PlayerId },
    Victory { winner: Winner },
}

impl Announcement {
    /// Human-readable text, resolving player ids through `name_of`.
    pub fn message(&self, name_of: impl Fn(PlayerId) -> String) -> String {
        match *self {
            Announcement::NightDeath { victim } => format!("{} died last night", name_of(victim)),
            Announcement::QuietNight => "No one died last night".to_string(),
            Announcement::DayElimination { victim, votes } => {
                format!("{} was eliminated with {votes} votes", name_of(victim))
            }
            Announcement::NoElimination { reason } => match reason {
                NoEliminationReason::Tie => "The vote was tied; no one was eliminated".to_string(),
                NoEliminationReason::Passes => {
                    "The village chose to pass; no one was eliminated".to_string()
                }
                NoEliminationReason::NoMajority => {
                    "No majority was reached; no one was eliminated".to_string()
                }
            },
            Announcement::HunterShot { hunter, target } => {
                format!("{} took {} down with them", name_of(hunter), name_of(target))
            }
            Announcement::Victory { winner } => match winner {
                Winner::Villagers => "The villagers win".to_string(),
                Winner::Werewolves => "The werewolves win".to_string(),
            },
        }
    }
}
