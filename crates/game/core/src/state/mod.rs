//! Authoritative game state representation.
//!
//! [`GameState`] is the single record of the global lobby and its running
//! game. Runtime layers clone or query it but mutate it exclusively through
//! [`crate::engine::GameEngine`].
pub mod types;

use std::collections::BTreeMap;

pub use types::{Investigation, PlayerId, PlayerRecord, SecretToken, Seat};

use crate::day::DayBallot;
use crate::history::{Announcement, HistoryLog};
use crate::identity::normalize_name;
use crate::lobby::RoleComposition;
use crate::night::NightActions;
use crate::phase::Phase;
use crate::roles::{NightCapability, RoleCatalog};

/// Canonical snapshot of the lobby and game.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GameState {
    /// Incremented on every committed mutation.
    pub revision: u64,

    /// Sequential player id allocator. Ids are never reused.
    next_player_id: u32,

    /// Every registered player, in registration order.
    pub roster: BTreeMap<PlayerId, PlayerRecord>,
    pub composition: RoleComposition,
    pub phase: Phase,

    /// Assignment and per-player state of the running (or last finished) game.
    pub seats: BTreeMap<PlayerId, Seat>,
    pub night: NightActions,
    pub day: DayBallot,

    /// Results of the most recent resolution, replaced by the next one.
    pub announcements: Vec<Announcement>,
    pub history: HistoryLog,
}

impl GameState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restores the id allocator when rebuilding from a stored snapshot.
    #[must_use]
    pub fn with_next_player_id(mut self, next_player_id: u32) -> Self {
        self.next_player_id = next_player_id;
        self
    }

    pub fn next_player_id(&self) -> u32 {
        self.next_player_id
    }

    pub(crate) fn allocate_player_id(&mut self) -> PlayerId {
        let id = PlayerId(self.next_player_id);
        self.next_player_id += 1;
        id
    }

    pub fn player(&self, id: PlayerId) -> Option<&PlayerRecord> {
        self.roster.get(&id)
    }

    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut PlayerRecord> {
        self.roster.get_mut(&id)
    }

    /// Looks a player up by display name, ignoring case and surrounding whitespace.
    pub fn player_by_name(&self, name: &str) -> Option<&PlayerRecord> {
        let wanted = normalize_name(name);
        self.roster
            .values()
            .find(|record| normalize_name(&record.name) == wanted)
    }

    pub fn name_of(&self, id: PlayerId) -> String {
        self.player(id)
            .map(|record| record.name.clone())
            .unwrap_or_else(|| id.to_string())
    }

    pub fn is_connected(&self, id: PlayerId) -> bool {
        self.player(id).is_some_and(|record| record.connected)
    }

    pub fn connected_players(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.roster
            .values()
            .filter(|record| record.connected)
            .map(|record| record.id)
    }

    pub fn seat(&self, id: PlayerId) -> Option<&Seat> {
        self.seats.get(&id)
    }

    pub fn seat_mut(&mut self, id: PlayerId) -> Option<&mut Seat> {
        self.seats.get_mut(&id)
    }

    pub fn is_alive(&self, id: PlayerId) -> bool {
        self.seat(id).is_some_and(|seat| seat.alive)
    }

    pub fn alive_players(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.seats
            .iter()
            .filter(|(_, seat)| seat.alive)
            .map(|(id, _)| *id)
    }

    pub fn alive_count(&self) -> usize {
        self.alive_players().count()
    }

    pub fn alive_werewolves(&self, catalog: &RoleCatalog) -> usize {
        self.seats
            .values()
            .filter(|seat| seat.alive && catalog.faction_of(seat.role).is_werewolf())
            .count()
    }

    pub fn alive_non_werewolves(&self, catalog: &RoleCatalog) -> usize {
        self.alive_count() - self.alive_werewolves(catalog)
    }

    /// Alive players whose role votes on the night kill, in id order.
    pub fn pack(&self, catalog: &RoleCatalog) -> Vec<PlayerId> {
        self.seats
            .iter()
            .filter(|(_, seat)| {
                seat.alive && catalog.capability_of(seat.role) == NightCapability::KillVote
            })
            .map(|(id, _)| *id)
            .collect()
    }

    /// Earliest-registered player still alive in the game, or the earliest
    /// registered player outside a game.
    pub fn host(&self) -> Option<PlayerId> {
        if self.phase.in_game() {
            self.alive_players().next()
        } else {
            self.roster.keys().next().copied()
        }
    }

    /// Marks a seat dead. Returns false if it was already dead or unseated.
    pub(crate) fn eliminate(&mut self, id: PlayerId) -> bool {
        match self.seats.get_mut(&id) {
            Some(seat) if seat.alive => {
                seat.alive = false;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roles::RoleId;

    fn seated(roles: &[RoleId]) -> GameState {
        let mut state = GameState::new();
        for (index, role) in roles.iter().enumerate() {
            let id = state.allocate_player_id();
            state.roster.insert(
                id,
                PlayerRecord::new(id, format!("p{index}"), SecretToken::from_string("t")),
            );
            state.seats.insert(id, Seat::new(*role));
        }
        state.phase = Phase::Night { round: 1 };
        state
    }

    #[test]
    fn name_lookup_ignores_case_and_padding() {
        let state = seated(&[RoleId::Villager]);
        assert_eq!(state.player_by_name("  P0 ").map(|r| r.id), Some(PlayerId(0)));
    }

    #[test]
    fn counts_factions_among_the_living() {
        let catalog = RoleCatalog::standard();
        let mut state = seated(&[RoleId::Werewolf, RoleId::WolfCub, RoleId::Seer]);
        assert_eq!(state.alive_werewolves(&catalog), 2);
        assert_eq!(state.pack(&catalog), vec![PlayerId(0), PlayerId(1)]);

        assert!(state.eliminate(PlayerId(1)));
        assert!(!state.eliminate(PlayerId(1)));
        assert_eq!(state.alive_werewolves(&catalog), 1);
        assert_eq!(state.alive_non_werewolves(&catalog), 1);
    }

    #[test]
    fn host_is_earliest_seated_player() {
        let mut state = seated(&[RoleId::Villager, RoleId::Werewolf]);
        state.seats.remove(&PlayerId(0));
        assert_eq!(state.host(), Some(PlayerId(1)));

        state.phase = Phase::Lobby;
        assert_eq!(state.host(), Some(PlayerId(0)));
    }

    #[test]
    fn host_passes_to_the_next_living_player() {
        let mut state = seated(&[RoleId::Villager, RoleId::Werewolf, RoleId::Villager]);
        assert!(state.eliminate(PlayerId(0)));
        assert_eq!(state.host(), Some(PlayerId(1)));

        assert!(state.eliminate(PlayerId(1)));
        assert_eq!(state.host(), Some(PlayerId(2)));
    }
}
