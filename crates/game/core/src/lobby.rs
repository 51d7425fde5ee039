//! Role composition, start readiness, and the start of a game.

use std::collections::BTreeMap;
use std::str::FromStr;

use rand::RngCore;
use rand::seq::SliceRandom;

use crate::config::GameConfig;
use crate::day::DayBallot;
use crate::engine::{CommandTransition, RuleEnv};
use crate::error::CommandError;
use crate::history::{Disclosure, HistoryKind};
use crate::night::NightActions;
use crate::phase::{Phase, PhaseKind};
use crate::roles::{RoleCatalog, RoleId};
use crate::state::{GameState, PlayerId, Seat};

/// Multiset of roles the next game will deal.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct RoleComposition(BTreeMap<RoleId, u32>);

impl RoleComposition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_counts(counts: impl IntoIterator<Item = (RoleId, u32)>) -> Self {
        Self(
            counts
                .into_iter()
                .filter(|(_, count)| *count > 0)
                .collect(),
        )
    }

    pub fn count(&self, role: RoleId) -> u32 {
        self.0.get(&role).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.0.values().map(|count| *count as usize).sum()
    }

    /// Non-zero entries in role-id order.
    pub fn iter(&self) -> impl Iterator<Item = (RoleId, u32)> + '_ {
        self.0.iter().map(|(role, count)| (*role, *count))
    }

    /// Adds `delta` (±1) to a role's count.
    pub fn adjust(&mut self, role: RoleId, delta: i32) -> Result<u32, CommandError> {
        let current = self.count(role);
        let next = match delta {
            1 => current + 1,
            -1 if current > 0 => current - 1,
            _ => return Err(CommandError::InvalidRoleCount { role, delta }),
        };
        if next == 0 {
            self.0.remove(&role);
        } else {
            self.0.insert(role, next);
        }
        Ok(next)
    }

    pub fn werewolf_count(&self, catalog: &RoleCatalog) -> usize {
        self.iter()
            .filter(|(role, _)| catalog.faction_of(*role).is_werewolf())
            .map(|(_, count)| count as usize)
            .sum()
    }

    /// Expands the multiset into one entry per seat.
    pub fn deal(&self) -> Vec<RoleId> {
        self.iter()
            .flat_map(|(role, count)| std::iter::repeat_n(role, count as usize))
            .collect()
    }
}

/// Whether the lobby can start, or the first reason it cannot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LobbyStatus {
    Ready,
    NotEnoughPlayers { min: usize },
    CountMismatch { roles: usize, players: usize },
    NoWerewolf,
    NoVillager,
}

impl LobbyStatus {
    pub fn evaluate(state: &GameState, catalog: &RoleCatalog, config: &GameConfig) -> Self {
        let players = state.connected_players().count();
        let roles = state.composition.total();
        let werewolves = state.composition.werewolf_count(catalog);

        if players < config.min_players {
            Self::NotEnoughPlayers {
                min: config.min_players,
            }
        } else if roles != players {
            Self::CountMismatch { roles, players }
        } else if werewolves == 0 {
            Self::NoWerewolf
        } else if werewolves == roles {
            Self::NoVillager
        } else {
            Self::Ready
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }

    pub fn message(&self) -> String {
        match self {
            Self::Ready => "Ready to start".to_string(),
            Self::NotEnoughPlayers { min } => format!("Need at least {min} players"),
            Self::CountMismatch { roles, players } => {
                format!("Role count ({roles}) does not match player count ({players})")
            }
            Self::NoWerewolf => "Need at least one werewolf".to_string(),
            Self::NoVillager => "Need at least one non-werewolf".to_string(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct UpdateRoleAction {
    pub role_id: String,
    pub delta: i32,
}

impl UpdateRoleAction {
    fn role(&self, catalog: &RoleCatalog) -> Result<RoleId, CommandError> {
        RoleId::from_str(self.role_id.trim())
            .ok()
            .filter(|role| catalog.contains(*role))
            .ok_or_else(|| CommandError::UnknownRole {
                role: self.role_id.clone(),
            })
    }
}

impl CommandTransition for UpdateRoleAction {
    type Output = u32;

    fn pre_validate(&self, state: &GameState, env: &RuleEnv<'_>) -> Result<(), CommandError> {
        if !matches!(state.phase, Phase::Lobby) {
            return Err(CommandError::NotInLobby);
        }
        self.role(env.catalog).map(|_| ())
    }

    fn apply(
        &self,
        state: &mut GameState,
        env: &RuleEnv<'_>,
        _rng: &mut dyn RngCore,
    ) -> Result<Self::Output, CommandError> {
        let role = self.role(env.catalog)?;
        state.composition.adjust(role, self.delta)
    }
}

/// Deals roles to the connected lobby and opens night 1.
#[derive(Clone, Copy, Debug)]
pub struct StartGameAction;

impl CommandTransition for StartGameAction {
    type Output = ();

    fn pre_validate(&self, state: &GameState, env: &RuleEnv<'_>) -> Result<(), CommandError> {
        if !matches!(state.phase, Phase::Lobby) {
            return Err(CommandError::NotInLobby);
        }
        let status = LobbyStatus::evaluate(state, env.catalog, env.config);
        if !status.is_ready() {
            return Err(CommandError::NotStartable {
                reason: status.message(),
            });
        }
        Ok(())
    }

    fn apply(
        &self,
        state: &mut GameState,
        _env: &RuleEnv<'_>,
        rng: &mut dyn RngCore,
    ) -> Result<Self::Output, CommandError> {
        state.roster.retain(|_, record| record.connected);

        let mut roles = state.composition.deal();
        roles.shuffle(rng);
        let players: Vec<PlayerId> = state.roster.keys().copied().collect();

        state.seats = players
            .iter()
            .copied()
            .zip(roles)
            .map(|(id, role)| (id, Seat::new(role)))
            .collect();
        state.night = NightActions::new(1);
        state.day = DayBallot::default();
        state.announcements.clear();
        state.history.clear();

        state.history.record(
            1,
            PhaseKind::Lobby,
            None,
            HistoryKind::GameStarted {
                players: players.len(),
            },
            None,
            Disclosure::Public,
        );
        for (id, seat) in &state.seats {
            state.history.record(
                1,
                PhaseKind::Lobby,
                Some(*id),
                HistoryKind::RoleAssigned { role: seat.role },
                None,
                Disclosure::Actor(*id),
            );
        }

        state.phase = Phase::Night { round: 1 };
        Ok(())
    }

    fn post_validate(&self, state: &GameState, _env: &RuleEnv<'_>) -> Result<(), CommandError> {
        if state.seats.len() != state.composition.total() {
            return Err(CommandError::InvariantViolated(format!(
                "dealt {} seats for {} roles",
                state.seats.len(),
                state.composition.total()
            )));
        }
        Ok(())
    }
}
