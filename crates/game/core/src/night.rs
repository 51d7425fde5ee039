//! Night submissions, the completion predicate, and night resolution.
//!
//! Submissions are keyed by actor in a `BTreeMap`, so resolution walks them
//! in player-id order regardless of the order they arrived in.

use std::collections::{BTreeMap, BTreeSet};

use rand::RngCore;

use crate::config::DisconnectPolicy;
use crate::engine::{CommandTransition, RuleEnv};
use crate::error::{CommandError, TargetError};
use crate::history::{Announcement, Disclosure, HistoryKind};
use crate::phase::{Phase, PhaseKind};
use crate::roles::{Faction, NightCapability, RoleCatalog, RoleSpec};
use crate::state::{GameState, Investigation, PlayerId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case")]
pub enum NightActionKind {
    KillVote,
    Investigate,
    DoctorProtect,
    GuardProtect,
}

impl NightActionKind {
    pub fn capability(self) -> NightCapability {
        match self {
            Self::KillVote => NightCapability::KillVote,
            Self::Investigate => NightCapability::Investigate,
            Self::DoctorProtect => NightCapability::ProtectDoctor,
            Self::GuardProtect => NightCapability::ProtectGuard,
        }
    }

    pub fn for_capability(capability: NightCapability) -> Option<Self> {
        match capability {
            NightCapability::KillVote => Some(Self::KillVote),
            NightCapability::Investigate => Some(Self::Investigate),
            NightCapability::ProtectDoctor => Some(Self::DoctorProtect),
            NightCapability::ProtectGuard => Some(Self::GuardProtect),
            NightCapability::None | NightCapability::DeathShot => None,
        }
    }

    fn is_protection(self) -> bool {
        matches!(self, Self::DoctorProtect | Self::GuardProtect)
    }
}

/// One actor's current choice for the night.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NightAction {
    pub kind: NightActionKind,
    /// `None` only for a kill vote of "no kill".
    pub target: Option<PlayerId>,
}

/// Pending-action table of the current night.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NightActions {
    pub round: u32,
    submissions: BTreeMap<PlayerId, NightAction>,
}

/// Where the pack's kill vote stands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PackDecision {
    /// No option holds a strict majority yet.
    Pending,
    Kill(PlayerId),
    NoKill,
}

impl NightActions {
    pub fn new(round: u32) -> Self {
        Self {
            round,
            submissions: BTreeMap::new(),
        }
    }

    /// Rebuilds a table from stored rows.
    pub fn from_submissions(
        round: u32,
        submissions: impl IntoIterator<Item = (PlayerId, NightAction)>,
    ) -> Self {
        Self {
            round,
            submissions: submissions.into_iter().collect(),
        }
    }

    pub fn get(&self, actor: PlayerId) -> Option<&NightAction> {
        self.submissions.get(&actor)
    }

    pub fn has_acted(&self, actor: PlayerId) -> bool {
        self.submissions.contains_key(&actor)
    }

    pub fn iter(&self) -> impl Iterator<Item = (PlayerId, &NightAction)> + '_ {
        self.submissions.iter().map(|(id, action)| (*id, action))
    }

    pub fn is_empty(&self) -> bool {
        self.submissions.is_empty()
    }

    pub(crate) fn submit(&mut self, actor: PlayerId, action: NightAction) {
        self.submissions.insert(actor, action);
    }

    /// Current kill votes of alive pack members, in voter order.
    pub fn kill_votes<'a>(
        &'a self,
        state: &'a GameState,
        catalog: &'a RoleCatalog,
    ) -> impl Iterator<Item = (PlayerId, Option<PlayerId>)> + 'a {
        let pack: BTreeSet<PlayerId> = state.pack(catalog).into_iter().collect();
        self.submissions
            .iter()
            .filter(move |(voter, action)| {
                action.kind == NightActionKind::KillVote && pack.contains(*voter)
            })
            .map(|(voter, action)| (*voter, action.target))
    }

    /// Votes per option; `None` is "no kill".
    pub fn kill_tally(
        &self,
        state: &GameState,
        catalog: &RoleCatalog,
    ) -> BTreeMap<Option<PlayerId>, usize> {
        let mut tally = BTreeMap::new();
        for (_, target) in self.kill_votes(state, catalog) {
            *tally.entry(target).or_insert(0) += 1;
        }
        tally
    }

    /// Strict majority of the electorate decides. Under
    /// [`DisconnectPolicy::SkipDisconnected`] the electorate shrinks to pack
    /// members that are connected or have already voted.
    pub fn pack_decision(
        &self,
        state: &GameState,
        catalog: &RoleCatalog,
        policy: DisconnectPolicy,
    ) -> PackDecision {
        let electorate = state
            .pack(catalog)
            .into_iter()
            .filter(|id| match policy {
                DisconnectPolicy::Block => true,
                DisconnectPolicy::SkipDisconnected => {
                    state.is_connected(*id) || self.has_acted(*id)
                }
            })
            .count();
        if electorate == 0 {
            return PackDecision::NoKill;
        }

        let majority = electorate / 2 + 1;
        self.kill_tally(state, catalog)
            .into_iter()
            .find(|(_, votes)| *votes >= majority)
            .map(|(target, _)| match target {
                Some(victim) => PackDecision::Kill(victim),
                None => PackDecision::NoKill,
            })
            .unwrap_or(PackDecision::Pending)
    }

    /// True when every expected actor has acted and the pack has converged.
    pub fn is_complete(
        &self,
        state: &GameState,
        catalog: &RoleCatalog,
        policy: DisconnectPolicy,
    ) -> bool {
        let everyone_acted = expected_actors(state, catalog).all(|id| {
            self.has_acted(id)
                || (policy == DisconnectPolicy::SkipDisconnected && !state.is_connected(id))
        });
        everyone_acted && self.pack_decision(state, catalog, policy) != PackDecision::Pending
    }
}

/// Alive players who owe a night action, in id order.
pub fn expected_actors<'a>(
    state: &'a GameState,
    catalog: &'a RoleCatalog,
) -> impl Iterator<Item = PlayerId> + 'a {
    state
        .seats
        .iter()
        .filter(|(_, seat)| seat.alive && catalog.capability_of(seat.role).acts_at_night())
        .map(|(id, _)| *id)
}

/// Alive players `actor` may currently target with its night action.
pub fn valid_night_targets(
    state: &GameState,
    catalog: &RoleCatalog,
    actor: PlayerId,
) -> Vec<PlayerId> {
    let Some(seat) = state.seat(actor) else {
        return Vec::new();
    };
    let Some(spec) = catalog.get(seat.role) else {
        return Vec::new();
    };
    let Some(kind) = NightActionKind::for_capability(spec.night_capability) else {
        return Vec::new();
    };
    if !seat.alive || (kind == NightActionKind::Investigate && state.night.has_acted(actor)) {
        return Vec::new();
    }
    state
        .alive_players()
        .filter(|target| check_target(state, catalog, actor, spec, kind, *target).is_ok())
        .collect()
}

fn check_target(
    state: &GameState,
    catalog: &RoleCatalog,
    actor: PlayerId,
    spec: &RoleSpec,
    kind: NightActionKind,
    target: PlayerId,
) -> Result<(), TargetError> {
    let target_seat = state.seat(target).ok_or(TargetError::UnknownPlayer)?;
    if !target_seat.alive {
        return Err(TargetError::Dead);
    }
    if target == actor && !spec.target_self_allowed {
        return Err(TargetError::SelfTarget);
    }
    if !spec.target_repeat_allowed
        && state
            .seat(actor)
            .is_some_and(|seat| seat.previous_target == Some(target))
    {
        return Err(TargetError::RepeatTarget);
    }
    if kind == NightActionKind::KillVote && catalog.faction_of(target_seat.role).is_werewolf() {
        return Err(TargetError::SameFaction);
    }
    Ok(())
}

/// A night action from one player (kill vote, investigation, or protection).
#[derive(Clone, Debug)]
pub struct NightSubmission {
    pub actor: PlayerId,
    pub kind: NightActionKind,
    pub target: Option<PlayerId>,
}

impl NightSubmission {
    pub fn new(actor: PlayerId, kind: NightActionKind, target: Option<PlayerId>) -> Self {
        Self {
            actor,
            kind,
            target,
        }
    }
}

impl CommandTransition for NightSubmission {
    type Output = ();

    fn pre_validate(&self, state: &GameState, env: &RuleEnv<'_>) -> Result<(), CommandError> {
        let Phase::Night { .. } = state.phase else {
            return Err(CommandError::WrongPhase {
                actual: state.phase.kind(),
            });
        };
        let seat = state.seat(self.actor).ok_or(CommandError::NotAlive)?;
        if !seat.alive {
            return Err(CommandError::DeadCannotAct);
        }
        let spec = env
            .catalog
            .get(seat.role)
            .filter(|spec| spec.night_capability == self.kind.capability())
            .ok_or(CommandError::NotYourTurn)?;

        if self.kind == NightActionKind::Investigate && state.night.has_acted(self.actor) {
            return Err(CommandError::AlreadyActed);
        }

        match self.target {
            Some(target) => check_target(state, env.catalog, self.actor, spec, self.kind, target)
                .map_err(|reason| CommandError::invalid_target(target, reason)),
            None if self.kind == NightActionKind::KillVote => Ok(()),
            None => Err(CommandError::invalid_target(
                self.actor,
                TargetError::UnknownPlayer,
            )),
        }
    }

    fn apply(
        &self,
        state: &mut GameState,
        _env: &RuleEnv<'_>,
        _rng: &mut dyn RngCore,
    ) -> Result<Self::Output, CommandError> {
        state.night.submit(
            self.actor,
            NightAction {
                kind: self.kind,
                target: self.target,
            },
        );
        Ok(())
    }
}

/// What a night resolution did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NightSummary {
    pub round: u32,
    pub protected: BTreeSet<PlayerId>,
    /// Set when the pack nominated a victim who was protected.
    pub saved: Option<PlayerId>,
    pub victim: Option<PlayerId>,
}

/// Applies the night in fixed order: protections, investigations, the
/// kill, then guard bookkeeping. Clears the submission table.
///
/// Callers must check [`NightActions::is_complete`] first; an unresolved
/// pack resolves as no attack here.
pub fn resolve(
    state: &mut GameState,
    catalog: &RoleCatalog,
    policy: DisconnectPolicy,
) -> NightSummary {
    let round = state.phase.round();
    let decision = state.night.pack_decision(state, catalog, policy);
    let night = std::mem::replace(&mut state.night, NightActions::new(round));
    let mut summary = NightSummary {
        round,
        ..NightSummary::default()
    };

    // 1. protections
    for (actor, action) in night.iter() {
        if action.kind.is_protection()
            && let Some(target) = action.target
        {
            summary.protected.insert(target);
            state.history.record(
                round,
                PhaseKind::Night,
                Some(actor),
                HistoryKind::Protected,
                Some(target),
                Disclosure::Actor(actor),
            );
        }
    }

    // 2. investigations
    for (actor, action) in night.iter() {
        if action.kind != NightActionKind::Investigate {
            continue;
        }
        let Some(target) = action.target else {
            continue;
        };
        let faction = state
            .seat(target)
            .map(|seat| catalog.faction_of(seat.role))
            .unwrap_or(Faction::Village);
        if let Some(seat) = state.seat_mut(actor) {
            seat.investigations.push(Investigation {
                round,
                target,
                faction,
            });
        }
        state.history.record(
            round,
            PhaseKind::Night,
            Some(actor),
            HistoryKind::Investigated { faction },
            Some(target),
            Disclosure::Actor(actor),
        );
    }

    // 3. kill
    let final_votes: Vec<_> = night.kill_votes(state, catalog).collect();
    for (voter, target) in final_votes {
        state.history.record(
            round,
            PhaseKind::Night,
            Some(voter),
            HistoryKind::WolfVote,
            target,
            Disclosure::Werewolves,
        );
    }
    state.announcements.clear();
    if let PackDecision::Kill(target) = decision {
        if summary.protected.contains(&target) {
            summary.saved = Some(target);
        } else if state.eliminate(target) {
            summary.victim = Some(target);
        }
    }
    match summary.victim {
        Some(victim) => {
            state.history.record(
                round,
                PhaseKind::Night,
                None,
                HistoryKind::NightDeath,
                Some(victim),
                Disclosure::Public,
            );
            state
                .announcements
                .push(Announcement::NightDeath { victim });
        }
        None => {
            state.history.record(
                round,
                PhaseKind::Night,
                None,
                HistoryKind::QuietNight,
                None,
                Disclosure::Public,
            );
            state.announcements.push(Announcement::QuietNight);
        }
    }

    // 4. repeat-target bookkeeping for roles that forbid it
    let actors: Vec<PlayerId> = state.seats.keys().copied().collect();
    for actor in actors {
        let target = night
            .get(actor)
            .filter(|action| action.kind.is_protection())
            .and_then(|action| action.target);
        if let Some(seat) = state.seat_mut(actor)
            && catalog.get(seat.role).is_some_and(|spec| {
                !spec.target_repeat_allowed && spec.night_capability.acts_at_night()
            })
        {
            seat.previous_target = target;
        }
    }

    summary
}
