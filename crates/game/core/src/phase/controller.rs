//! Phase transitions that follow a completed resolution.

use rand::RngCore;

use crate::day::{Ballot, DayBallot, DayOutcome};
use crate::engine::{CommandTransition, RuleEnv};
use crate::error::{CommandError, TargetError};
use crate::history::{Announcement, Disclosure, HistoryKind};
use crate::night::{self, NightActions};
use crate::roles::{NightCapability, RoleCatalog};
use crate::state::{GameState, PlayerId};

use super::{Phase, PhaseKind, RevengeSource, Winner};

/// Win predicate over the living: villagers win with no werewolves left,
/// werewolves win once they are at least as many as everyone else.
pub fn check_winner(state: &GameState, catalog: &RoleCatalog) -> Option<Winner> {
    let werewolves = state.alive_werewolves(catalog);
    if werewolves == 0 {
        Some(Winner::Villagers)
    } else if werewolves >= state.alive_non_werewolves(catalog) {
        Some(Winner::Werewolves)
    } else {
        None
    }
}

/// Resolves the night if its completion predicate holds. Returns true if
/// the phase moved.
pub fn advance(state: &mut GameState, env: &RuleEnv<'_>) -> bool {
    let Phase::Night { .. } = state.phase else {
        return false;
    };
    let policy = env.config.disconnect_policy;
    if !state.night.is_complete(state, env.catalog, policy) {
        return false;
    }
    let summary = night::resolve(state, env.catalog, policy);
    match summary.victim {
        Some(victim) if owes_revenge(state, env.catalog, victim) => {
            begin_revenge(state, RevengeSource::Night, summary.round, victim);
        }
        _ => open_day(state, summary.round),
    }
    true
}

/// A night kill alone never ends the game; the win predicate waits for the
/// day tally or a hunter shot.
fn open_day(state: &mut GameState, round: u32) {
    state.day = DayBallot::new(round);
    state.phase = Phase::Day { round };
}

/// Tallies the day, applies the outcome, and moves on.
pub(crate) fn close_day(state: &mut GameState, catalog: &RoleCatalog) {
    let round = state.phase.round();
    let outcome = state.day.tally(state);
    let ballots = std::mem::take(&mut state.day);

    state.announcements.clear();
    for (voter, ballot) in ballots.iter() {
        let (kind, target) = match ballot {
            Ballot::Vote(target) => (HistoryKind::DayVote, Some(target)),
            Ballot::Pass => (HistoryKind::DayPass, None),
        };
        state
            .history
            .record(round, PhaseKind::Day, Some(voter), kind, target, Disclosure::Public);
    }

    match outcome {
        DayOutcome::Eliminated { victim, votes } => {
            state.eliminate(victim);
            state.history.record(
                round,
                PhaseKind::Day,
                None,
                HistoryKind::DayElimination { votes },
                Some(victim),
                Disclosure::Public,
            );
            state
                .announcements
                .push(Announcement::DayElimination { victim, votes });
            if owes_revenge(state, catalog, victim) {
                begin_revenge(state, RevengeSource::Day, round, victim);
                return;
            }
        }
        DayOutcome::NoElimination(reason) => {
            state.history.record(
                round,
                PhaseKind::Day,
                None,
                HistoryKind::NoElimination { reason },
                None,
                Disclosure::Public,
            );
            state
                .announcements
                .push(Announcement::NoElimination { reason });
        }
    }
    settle(state, catalog, RevengeSource::Day, round);
}

fn owes_revenge(state: &GameState, catalog: &RoleCatalog, victim: PlayerId) -> bool {
    state
        .seat(victim)
        .is_some_and(|seat| catalog.capability_of(seat.role) == NightCapability::DeathShot)
}

fn begin_revenge(state: &mut GameState, source: RevengeSource, round: u32, hunter: PlayerId) {
    if let Some(seat) = state.seat_mut(hunter) {
        seat.pending_revenge = true;
    }
    state.phase = Phase::HunterRevenge {
        source,
        round,
        hunter,
    };
}

/// Win check, then the phase that follows `source`: night → day(r),
/// day → night(r+1).
fn settle(state: &mut GameState, catalog: &RoleCatalog, source: RevengeSource, round: u32) {
    if let Some(winner) = check_winner(state, catalog) {
        state.history.record(
            round,
            state.phase.kind(),
            None,
            HistoryKind::GameOver { winner },
            None,
            Disclosure::Public,
        );
        state.announcements.push(Announcement::Victory { winner });
        state.night = NightActions::new(round);
        state.day = DayBallot::new(round);
        state.phase = Phase::Finished { winner, round };
        return;
    }
    match source {
        RevengeSource::Night => open_day(state, round),
        RevengeSource::Day => {
            state.day = DayBallot::new(round);
            state.night = NightActions::new(round + 1);
            state.phase = Phase::Night { round: round + 1 };
        }
    }
}

/// Returns a finished game to the lobby, keeping the composition and
/// connected players.
pub fn play_again(state: &mut GameState) -> Result<(), CommandError> {
    let Phase::Finished { .. } = state.phase else {
        return Err(CommandError::WrongPhase {
            actual: state.phase.kind(),
        });
    };
    state.roster.retain(|_, record| record.connected);
    state.seats.clear();
    state.night = NightActions::default();
    state.day = DayBallot::default();
    state.announcements.clear();
    state.phase = Phase::Lobby;
    Ok(())
}

#[derive(Clone, Copy, Debug)]
pub struct PlayAgainAction;

impl CommandTransition for PlayAgainAction {
    type Output = ();

    fn pre_validate(&self, state: &GameState, _env: &RuleEnv<'_>) -> Result<(), CommandError> {
        match state.phase {
            Phase::Finished { .. } => Ok(()),
            phase => Err(CommandError::WrongPhase {
                actual: phase.kind(),
            }),
        }
    }

    fn apply(
        &self,
        state: &mut GameState,
        _env: &RuleEnv<'_>,
        _rng: &mut dyn RngCore,
    ) -> Result<Self::Output, CommandError> {
        play_again(state)
    }
}

/// The pending hunter's revenge shot.
#[derive(Clone, Debug)]
pub struct HunterShotAction {
    pub actor: PlayerId,
    pub target: PlayerId,
}

impl CommandTransition for HunterShotAction {
    type Output = ();

    fn pre_validate(&self, state: &GameState, _env: &RuleEnv<'_>) -> Result<(), CommandError> {
        let Phase::HunterRevenge { hunter, .. } = state.phase else {
            return Err(CommandError::WrongPhase {
                actual: state.phase.kind(),
            });
        };
        if hunter != self.actor {
            return Err(CommandError::NotYourTurn);
        }
        let seat = state.seat(self.target).ok_or(CommandError::invalid_target(
            self.target,
            TargetError::UnknownPlayer,
        ))?;
        if self.target == self.actor {
            return Err(CommandError::invalid_target(
                self.target,
                TargetError::SelfTarget,
            ));
        }
        if !seat.alive {
            return Err(CommandError::invalid_target(self.target, TargetError::Dead));
        }
        Ok(())
    }

    fn apply(
        &self,
        state: &mut GameState,
        env: &RuleEnv<'_>,
        _rng: &mut dyn RngCore,
    ) -> Result<Self::Output, CommandError> {
        let Phase::HunterRevenge { source, round, .. } = state.phase else {
            return Err(CommandError::InvariantViolated(
                "hunter shot outside revenge".to_string(),
            ));
        };
        if let Some(seat) = state.seat_mut(self.actor) {
            seat.pending_revenge = false;
        }
        state.eliminate(self.target);
        state.history.record(
            round,
            PhaseKind::HunterRevenge,
            Some(self.actor),
            HistoryKind::HunterShot,
            Some(self.target),
            Disclosure::Public,
        );
        state.announcements.push(Announcement::HunterShot {
            hunter: self.actor,
            target: self.target,
        });

        if owes_revenge(state, env.catalog, self.target) {
            begin_revenge(state, source, round, self.target);
        } else {
            settle(state, env.catalog, source, round);
        }
        Ok(())
    }

    fn post_validate(&self, state: &GameState, _env: &RuleEnv<'_>) -> Result<(), CommandError> {
        if state.is_alive(self.target) {
            return Err(CommandError::InvariantViolated(format!(
                "{} survived the hunter's shot",
                self.target
            )));
        }
        Ok(())
    }
}
