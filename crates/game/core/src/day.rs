//! Day votes, passes, and the elimination tally.

use std::collections::BTreeMap;

use rand::RngCore;

use crate::engine::{CommandTransition, RuleEnv};
use crate::error::{CommandError, TargetError};
use crate::history::NoEliminationReason;
use crate::phase::Phase;
use crate::state::{GameState, PlayerId};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Ballot {
    Vote(PlayerId),
    Pass,
}

/// Open ballots of the current day.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DayBallot {
    pub round: u32,
    ballots: BTreeMap<PlayerId, Ballot>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DayOutcome {
    Eliminated { victim: PlayerId, votes: usize },
    NoElimination(NoEliminationReason),
}

impl DayBallot {
    pub fn new(round: u32) -> Self {
        Self {
            round,
            ballots: BTreeMap::new(),
        }
    }

    pub fn from_ballots(round: u32, ballots: impl IntoIterator<Item = (PlayerId, Ballot)>) -> Self {
        Self {
            round,
            ballots: ballots.into_iter().collect(),
        }
    }

    pub fn get(&self, voter: PlayerId) -> Option<Ballot> {
        self.ballots.get(&voter).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (PlayerId, Ballot)> + '_ {
        self.ballots.iter().map(|(voter, ballot)| (*voter, *ballot))
    }

    pub fn len(&self) -> usize {
        self.ballots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ballots.is_empty()
    }

    pub(crate) fn cast(&mut self, voter: PlayerId, ballot: Ballot) {
        self.ballots.insert(voter, ballot);
    }

    /// True when every alive player holds a ballot.
    pub fn all_acted(&self, state: &GameState) -> bool {
        state
            .alive_players()
            .all(|id| self.ballots.contains_key(&id))
    }

    /// Counts ballots of alive voters against a majority of ⌊alive/2⌋+1.
    pub fn tally(&self, state: &GameState) -> DayOutcome {
        let majority = state.alive_count() / 2 + 1;
        let mut votes: BTreeMap<PlayerId, usize> = BTreeMap::new();
        let mut passes = 0;
        for (voter, ballot) in self.iter() {
            if !state.is_alive(voter) {
                continue;
            }
            match ballot {
                Ballot::Vote(target) => *votes.entry(target).or_insert(0) += 1,
                Ballot::Pass => passes += 1,
            }
        }

        if let Some((victim, count)) = votes.iter().find(|(_, count)| **count >= majority) {
            return DayOutcome::Eliminated {
                victim: *victim,
                votes: *count,
            };
        }
        if passes >= majority {
            return DayOutcome::NoElimination(NoEliminationReason::Passes);
        }
        let top = votes.values().copied().max().unwrap_or(0);
        let leaders = votes.values().filter(|count| **count == top).count();
        if top > 0 && leaders > 1 {
            DayOutcome::NoElimination(NoEliminationReason::Tie)
        } else {
            DayOutcome::NoElimination(NoEliminationReason::NoMajority)
        }
    }
}

/// Alive players `voter` may vote for.
pub fn valid_day_targets(state: &GameState, voter: PlayerId) -> Vec<PlayerId> {
    if !state.is_alive(voter) {
        return Vec::new();
    }
    state.alive_players().filter(|id| *id != voter).collect()
}

fn require_living_voter(state: &GameState, voter: PlayerId) -> Result<(), CommandError> {
    let Phase::Day { .. } = state.phase else {
        return Err(CommandError::WrongPhase {
            actual: state.phase.kind(),
        });
    };
    let seat = state.seat(voter).ok_or(CommandError::NotAlive)?;
    if !seat.alive {
        return Err(CommandError::DeadCannotAct);
    }
    Ok(())
}

/// A day vote or pass; replaces any earlier ballot of the same voter.
#[derive(Clone, Debug)]
pub struct DayBallotAction {
    pub voter: PlayerId,
    pub ballot: Ballot,
}

impl DayBallotAction {
    pub fn vote(voter: PlayerId, target: PlayerId) -> Self {
        Self {
            voter,
            ballot: Ballot::Vote(target),
        }
    }

    pub fn pass(voter: PlayerId) -> Self {
        Self {
            voter,
            ballot: Ballot::Pass,
        }
    }
}

impl CommandTransition for DayBallotAction {
    type Output = ();

    fn pre_validate(&self, state: &GameState, _env: &RuleEnv<'_>) -> Result<(), CommandError> {
        require_living_voter(state, self.voter)?;
        if let Ballot::Vote(target) = self.ballot {
            let seat = state
                .seat(target)
                .ok_or(CommandError::invalid_target(target, TargetError::UnknownPlayer))?;
            if !seat.alive {
                return Err(CommandError::invalid_target(target, TargetError::Dead));
            }
            if target == self.voter {
                return Err(CommandError::invalid_target(target, TargetError::SelfTarget));
            }
        }
        Ok(())
    }

    fn apply(
        &self,
        state: &mut GameState,
        _env: &RuleEnv<'_>,
        _rng: &mut dyn RngCore,
    ) -> Result<Self::Output, CommandError> {
        state.day.cast(self.voter, self.ballot);
        Ok(())
    }
}

/// Closes the day vote. Allowed once everyone alive has acted, or earlier
/// for a living host when the rules permit it.
#[derive(Clone, Debug)]
pub struct EndVoteAction {
    pub actor: PlayerId,
}

impl EndVoteAction {
    pub fn permitted(state: &GameState, env: &RuleEnv<'_>, actor: PlayerId) -> bool {
        state.day.all_acted(state)
            || (env.config.host_can_end_vote && state.host() == Some(actor))
    }
}

impl CommandTransition for EndVoteAction {
    type Output = ();

    fn pre_validate(&self, state: &GameState, env: &RuleEnv<'_>) -> Result<(), CommandError> {
        require_living_voter(state, self.actor)?;
        if !Self::permitted(state, env, self.actor) {
            return Err(CommandError::NotYourTurn);
        }
        Ok(())
    }

    fn apply(
        &self,
        state: &mut GameState,
        env: &RuleEnv<'_>,
        _rng: &mut dyn RngCore,
    ) -> Result<Self::Output, CommandError> {
        crate::phase::controller::close_day(state, env.catalog);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roles::RoleId;
    use crate::state::{PlayerRecord, SecretToken, Seat};

    fn day_table(players: u32) -> GameState {
        let mut state = GameState::new();
        for index in 0..players {
            let id = state.allocate_player_id();
            state.roster.insert(
                id,
                PlayerRecord::new(id, format!("p{index}"), SecretToken::from_string("t")),
            );
            state.seats.insert(id, Seat::new(RoleId::Villager));
        }
        state.phase = Phase::Day { round: 1 };
        state.day = DayBallot::new(1);
        state
    }

    #[test]
    fn majority_eliminates() {
        let mut state = day_table(4);
        state.day.cast(PlayerId(0), Ballot::Vote(PlayerId(3)));
        state.day.cast(PlayerId(1), Ballot::Vote(PlayerId(3)));
        state.day.cast(PlayerId(2), Ballot::Vote(PlayerId(3)));
        assert_eq!(
            state.day.tally(&state),
            DayOutcome::Eliminated {
                victim: PlayerId(3),
                votes: 3
            }
        );
    }

    #[test]
    fn no_elimination_reasons() {
        let mut state = day_table(4);
        state.day.cast(PlayerId(0), Ballot::Vote(PlayerId(2)));
        state.day.cast(PlayerId(1), Ballot::Vote(PlayerId(3)));
        assert_eq!(
            state.day.tally(&state),
            DayOutcome::NoElimination(NoEliminationReason::Tie)
        );

        state.day.cast(PlayerId(2), Ballot::Pass);
        state.day.cast(PlayerId(3), Ballot::Pass);
        state.day.cast(PlayerId(1), Ballot::Pass);
        assert_eq!(
            state.day.tally(&state),
            DayOutcome::NoElimination(NoEliminationReason::Passes)
        );

        let mut state = day_table(4);
        state.day.cast(PlayerId(0), Ballot::Vote(PlayerId(2)));
        assert_eq!(
            state.day.tally(&state),
            DayOutcome::NoElimination(NoEliminationReason::NoMajority)
        );
    }

    #[test]
    fn changing_a_vote_replaces_it() {
        let mut state = day_table(3);
        state.day.cast(PlayerId(0), Ballot::Vote(PlayerId(1)));
        state.day.cast(PlayerId(0), Ballot::Vote(PlayerId(2)));
        assert_eq!(state.day.len(), 1);
        assert_eq!(state.day.get(PlayerId(0)), Some(Ballot::Vote(PlayerId(2))));
    }
}
