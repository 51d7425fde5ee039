//! Command transition trait and dispatch.

use rand::RngCore;

use crate::config::GameConfig;
use crate::day::{DayBallotAction, EndVoteAction};
use crate::error::CommandError;
use crate::identity::{LoginAction, SignupAction};
use crate::lobby::{StartGameAction, UpdateRoleAction};
use crate::night::{NightActionKind, NightSubmission};
use crate::phase::controller::{HunterShotAction, PlayAgainAction};
use crate::roles::RoleCatalog;
use crate::state::{GameState, PlayerId};

use super::{Command, CommandResult};

/// Read-only rule facts every transition may consult.
#[derive(Clone, Copy, Debug)]
pub struct RuleEnv<'a> {
    pub catalog: &'a RoleCatalog,
    pub config: &'a GameConfig,
}

impl<'a> RuleEnv<'a> {
    pub fn new(catalog: &'a RoleCatalog, config: &'a GameConfig) -> Self {
        Self { catalog, config }
    }
}

/// Defines how one command mutates game state.
///
/// Validation hooks must stay side-effect free. `apply` may assume
/// `pre_validate` has already succeeded against the same state.
pub trait CommandTransition {
    type Output;

    /// Validates pre-conditions using the state **before** mutation.
    fn pre_validate(&self, _state: &GameState, _env: &RuleEnv<'_>) -> Result<(), CommandError> {
        Ok(())
    }

    fn apply(
        &self,
        state: &mut GameState,
        env: &RuleEnv<'_>,
        rng: &mut dyn RngCore,
    ) -> Result<Self::Output, CommandError>;

    /// Validates post-conditions using the state **after** mutation.
    fn post_validate(&self, _state: &GameState, _env: &RuleEnv<'_>) -> Result<(), CommandError> {
        Ok(())
    }
}

/// Runs a transition through pre_validate → apply → post_validate.
#[inline]
pub(crate) fn drive_transition<T>(
    transition: &T,
    state: &mut GameState,
    env: &RuleEnv<'_>,
    rng: &mut dyn RngCore,
) -> Result<T::Output, CommandError>
where
    T: CommandTransition,
{
    transition.pre_validate(state, env)?;
    let output = transition.apply(state, env, rng)?;
    transition.post_validate(state, env)?;
    Ok(output)
}

/// Routes a command from `sender` to its transition.
pub(super) fn execute_transition(
    sender: Option<PlayerId>,
    command: &Command,
    state: &mut GameState,
    env: &RuleEnv<'_>,
    rng: &mut dyn RngCore,
) -> Result<CommandResult, CommandError> {
    match command {
        Command::Signup { name } => {
            let action = SignupAction { name: name.clone() };
            let (player_id, token) = drive_transition(&action, state, env, rng)?;
            return Ok(CommandResult::SignedUp { player_id, token });
        }
        Command::Login { name, secret_token } => {
            let action = LoginAction {
                name: name.clone(),
                secret_token: secret_token.clone(),
            };
            let player_id = drive_transition(&action, state, env, rng)?;
            return Ok(CommandResult::LoggedIn { player_id });
        }
        Command::UpdateRole { role_id, delta } => {
            registered(sender, state)?;
            let action = UpdateRoleAction {
                role_id: role_id.clone(),
                delta: *delta,
            };
            drive_transition(&action, state, env, rng)?;
        }
        Command::StartGame => {
            registered(sender, state)?;
            drive_transition(&StartGameAction, state, env, rng)?;
        }
        Command::WolfVote { target } => {
            let actor = registered(sender, state)?;
            let action = NightSubmission::new(actor, NightActionKind::KillVote, *target);
            drive_transition(&action, state, env, rng)?;
        }
        Command::SeerInvestigate { target } => {
            let actor = registered(sender, state)?;
            let action = NightSubmission::new(actor, NightActionKind::Investigate, Some(*target));
            drive_transition(&action, state, env, rng)?;
        }
        Command::DoctorProtect { target } => {
            let actor = registered(sender, state)?;
            let action =
                NightSubmission::new(actor, NightActionKind::DoctorProtect, Some(*target));
            drive_transition(&action, state, env, rng)?;
        }
        Command::GuardProtect { target } => {
            let actor = registered(sender, state)?;
            let action = NightSubmission::new(actor, NightActionKind::GuardProtect, Some(*target));
            drive_transition(&action, state, env, rng)?;
        }
        Command::DayVote { target } => {
            let actor = registered(sender, state)?;
            drive_transition(&DayBallotAction::vote(actor, *target), state, env, rng)?;
        }
        Command::DayPass => {
            let actor = registered(sender, state)?;
            drive_transition(&DayBallotAction::pass(actor), state, env, rng)?;
        }
        Command::EndVote => {
            let actor = registered(sender, state)?;
            drive_transition(&EndVoteAction { actor }, state, env, rng)?;
        }
        Command::HunterShoot { target } => {
            let actor = registered(sender, state)?;
            let action = HunterShotAction {
                actor,
                target: *target,
            };
            drive_transition(&action, state, env, rng)?;
        }
        Command::PlayAgain => {
            registered(sender, state)?;
            drive_transition(&PlayAgainAction, state, env, rng)?;
        }
    }

    Ok(CommandResult::Applied)
}

/// Everything except signup and login needs a known player behind the connection.
fn registered(sender: Option<PlayerId>, state: &GameState) -> Result<PlayerId, CommandError> {
    sender
        .filter(|id| state.player(*id).is_some())
        .ok_or(CommandError::NotSignedIn)
}
