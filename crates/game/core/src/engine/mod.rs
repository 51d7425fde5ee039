//! Command execution pipeline.
//!
//! The [`GameEngine`] is the authoritative reducer for [`GameState`]. Every
//! command runs through its transition (pre_validate → apply →
//! post_validate); on success the night completion predicate is checked and
//! the revision is bumped, on failure the state is restored untouched.

mod transition;

pub use transition::{CommandTransition, RuleEnv};
#[cfg(test)]
pub(crate) use transition::drive_transition;

use rand::RngCore;

use crate::config::GameConfig;
use crate::error::CommandError;
use crate::phase::controller;
use crate::roles::RoleCatalog;
use crate::state::{GameState, PlayerId, SecretToken};

/// A client action, as it arrives on the wire.
#[derive(Clone, Debug, PartialEq, Eq, strum::IntoStaticStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "action", rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case")]
pub enum Command {
    Signup {
        name: String,
    },
    Login {
        name: String,
        secret_token: String,
    },
    UpdateRole {
        role_id: String,
        delta: i32,
    },
    StartGame,
    WolfVote {
        /// `None` votes for "no kill".
        #[cfg_attr(feature = "serde", serde(rename = "target_player_id", default))]
        target: Option<PlayerId>,
    },
    SeerInvestigate {
        #[cfg_attr(feature = "serde", serde(rename = "target_player_id"))]
        target: PlayerId,
    },
    DoctorProtect {
        #[cfg_attr(feature = "serde", serde(rename = "target_player_id"))]
        target: PlayerId,
    },
    GuardProtect {
        #[cfg_attr(feature = "serde", serde(rename = "target_player_id"))]
        target: PlayerId,
    },
    DayVote {
        #[cfg_attr(feature = "serde", serde(rename = "target_player_id"))]
        target: PlayerId,
    },
    DayPass,
    EndVote,
    HunterShoot {
        #[cfg_attr(feature = "serde", serde(rename = "target_player_id"))]
        target: PlayerId,
    },
    PlayAgain,
}

impl Command {
    /// Wire name of the action, for logs.
    pub fn name(&self) -> &'static str {
        self.into()
    }
}

/// Successful outcome of [`GameEngine::execute`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommandResult {
    SignedUp {
        player_id: PlayerId,
        token: SecretToken,
    },
    LoggedIn {
        player_id: PlayerId,
    },
    Applied,
}

/// Game engine that validates and applies commands against one state.
pub struct GameEngine<'a> {
    state: &'a mut GameState,
    env: RuleEnv<'a>,
}

impl<'a> GameEngine<'a> {
    pub fn new(state: &'a mut GameState, catalog: &'a RoleCatalog, config: &'a GameConfig) -> Self {
        Self {
            state,
            env: RuleEnv::new(catalog, config),
        }
    }

    pub fn state(&self) -> &GameState {
        self.state
    }

    /// Executes `command` on behalf of `sender` (`None` for an anonymous
    /// connection). A rejected command leaves the state exactly as it was.
    pub fn execute(
        &mut self,
        sender: Option<PlayerId>,
        command: &Command,
        rng: &mut dyn RngCore,
    ) -> Result<CommandResult, CommandError> {
        let before = self.state.clone();

        let outcome = transition::execute_transition(sender, command, self.state, &self.env, rng);
        match outcome {
            Ok(result) => {
                controller::advance(self.state, &self.env);
                self.state.revision += 1;
                Ok(result)
            }
            Err(error) => {
                *self.state = before;
                Err(error)
            }
        }
    }

    /// Records a player's connection status. Returns true if anything changed.
    ///
    /// A disconnect may complete the night under the skip policy, so the
    /// completion predicate runs here too.
    pub fn set_connected(&mut self, player: PlayerId, connected: bool) -> bool {
        let Some(record) = self.state.player_mut(player) else {
            return false;
        };
        if record.connected == connected {
            return false;
        }
        record.connected = connected;
        controller::advance(self.state, &self.env);
        self.state.revision += 1;
        true
    }

    /// Re-checks the night completion predicate, e.g. after a restore.
    pub fn advance(&mut self) -> bool {
        let moved = controller::advance(self.state, &self.env);
        if moved {
            self.state.revision += 1;
        }
        moved
    }
}
