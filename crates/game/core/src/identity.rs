//! Display names and secret rejoin tokens.

use rand::RngCore;

use crate::engine::{CommandTransition, RuleEnv};
use crate::error::CommandError;
use crate::phase::Phase;
use crate::state::{GameState, PlayerId, PlayerRecord, SecretToken};

/// Canonical comparison form of a display name.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Trims `raw` and checks it against the naming rules.
pub fn validate_name(raw: &str, max_len: usize) -> Result<String, CommandError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(CommandError::NameInvalid {
            reason: "name is empty".to_string(),
        });
    }
    if name.chars().count() > max_len {
        return Err(CommandError::NameInvalid {
            reason: format!("name is longer than {max_len} characters"),
        });
    }
    if name.chars().any(char::is_control) {
        return Err(CommandError::NameInvalid {
            reason: "name contains control characters".to_string(),
        });
    }
    Ok(name.to_string())
}

/// Registers a new player in the lobby (or the finished game's roster).
#[derive(Clone, Debug)]
pub struct SignupAction {
    pub name: String,
}

impl CommandTransition for SignupAction {
    type Output = (PlayerId, SecretToken);

    fn pre_validate(&self, state: &GameState, env: &RuleEnv<'_>) -> Result<(), CommandError> {
        if !matches!(state.phase, Phase::Lobby | Phase::Finished { .. }) {
            return Err(CommandError::NotInLobby);
        }
        let name = validate_name(&self.name, env.config.max_name_len)?;
        if state.player_by_name(&name).is_some() {
            return Err(CommandError::NameTaken { name });
        }
        Ok(())
    }

    fn apply(
        &self,
        state: &mut GameState,
        env: &RuleEnv<'_>,
        rng: &mut dyn RngCore,
    ) -> Result<Self::Output, CommandError> {
        let name = validate_name(&self.name, env.config.max_name_len)?;
        let id = state.allocate_player_id();
        let token = SecretToken::generate(rng);
        state
            .roster
            .insert(id, PlayerRecord::new(id, name, token.clone()));
        Ok((id, token))
    }
}

/// Resolves (name, token) back to a registered player and marks them connected.
#[derive(Clone, Debug)]
pub struct LoginAction {
    pub name: String,
    pub secret_token: String,
}

impl LoginAction {
    fn resolve(&self, state: &GameState) -> Result<PlayerId, CommandError> {
        state
            .player_by_name(&self.name)
            .filter(|record| record.token.matches(&self.secret_token))
            .map(|record| record.id)
            .ok_or(CommandError::BadCredentials)
    }
}

impl CommandTransition for LoginAction {
    type Output = PlayerId;

    fn pre_validate(&self, state: &GameState, _env: &RuleEnv<'_>) -> Result<(), CommandError> {
        self.resolve(state).map(|_| ())
    }

    fn apply(
        &self,
        state: &mut GameState,
        _env: &RuleEnv<'_>,
        _rng: &mut dyn RngCore,
    ) -> Result<Self::Output, CommandError> {
        let id = self.resolve(state)?;
        if let Some(record) = state.player_mut(id) {
            record.connected = true;
        }
        Ok(id)
    }
}
