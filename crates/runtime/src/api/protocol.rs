//! JSON wire protocol between the transport and connected clients.
//!
//! Clients send [`ClientMessage`]s, one JSON object per message with an
//! `action` field. The server answers every command with exactly one reply
//! (`signed_up`, `logged_in`, `ok` or `error`) and pushes `view` frames
//! whenever the recipient's projection changes.

use serde::{Deserialize, Serialize};

use game_core::{CommandResult, PlayerId, View};

use super::errors::{Result, RuntimeError};

/// Client command envelope. Identical to the engine's command type.
pub type ClientMessage = game_core::Command;

/// Decodes one client frame.
pub fn decode_client(text: &str) -> Result<ClientMessage> {
    serde_json::from_str(text).map_err(|error| RuntimeError::MalformedCommand(error.to_string()))
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    View {
        revision: u64,
        view: Box<View>,
    },
    SignedUp {
        player_id: PlayerId,
        secret_token: String,
    },
    LoggedIn {
        player_id: PlayerId,
    },
    Ok,
    /// Another connection logged in as the same player; this one is now anonymous.
    Superseded,
    Error {
        code: String,
        message: String,
    },
}

impl ServerMessage {
    pub fn error(error: &RuntimeError) -> Self {
        ServerMessage::Error {
            code: error.code().to_string(),
            message: error.to_string(),
        }
    }

    pub fn encode(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl From<CommandResult> for ServerMessage {
    fn from(result: CommandResult) -> Self {
        match result {
            CommandResult::SignedUp { player_id, token } => ServerMessage::SignedUp {
                player_id,
                secret_token: token.expose().to_string(),
            },
            CommandResult::LoggedIn { player_id } => ServerMessage::LoggedIn { player_id },
            CommandResult::Applied => ServerMessage::Ok,
        }
    }
}

impl From<Result<CommandResult>> for ServerMessage {
    fn from(result: Result<CommandResult>) -> Self {
        match result {
            Ok(result) => result.into(),
            Err(error) => ServerMessage::error(&error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use game_core::{Command, CommandError, SecretToken};

    #[test]
    fn decodes_client_envelopes() {
        let command = decode_client(r#"{"action":"wolf_vote","target_player_id":3}"#).unwrap();
        assert_eq!(
            command,
            Command::WolfVote {
                target: Some(PlayerId(3))
            }
        );

        let command = decode_client(r#"{"action":"wolf_vote","target_player_id":null}"#).unwrap();
        assert_eq!(command, Command::WolfVote { target: None });

        let command = decode_client(r#"{"action":"update_role","role_id":"seer","delta":-1}"#)
            .unwrap();
        assert_eq!(
            command,
            Command::UpdateRole {
                role_id: "seer".into(),
                delta: -1
            }
        );
    }

    #[test]
    fn malformed_frames_are_reported() {
        let error = decode_client(r#"{"action":"fly"}"#).unwrap_err();
        assert_eq!(error.code(), "malformed_command");
        assert!(decode_client("not json").is_err());
    }

    #[test]
    fn replies_carry_a_type_tag() {
        let signed_up = ServerMessage::from(CommandResult::SignedUp {
            player_id: PlayerId(0),
            token: SecretToken::from_string("abcd"),
        });
        let json: serde_json::Value = serde_json::from_str(&signed_up.encode().unwrap()).unwrap();
        assert_eq!(json["type"], "signed_up");
        assert_eq!(json["player_id"], 0);
        assert_eq!(json["secret_token"], "abcd");

        let error = ServerMessage::error(&RuntimeError::from(CommandError::NotYourTurn));
        let json: serde_json::Value = serde_json::from_str(&error.encode().unwrap()).unwrap();
        assert_eq!(json["type"], "error");
        assert_eq!(json["code"], "not_your_turn");
    }
}
