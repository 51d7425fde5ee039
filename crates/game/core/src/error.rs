//! Common error infrastructure for game-core.
//!
//! Every rejected command surfaces as a [`CommandError`]. Rejections never
//! change state; the engine restores its pre-command snapshot before
//! returning one.

use crate::phase::PhaseKind;
use crate::roles::RoleId;
use crate::state::PlayerId;

/// Severity level of an error, used for categorization and logging.
///
/// - **Validation**: Invalid input that should be rejected without retry
/// - **Internal**: Unexpected state inconsistencies that require investigation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ErrorSeverity {
    /// Invalid input from the sender. Other clients are unaffected.
    Validation,

    /// Unexpected state inconsistency. These indicate bugs and should be
    /// investigated.
    Internal,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Internal => "internal",
        }
    }

    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal)
    }
}

/// Common trait for errors that travel back to clients.
pub trait GameError: core::fmt::Display + core::fmt::Debug {
    fn severity(&self) -> ErrorSeverity;

    /// Stable snake_case identifier placed in the wire error payload.
    fn error_code(&self) -> &'static str;
}

/// Why a command's target was refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case")]
pub enum TargetError {
    /// Not a seated player in the current game.
    UnknownPlayer,
    Dead,
    SelfTarget,
    /// Same target as the previous night for a role that forbids it.
    RepeatTarget,
    /// The pack cannot attack one of its own faction.
    SameFaction,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CommandError {
    #[error("the name {name:?} is already taken")]
    NameTaken { name: String },

    #[error("invalid name: {reason}")]
    NameInvalid { reason: String },

    #[error("unknown name or wrong secret token")]
    BadCredentials,

    #[error("only allowed in the lobby")]
    NotInLobby,

    #[error("cannot start: {reason}")]
    NotStartable { reason: String },

    #[error("unknown role {role:?}")]
    UnknownRole { role: String },

    #[error("cannot change {role} count by {delta}")]
    InvalidRoleCount { role: RoleId, delta: i32 },

    #[error("not allowed during {actual}")]
    WrongPhase { actual: PhaseKind },

    #[error("it is not your turn to do that")]
    NotYourTurn,

    #[error("you are not playing in this game")]
    NotAlive,

    #[error("dead players cannot act")]
    DeadCannotAct,

    #[error("invalid target {target}: {reason}")]
    InvalidTarget { target: PlayerId, reason: TargetError },

    #[error("you have already acted this night")]
    AlreadyActed,

    #[error("sign up or log in first")]
    NotSignedIn,

    #[error("internal state inconsistency: {0}")]
    InvariantViolated(String),
}

impl CommandError {
    pub fn invalid_target(target: PlayerId, reason: TargetError) -> Self {
        Self::InvalidTarget { target, reason }
    }

    pub fn code(&self) -> &'static str {
        self.error_code()
    }
}

impl GameError for CommandError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::InvariantViolated(_) => ErrorSeverity::Internal,
            _ => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::NameTaken { .. } => "name_taken",
            Self::NameInvalid { .. } => "name_invalid",
            Self::BadCredentials => "bad_credentials",
            Self::NotInLobby => "not_in_lobby",
            Self::NotStartable { .. } => "not_startable",
            Self::UnknownRole { .. } => "unknown_role",
            Self::InvalidRoleCount { .. } => "invalid_role_count",
            Self::WrongPhase { .. } => "wrong_phase",
            Self::NotYourTurn => "not_your_turn",
            Self::NotAlive => "not_alive",
            Self::DeadCannotAct => "dead_cannot_act",
            Self::InvalidTarget { .. } => "invalid_target",
            Self::AlreadyActed => "already_acted",
            Self::NotSignedIn => "not_signed_in",
            Self::InvariantViolated(_) => "internal",
        }
    }
}
