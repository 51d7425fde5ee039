//! Deterministic rules of the werewolf game.
//!
//! `game-core` owns the canonical game state, the command transitions that
//! mutate it, the night and day resolvers, the phase state machine, and the
//! per-recipient projection. It performs no I/O; callers supply the RNG.
//! All state mutation flows through [`engine::GameEngine`].
pub mod config;
pub mod day;
pub mod engine;
pub mod error;
pub mod history;
pub mod identity;
pub mod lobby;
pub mod night;
pub mod phase;
pub mod projection;
pub mod roles;
pub mod state;

pub use config::{DisconnectPolicy, GameConfig};
pub use day::{Ballot, DayBallot, DayOutcome};
pub use engine::{Command, CommandResult, CommandTransition, GameEngine, RuleEnv};
pub use error::{CommandError, ErrorSeverity, GameError, TargetError};
pub use history::{
    Announcement, Disclosure, HistoryEntry, HistoryKind, HistoryLog, NoEliminationReason,
};
pub use lobby::{LobbyStatus, RoleComposition};
pub use night::{NightAction, NightActionKind, NightActions, PackDecision};
pub use phase::{Phase, PhaseKind, RevengeSource, Winner, check_winner};
pub use projection::{Prompt, Recipient, RoleCount, View, project};
pub use roles::{Faction, NightCapability, RoleCatalog, RoleId, RoleSpec};
pub use state::{GameState, Investigation, PlayerId, PlayerRecord, SecretToken, Seat};
