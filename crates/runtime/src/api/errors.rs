//! Unified error types surfaced by the runtime API.
//!
//! Wraps rule rejections, store failures, and worker coordination failures so
//! the transport can turn any of them into an error payload for the sender.
use thiserror::Error;
use tokio::sync::oneshot;

use game_core::{CommandError, ErrorSeverity, GameError};

pub use crate::repository::RepositoryError;
use crate::sessions::ConnectionId;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Command(#[from] CommandError),

    #[error("the game could not be saved, nothing changed")]
    StoreUnavailable(#[source] RepositoryError),

    #[error("connection {0} is not registered")]
    UnknownConnection(ConnectionId),

    #[error("malformed command: {0}")]
    MalformedCommand(String),

    #[error("engine worker command channel closed")]
    CommandChannelClosed,

    #[error("engine worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("engine worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error("failed to restore the stored game")]
    Restore(#[source] RepositoryError),
}

impl RuntimeError {
    /// Stable snake_case code sent to clients.
    pub fn code(&self) -> &'static str {
        match self {
            RuntimeError::Command(error) => error.code(),
            RuntimeError::StoreUnavailable(_) => "store_unavailable",
            RuntimeError::UnknownConnection(_) => "unknown_connection",
            RuntimeError::MalformedCommand(_) => "malformed_command",
            RuntimeError::CommandChannelClosed
            | RuntimeError::ReplyChannelClosed(_)
            | RuntimeError::WorkerJoin(_)
            | RuntimeError::Restore(_) => "internal",
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            RuntimeError::Command(error) => error.severity(),
            RuntimeError::UnknownConnection(_) | RuntimeError::MalformedCommand(_) => {
                ErrorSeverity::Validation
            }
            _ => ErrorSeverity::Internal,
        }
    }
}
