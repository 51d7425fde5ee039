//! Worker tasks that back the runtime orchestration.
//!
//! The engine worker is the single writer of the game state; everything else
//! talks to it through [`Command`]s.

mod engine;

pub use engine::{Command, EngineWorker};
