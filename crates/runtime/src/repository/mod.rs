//! Store layer for the lobby and its running game.
//!
//! The engine worker writes a [`StoreSnapshot`] at the end of every
//! successful command and reads one back on startup. Static content (role
//! catalogs, rules) comes from `game-content`, not from here.

mod error;
mod file;
mod memory;
mod snapshot;
mod traits;

pub use error::{RepositoryError, Result};
pub use file::FileStore;
pub use memory::InMemoryStore;
pub use snapshot::{AssignmentRow, DayVoteRow, GameRow, NightActionRow, SeerRow, StoreSnapshot};
pub use traits::GameStore;
