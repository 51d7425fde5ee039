mod common;
mod player;

pub use common::{PlayerId, SecretToken};
pub use player::{Investigation, PlayerRecord, Seat};
