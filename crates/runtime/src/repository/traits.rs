//! Store contract for saving and loading the lobby.

use async_trait::async_trait;

use super::{Result, StoreSnapshot};

/// Durable home of the single global lobby.
///
/// `save` replaces the stored snapshot as a whole; a failed save must leave
/// the previous snapshot readable.
#[async_trait]
pub trait GameStore: Send + Sync {
    /// Load the last saved snapshot, if any.
    async fn load(&self) -> Result<Option<StoreSnapshot>>;

    /// Replace the stored snapshot.
    async fn save(&self, snapshot: &StoreSnapshot) -> Result<()>;
}
