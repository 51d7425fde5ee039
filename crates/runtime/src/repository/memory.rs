//! In-memory store for tests and local runs.

use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;

use super::{GameStore, RepositoryError, Result, StoreSnapshot};

/// Keeps the last snapshot in memory.
///
/// [`InMemoryStore::set_available`] lets tests simulate an outage: while
/// unavailable every save fails and the previous snapshot stays in place.
#[derive(Default)]
pub struct InMemoryStore {
    snapshot: RwLock<Option<StoreSnapshot>>,
    unavailable: AtomicBool,
    saves: AtomicUsize,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshot(snapshot: StoreSnapshot) -> Self {
        Self {
            snapshot: RwLock::new(Some(snapshot)),
            ..Self::default()
        }
    }

    pub fn set_available(&self, available: bool) {
        self.unavailable.store(!available, Ordering::SeqCst);
    }

    /// Number of successful saves.
    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn snapshot(&self) -> Result<Option<StoreSnapshot>> {
        let snapshot = self
            .snapshot
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(snapshot.clone())
    }
}

#[async_trait]
impl GameStore for InMemoryStore {
    async fn load(&self) -> Result<Option<StoreSnapshot>> {
        self.snapshot()
    }

    async fn save(&self, snapshot: &StoreSnapshot) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(RepositoryError::Unavailable("in-memory store switched off".into()));
        }
        let mut stored = self
            .snapshot
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        *stored = Some(snapshot.clone());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
