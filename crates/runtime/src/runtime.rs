//! High-level runtime orchestrator.
//!
//! The runtime owns the engine worker, wires up command/event channels, and
//! exposes a builder-based API for embedding the lobby in a server.

use std::sync::Arc;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::info;

use game_core::{GameConfig, GameState, Phase, RoleCatalog};

use crate::api::{Result, RuntimeError, RuntimeHandle};
use crate::events::{Event, EventBus, Topic};
use crate::repository::{GameStore, InMemoryStore};
use crate::workers::{Command, EngineWorker};

/// Runtime configuration shared across the orchestrator and workers.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub game_config: GameConfig,
    pub event_buffer_size: usize,
    pub command_buffer_size: usize,
    /// Frames each connection may have queued before new ones are dropped.
    pub outbox_capacity: usize,
    /// Fixed RNG seed for reproducible role deals. `None` draws one from the OS.
    pub seed: Option<u64>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            game_config: GameConfig::default(),
            event_buffer_size: 100,
            command_buffer_size: 32,
            outbox_capacity: 16,
            seed: None,
        }
    }
}

/// Main runtime that owns the engine worker.
///
/// [`RuntimeHandle`] provides a cloneable façade for connections.
pub struct Runtime {
    handle: RuntimeHandle,
    worker_handle: JoinHandle<()>,
}

impl Runtime {
    /// Create a new runtime builder
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Get a cloneable handle to this runtime
    pub fn handle(&self) -> RuntimeHandle {
        self.handle.clone()
    }

    /// Subscribe to runtime events of one topic
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.handle.subscribe(topic)
    }

    /// Shutdown the runtime gracefully
    ///
    /// The worker stops once every handle clone has been dropped.
    pub async fn shutdown(self) -> Result<()> {
        drop(self.handle);
        self.worker_handle.await.map_err(RuntimeError::WorkerJoin)
    }
}

/// Builder for [`Runtime`] with flexible configuration.
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    catalog: Option<RoleCatalog>,
    store: Option<Arc<dyn GameStore>>,
    state: Option<GameState>,
}

impl RuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            catalog: None,
            store: None,
            state: None,
        }
    }

    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Role catalog for new games (default: the built-in roles)
    pub fn catalog(mut self, catalog: RoleCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Store to persist into and restore from (default: in-memory)
    pub fn store(mut self, store: Arc<dyn GameStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Start from this state instead of the stored snapshot
    pub fn initial_state(mut self, state: GameState) -> Self {
        self.state = Some(state);
        self
    }

    /// Build the runtime
    ///
    /// Without an explicit initial state the last stored snapshot is restored.
    /// A game that was dealt keeps the catalog it was dealt under; a lobby
    /// picks up the configured one.
    pub async fn build(self) -> Result<Runtime> {
        let store = self
            .store
            .unwrap_or_else(|| Arc::new(InMemoryStore::new()) as Arc<dyn GameStore>);
        let configured = self.catalog.unwrap_or_default();

        let (state, catalog) = match self.state {
            Some(state) => (state, configured),
            None => match store.load().await.map_err(RuntimeError::Restore)? {
                Some(snapshot) => {
                    let state = snapshot.restore().map_err(RuntimeError::Restore)?;
                    let catalog = match state.phase {
                        Phase::Lobby => configured,
                        _ => snapshot.catalog().unwrap_or(configured),
                    };
                    info!(
                        target: "runtime",
                        revision = state.revision,
                        phase = %state.phase.kind(),
                        players = state.roster.len(),
                        "restored stored lobby"
                    );
                    (state, catalog)
                }
                None => (GameState::new(), configured),
            },
        };

        let rng = match self.config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::seed_from_u64(rand::random()),
        };

        let (command_tx, command_rx) = mpsc::channel::<Command>(self.config.command_buffer_size);
        let event_bus = EventBus::with_capacity(self.config.event_buffer_size);
        let handle = RuntimeHandle::new(command_tx, event_bus.clone());

        let worker = EngineWorker::new(
            state,
            catalog,
            self.config.game_config,
            rng,
            store,
            self.config.outbox_capacity,
            command_rx,
            event_bus,
        );

        let worker_handle = tokio::spawn(async move {
            worker.run().await;
        });

        Ok(Runtime {
            handle,
            worker_handle,
        })
    }
}
