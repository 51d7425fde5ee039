//! Runtime orchestration for the werewolf lobby.
//!
//! This crate wires the deterministic rules of `game-core` to connections,
//! persistence, and push delivery. Consumers embed [`Runtime`] and drive it
//! through the cloneable [`RuntimeHandle`].
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator and builder
//! - [`api`] exposes the types downstream clients interact with, including
//!   the JSON wire protocol
//! - [`events`] provides the topic-based event bus
//! - [`repository`] holds the Store contract and its implementations
//! - [`sessions`] and [`push`] track connections and their outboxes
//! - `workers` keeps the single-writer engine task internal to the crate
pub mod api;
pub mod events;
pub mod push;
pub mod repository;
pub mod runtime;
pub mod sessions;

mod workers;

pub use api::{ClientMessage, Connection, Result, RuntimeError, RuntimeHandle, ServerMessage};
pub use events::{Event, EventBus, GameEvent, SessionEvent, Topic};
pub use push::Outbox;
pub use repository::{FileStore, GameStore, InMemoryStore, RepositoryError, StoreSnapshot};
pub use runtime::{Runtime, RuntimeBuilder, RuntimeConfig};
pub use sessions::ConnectionId;
