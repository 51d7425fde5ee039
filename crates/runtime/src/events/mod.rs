//! Topic-based event bus for runtime events.
//!
//! Events are published to specific topics, and consumers subscribe only to
//! the topics they need. Nothing in the game depends on an event being
//! observed; the bus exists for logging, tests, and embedding applications.

mod bus;
mod types;

pub use bus::{Event, EventBus, Topic};
pub use types::{GameEvent, SessionEvent};
