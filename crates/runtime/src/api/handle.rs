//! Cloneable façade for issuing commands to the runtime.
//!
//! [`RuntimeHandle`] hides channel plumbing and offers async helpers for
//! opening connections, submitting commands, and streaming events.
use tokio::sync::{broadcast, mpsc, oneshot};

use game_core::{CommandResult, GameState, Recipient, View};

use super::errors::{Result, RuntimeError};
use super::protocol::{ClientMessage, ServerMessage, decode_client};
use crate::events::{Event, EventBus, Topic};
use crate::push::Outbox;
use crate::sessions::ConnectionId;
use crate::workers::Command;

/// A registered connection and the receiving end of its outbox.
///
/// The transport drains `outbox` into the socket and must call
/// [`RuntimeHandle::disconnect`] when the socket closes.
#[derive(Debug)]
pub struct Connection {
    pub id: ConnectionId,
    pub outbox: Outbox,
}

/// Client-facing handle to interact with the runtime
#[derive(Clone)]
pub struct RuntimeHandle {
    command_tx: mpsc::Sender<Command>,
    event_bus: EventBus,
}

impl RuntimeHandle {
    pub(crate) fn new(command_tx: mpsc::Sender<Command>, event_bus: EventBus) -> Self {
        Self {
            command_tx,
            event_bus,
        }
    }

    async fn request<T>(&self, make: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(make(reply_tx))
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    /// Open an anonymous connection. Its current view is already queued.
    pub async fn connect(&self) -> Result<Connection> {
        self.request(|reply| Command::Connect { reply }).await
    }

    /// Close a connection; a bound player is marked disconnected.
    pub async fn disconnect(&self, connection: ConnectionId) -> Result<()> {
        self.request(|reply| Command::Disconnect { connection, reply })
            .await?
    }

    /// Execute a command on behalf of `connection`.
    pub async fn submit(
        &self,
        connection: ConnectionId,
        command: ClientMessage,
    ) -> Result<CommandResult> {
        self.request(|reply| Command::Submit {
            connection,
            command,
            reply,
        })
        .await?
    }

    /// Decode a raw client frame, execute it, and build the reply frame.
    pub async fn submit_text(&self, connection: ConnectionId, text: &str) -> ServerMessage {
        let result = match decode_client(text) {
            Ok(command) => self.submit(connection, command).await,
            Err(error) => Err(error),
        };
        result.into()
    }

    /// Project the current state for `recipient`.
    pub async fn query_view(&self, recipient: Recipient) -> Result<View> {
        self.request(|reply| Command::QueryView { recipient, reply })
            .await
    }

    /// Query the current game state (read-only snapshot)
    pub async fn query_state(&self) -> Result<GameState> {
        self.request(|reply| Command::QueryState { reply }).await
    }

    /// Subscribe to events from a specific topic
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.event_bus.subscribe(topic)
    }

    /// Subscribe to multiple topics at once
    pub fn subscribe_multiple(
        &self,
        topics: &[Topic],
    ) -> std::collections::HashMap<Topic, broadcast::Receiver<Event>> {
        self.event_bus.subscribe_multiple(topics)
    }

    /// Get a reference to the event bus for advanced usage
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }
}
