//! Engine worker that owns the authoritative [`GameState`].
//!
//! Receives commands from [`crate::RuntimeHandle`], executes them through
//! [`GameEngine`], persists the result, and pushes changed projections to
//! every connection. Commands are handled strictly one at a time, so no two
//! commands observe the same state.

use std::sync::Arc;

use rand_chacha::ChaCha8Rng;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

use game_core::{
    CommandError, CommandResult, GameConfig, GameEngine, GameError, GameState, PlayerId,
    Recipient, RoleCatalog, View, project,
};

use crate::api::{Connection, Result, RuntimeError, ServerMessage};
use crate::events::{EventBus, GameEvent, SessionEvent};
use crate::push::PushFanout;
use crate::repository::{GameStore, RepositoryError, StoreSnapshot};
use crate::sessions::{Binding, ConnectionId, SessionRegistry};

/// Commands that can be sent to the engine worker
pub enum Command {
    /// Register a new anonymous connection and open its outbox.
    Connect { reply: oneshot::Sender<Connection> },
    /// Forget a connection; its player (if any) goes offline.
    Disconnect {
        connection: ConnectionId,
        reply: oneshot::Sender<Result<()>>,
    },
    /// Execute a client command on behalf of a connection.
    Submit {
        connection: ConnectionId,
        command: game_core::Command,
        reply: oneshot::Sender<Result<CommandResult>>,
    },
    /// Project the current state for one recipient.
    QueryView {
        recipient: Recipient,
        reply: oneshot::Sender<View>,
    },
    /// Query the current game state (read-only).
    QueryState { reply: oneshot::Sender<GameState> },
}

/// Background task that processes lobby commands.
pub struct EngineWorker {
    state: GameState,
    catalog: RoleCatalog,
    config: GameConfig,
    rng: ChaCha8Rng,
    store: Arc<dyn GameStore>,
    sessions: SessionRegistry,
    push: PushFanout,
    command_rx: mpsc::Receiver<Command>,
    event_bus: EventBus,
}

impl EngineWorker {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        state: GameState,
        catalog: RoleCatalog,
        config: GameConfig,
        rng: ChaCha8Rng,
        store: Arc<dyn GameStore>,
        outbox_capacity: usize,
        command_rx: mpsc::Receiver<Command>,
        event_bus: EventBus,
    ) -> Self {
        info!(
            target: "runtime::worker",
            revision = state.revision,
            phase = %state.phase.kind(),
            players = state.roster.len(),
            roles = catalog.len(),
            "EngineWorker initialized"
        );

        Self {
            state,
            catalog,
            config,
            rng,
            store,
            sessions: SessionRegistry::new(),
            push: PushFanout::new(outbox_capacity),
            command_rx,
            event_bus,
        }
    }

    /// Main worker loop.
    pub async fn run(mut self) {
        loop {
            tokio::select! {
                Some(cmd) = self.command_rx.recv() => {
                    self.handle_command(cmd).await;
                }
                else => break,
            }
        }
        debug!(target: "runtime::worker", "command channel closed, EngineWorker stopping");
    }

    async fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::Connect { reply } => {
                let connection = self.handle_connect();
                if reply.send(connection).is_err() {
                    debug!("Connect reply channel closed (caller dropped)");
                }
            }
            Command::Disconnect { connection, reply } => {
                let result = self.handle_disconnect(connection).await;
                if reply.send(result).is_err() {
                    debug!("Disconnect reply channel closed (caller dropped)");
                }
            }
            Command::Submit {
                connection,
                command,
                reply,
            } => {
                let result = self.handle_submit(connection, command).await;
                if reply.send(result).is_err() {
                    debug!("Submit reply channel closed (caller dropped)");
                }
            }
            Command::QueryView { recipient, reply } => {
                let view = project(&self.state, &self.catalog, &self.config, recipient);
                if reply.send(view).is_err() {
                    debug!("QueryView reply channel closed (caller dropped)");
                }
            }
            Command::QueryState { reply } => {
                if reply.send(self.state.clone()).is_err() {
                    debug!("QueryState reply channel closed (caller dropped)");
                }
            }
        }
    }

    fn handle_connect(&mut self) -> Connection {
        let id = self.sessions.open();
        let outbox = self.push.open(id);
        let view = project(&self.state, &self.catalog, &self.config, Recipient::Anonymous);
        self.push.push_view(id, self.state.revision, view);

        debug!(target: "runtime::worker", connection = %id, "connection opened");
        self.event_bus
            .publish(SessionEvent::Connected { connection: id });
        Connection { id, outbox }
    }

    async fn handle_disconnect(&mut self, connection: ConnectionId) -> Result<()> {
        let binding = self
            .sessions
            .close(connection)
            .ok_or(RuntimeError::UnknownConnection(connection))?;
        self.push.close(connection);

        let player = binding.player();
        debug!(target: "runtime::worker", %connection, ?player, "connection closed");
        self.event_bus
            .publish(SessionEvent::Disconnected { connection, player });

        // A superseded connection was already anonymous; its player stays online.
        if let Some(player) = player {
            self.set_presence(player, false).await;
        }
        Ok(())
    }

    /// Flips a player's presence. Presence follows the transport, so a store
    /// failure here is logged and the in-memory change kept; the next
    /// successful save catches up.
    async fn set_presence(&mut self, player: PlayerId, connected: bool) {
        let from = self.state.phase;
        let changed = GameEngine::new(&mut self.state, &self.catalog, &self.config)
            .set_connected(player, connected);
        if !changed {
            return;
        }
        if let Err(error) = self.persist().await {
            warn!(
                target: "runtime::worker",
                %player,
                connected,
                error = %error,
                "presence change not persisted"
            );
            self.event_bus.publish(GameEvent::StoreFailed {
                revision: self.state.revision,
                error: error.to_string(),
            });
        }
        self.note_phase_change(from);
        self.broadcast();
    }

    async fn handle_submit(
        &mut self,
        connection: ConnectionId,
        command: game_core::Command,
    ) -> Result<CommandResult> {
        let binding = self
            .sessions
            .lookup(connection)
            .ok_or(RuntimeError::UnknownConnection(connection))?;
        let sender = binding.player();
        let action = command.name();

        let before = self.state.clone();
        let outcome = GameEngine::new(&mut self.state, &self.catalog, &self.config).execute(
            sender,
            &command,
            &mut self.rng,
        );
        let result = match outcome {
            Ok(result) => result,
            Err(error) => {
                self.report_rejection(sender, action, &error);
                return Err(error.into());
            }
        };

        let bound = match &result {
            CommandResult::SignedUp { player_id, .. } | CommandResult::LoggedIn { player_id } => {
                Some(*player_id)
            }
            CommandResult::Applied => None,
        };
        // Switching identity on one connection takes the old identity offline.
        if let (Some(player), Binding::Player(previous)) = (bound, binding)
            && previous != player
        {
            GameEngine::new(&mut self.state, &self.catalog, &self.config)
                .set_connected(previous, false);
        }

        if let Err(error) = self.persist().await {
            self.state = before;
            warn!(
                target: "runtime::worker",
                action,
                error = %error,
                "store rejected the write, command rolled back"
            );
            self.event_bus.publish(GameEvent::StoreFailed {
                revision: self.state.revision,
                error: error.to_string(),
            });
            return Err(RuntimeError::StoreUnavailable(error));
        }

        if let Some(player) = bound {
            self.bind(connection, player);
        }

        debug!(
            target: "runtime::worker",
            action,
            player = ?sender,
            revision = self.state.revision,
            "command applied"
        );
        self.event_bus.publish(GameEvent::CommandApplied {
            revision: self.state.revision,
            player: sender.or(bound),
            action: action.to_string(),
        });
        self.note_phase_change(before.phase);
        self.broadcast();
        Ok(result)
    }

    fn report_rejection(&self, sender: Option<PlayerId>, action: &str, error: &CommandError) {
        if error.severity().is_internal() {
            error!(
                target: "runtime::worker",
                action,
                player = ?sender,
                error = %error,
                "command failed on an internal inconsistency"
            );
        } else {
            debug!(
                target: "runtime::worker",
                action,
                player = ?sender,
                code = error.code(),
                "command rejected"
            );
        }
        self.event_bus.publish(GameEvent::CommandRejected {
            player: sender,
            action: action.to_string(),
            code: error.code().to_string(),
        });
    }

    fn bind(&mut self, connection: ConnectionId, player: PlayerId) {
        let rebinding = self.sessions.bind(connection, player);
        self.event_bus
            .publish(SessionEvent::Bound { connection, player });

        if let Some(old) = rebinding.superseded {
            info!(
                target: "runtime::worker",
                %player,
                superseded = %old,
                by = %connection,
                "player logged in elsewhere"
            );
            self.push.send(old, ServerMessage::Superseded);
            self.event_bus.publish(SessionEvent::Superseded {
                connection: old,
                player,
            });
        }
    }

    async fn persist(&self) -> std::result::Result<(), RepositoryError> {
        let snapshot = StoreSnapshot::capture(&self.state, &self.catalog);
        self.store.save(&snapshot).await
    }

    fn note_phase_change(&self, from: game_core::Phase) {
        let to = self.state.phase;
        if from == to {
            return;
        }
        info!(
            target: "runtime::worker",
            from = %from.kind(),
            to = %to.kind(),
            round = to.round(),
            revision = self.state.revision,
            "phase changed"
        );
        self.event_bus.publish(GameEvent::PhaseChanged {
            revision: self.state.revision,
            from: from.kind(),
            to: to.kind(),
            round: to.round(),
        });
    }

    /// Pushes each connection its projection if it changed.
    fn broadcast(&mut self) {
        let revision = self.state.revision;
        let targets: Vec<(ConnectionId, Recipient)> = self
            .sessions
            .iter()
            .map(|(connection, binding)| (connection, binding.recipient()))
            .collect();
        for (connection, recipient) in targets {
            let view = project(&self.state, &self.catalog, &self.config, recipient);
            self.push.push_view(connection, revision, view);
        }
    }
}
