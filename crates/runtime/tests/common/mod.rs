#![allow(dead_code)]

use std::sync::Arc;

use game_core::{Command, CommandResult, PlayerId, RoleId, View};
use runtime::{
    Connection, ConnectionId, GameStore, InMemoryStore, Outbox, Runtime, RuntimeConfig,
    RuntimeHandle, ServerMessage,
};

pub async fn start(store: Arc<dyn GameStore>) -> Runtime {
    let config = RuntimeConfig {
        seed: Some(42),
        ..RuntimeConfig::default()
    };
    Runtime::builder()
        .config(config)
        .store(store)
        .build()
        .await
        .expect("runtime should build")
}

pub async fn start_in_memory() -> (Runtime, Arc<InMemoryStore>) {
    let store = Arc::new(InMemoryStore::new());
    let runtime = start(store.clone()).await;
    (runtime, store)
}

/// One client connection as a transport would hold it.
pub struct Client {
    pub id: ConnectionId,
    pub outbox: Outbox,
    pub player: Option<PlayerId>,
    pub name: String,
    pub token: Option<String>,
}

impl Client {
    pub async fn connect(handle: &RuntimeHandle) -> Self {
        let Connection { id, outbox } = handle.connect().await.expect("connect");
        Self {
            id,
            outbox,
            player: None,
            name: String::new(),
            token: None,
        }
    }

    pub async fn signup(handle: &RuntimeHandle, name: &str) -> Self {
        let mut client = Self::connect(handle).await;
        match handle
            .submit(client.id, Command::Signup { name: name.into() })
            .await
        {
            Ok(CommandResult::SignedUp { player_id, token }) => {
                client.player = Some(player_id);
                client.token = Some(token.expose().to_string());
                client.name = name.to_string();
            }
            other => panic!("signup of {name} failed: {other:?}"),
        }
        client
    }

    pub fn player(&self) -> PlayerId {
        self.player.expect("signed up")
    }

    pub async fn act(&self, handle: &RuntimeHandle, command: Command) {
        let name = command.name();
        if let Err(error) = handle.submit(self.id, command).await {
            panic!("{name} by {:?} rejected: {error}", self.player);
        }
    }

    /// Everything queued so far.
    pub fn drain(&mut self) -> Vec<ServerMessage> {
        let mut frames = Vec::new();
        while let Some(frame) = self.outbox.try_recv() {
            frames.push(frame);
        }
        frames
    }

    /// The newest view queued so far, if any.
    pub fn latest_view(&mut self) -> Option<View> {
        self.drain()
            .into_iter()
            .filter_map(|frame| match frame {
                ServerMessage::View { view, .. } => Some(*view),
                _ => None,
            })
            .next_back()
    }
}

pub async fn set_roles(handle: &RuntimeHandle, host: &Client, roles: &[(RoleId, u32)]) {
    for (role, count) in roles {
        for _ in 0..*count {
            host.act(
                handle,
                Command::UpdateRole {
                    role_id: role.to_string(),
                    delta: 1,
                },
            )
            .await;
        }
    }
}

pub async fn seat_of(handle: &RuntimeHandle, clients: &[Client], role: RoleId) -> usize {
    let state = handle.query_state().await.expect("state");
    clients
        .iter()
        .position(|client| {
            state
                .seat(client.player())
                .is_some_and(|seat| seat.role == role)
        })
        .expect("role dealt")
}
