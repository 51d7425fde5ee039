#![allow(dead_code)]

use game_core::{
    Command, CommandError, CommandResult, GameConfig, GameEngine, GameState, PlayerId, Recipient,
    RoleCatalog, RoleId, View, project,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// A lobby driven through the engine, the way the runtime drives it.
pub struct Table {
    pub state: GameState,
    pub catalog: RoleCatalog,
    pub config: GameConfig,
    pub rng: ChaCha8Rng,
    pub players: Vec<PlayerId>,
}

impl Table {
    pub fn new(seed: u64) -> Self {
        Self::with_config(seed, GameConfig::default())
    }

    pub fn with_config(seed: u64, config: GameConfig) -> Self {
        Self {
            state: GameState::new(),
            catalog: RoleCatalog::standard(),
            config,
            rng: ChaCha8Rng::seed_from_u64(seed),
            players: Vec::new(),
        }
    }

    pub fn exec(
        &mut self,
        sender: Option<PlayerId>,
        command: Command,
    ) -> Result<CommandResult, CommandError> {
        let mut engine = GameEngine::new(&mut self.state, &self.catalog, &self.config);
        engine.execute(sender, &command, &mut self.rng)
    }

    pub fn act(&mut self, player: PlayerId, command: Command) {
        let name = command.name();
        if let Err(error) = self.exec(Some(player), command) {
            panic!("{name} by {player} rejected: {error}");
        }
    }

    pub fn signup(&mut self, name: &str) -> PlayerId {
        match self.exec(None, Command::Signup { name: name.into() }) {
            Ok(CommandResult::SignedUp { player_id, .. }) => {
                self.players.push(player_id);
                player_id
            }
            other => panic!("signup of {name} failed: {other:?}"),
        }
    }

    pub fn set_role(&mut self, player: PlayerId, role: RoleId, count: u32) {
        for _ in 0..count {
            self.act(
                player,
                Command::UpdateRole {
                    role_id: role.to_string(),
                    delta: 1,
                },
            );
        }
    }

    /// Signs up one player per dealt role and starts the game.
    pub fn start(&mut self, roles: &[(RoleId, u32)]) {
        let total: u32 = roles.iter().map(|(_, count)| count).sum();
        for index in 0..total {
            self.signup(&format!("player{index}"));
        }
        let host = self.players[0];
        for (role, count) in roles {
            self.set_role(host, *role, *count);
        }
        self.act(host, Command::StartGame);
    }

    pub fn with_role(&self, role: RoleId) -> Vec<PlayerId> {
        self.state
            .seats
            .iter()
            .filter(|(_, seat)| seat.role == role)
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn one(&self, role: RoleId) -> PlayerId {
        self.with_role(role)[0]
    }

    pub fn view(&self, player: PlayerId) -> View {
        project(
            &self.state,
            &self.catalog,
            &self.config,
            Recipient::Player(player),
        )
    }

    pub fn set_connected(&mut self, player: PlayerId, connected: bool) -> bool {
        let mut engine = GameEngine::new(&mut self.state, &self.catalog, &self.config);
        engine.set_connected(player, connected)
    }
}
