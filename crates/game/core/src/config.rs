/// What the night waits for when an expected actor has no live connection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, strum::EnumString, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case")]
pub enum DisconnectPolicy {
    /// A disconnected expected actor keeps the night open until they return.
    #[default]
    Block,
    /// Once every connected expected actor has acted, disconnected actors
    /// count as "no action".
    SkipDisconnected,
}

/// Game rules and tunable parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GameConfig {
    /// Longest accepted display name, in characters (after trimming).
    pub max_name_len: usize,
    /// Fewest connected players a game may start with.
    pub min_players: usize,
    pub disconnect_policy: DisconnectPolicy,
    /// Allows the host to close the day vote before every living player acted.
    pub host_can_end_vote: bool,
}

impl GameConfig {
    // ===== runtime-tunable defaults =====
    pub const DEFAULT_MAX_NAME_LEN: usize = 24;
    pub const DEFAULT_MIN_PLAYERS: usize = 2;

    pub fn new() -> Self {
        Self {
            max_name_len: Self::DEFAULT_MAX_NAME_LEN,
            min_players: Self::DEFAULT_MIN_PLAYERS,
            disconnect_policy: DisconnectPolicy::Block,
            host_can_end_vote: true,
        }
    }

    pub fn with_disconnect_policy(mut self, policy: DisconnectPolicy) -> Self {
        self.disconnect_policy = policy;
        self
    }

    pub fn with_host_can_end_vote(mut self, enabled: bool) -> Self {
        self.host_can_end_vote = enabled;
        self
    }

    pub fn with_max_name_len(mut self, max_name_len: usize) -> Self {
        self.max_name_len = max_name_len;
        self
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}
