//! Server configuration structures and loaders.
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use game_core::DisconnectPolicy;

/// Address used when `WEREWOLF_BIND_ADDR` is unset or unparsable.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:7878";

/// Configuration required to bootstrap the server process.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Store file. `None` falls back to the platform data directory.
    pub store_path: Option<PathBuf>,
    pub roles_file: Option<PathBuf>,
    pub rules_file: Option<PathBuf>,
    /// Directory for the rolling log file. Logs go to stderr only when unset.
    pub log_dir: Option<PathBuf>,
    pub seed: Option<u64>,
    pub outbox_capacity: Option<usize>,
    /// Overrides whatever the rules file says.
    pub disconnect_policy: Option<DisconnectPolicy>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            store_path: None,
            roles_file: None,
            rules_file: None,
            log_dir: None,
            seed: None,
            outbox_capacity: None,
            disconnect_policy: None,
        }
    }
}

impl ServerConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `WEREWOLF_BIND_ADDR` - Listen address (default: `127.0.0.1:7878`)
    /// - `WEREWOLF_STORE_PATH` - Store file (default: platform data directory)
    /// - `WEREWOLF_ROLES_FILE` - RON role catalog (default: built-in roles)
    /// - `WEREWOLF_RULES_FILE` - TOML game rules (default: built-in rules)
    /// - `WEREWOLF_LOG_DIR` - Directory for daily log files (default: stderr only)
    /// - `WEREWOLF_SEED` - Fixed RNG seed for role deals (default: random)
    /// - `WEREWOLF_OUTBOX_CAPACITY` - Queued frames per connection (default: 16)
    /// - `WEREWOLF_DISCONNECT_POLICY` - `block` or `skip_disconnected`
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`ServerConfig::from_env`] over an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(addr) = read_var::<SocketAddr>(&lookup, "WEREWOLF_BIND_ADDR") {
            config.bind_addr = addr;
        }

        config.store_path = read_path(&lookup, "WEREWOLF_STORE_PATH");
        config.roles_file = read_path(&lookup, "WEREWOLF_ROLES_FILE");
        config.rules_file = read_path(&lookup, "WEREWOLF_RULES_FILE");
        config.log_dir = read_path(&lookup, "WEREWOLF_LOG_DIR");

        config.seed = read_var::<u64>(&lookup, "WEREWOLF_SEED");

        if let Some(capacity) = read_var::<usize>(&lookup, "WEREWOLF_OUTBOX_CAPACITY") {
            config.outbox_capacity = Some(capacity.max(1));
        }

        config.disconnect_policy =
            read_var::<DisconnectPolicy>(&lookup, "WEREWOLF_DISCONNECT_POLICY");

        config
    }

    /// The store file to use: the configured one, else `lobby.bin` under the
    /// platform data directory.
    pub fn resolved_store_path(&self) -> Option<PathBuf> {
        self.store_path.clone().or_else(|| {
            directories::ProjectDirs::from("", "", "werewolf")
                .map(|dirs| dirs.data_dir().join("lobby.bin"))
        })
    }
}

fn default_bind_addr() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 7878))
}

fn read_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T>
where
    T: FromStr,
{
    lookup(key)?.trim().parse().ok()
}

fn read_path(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<PathBuf> {
    lookup(key)
        .filter(|value| !value.trim().is_empty())
        .map(PathBuf::from)
}
