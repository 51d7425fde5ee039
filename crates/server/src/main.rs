//! Werewolf lobby server entry point.
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::{info, warn};

use game_content::{ConfigLoader, RoleCatalogLoader};
use game_core::{GameConfig, RoleCatalog};
use runtime::{FileStore, GameStore, InMemoryStore, Runtime, RuntimeConfig};
use werewolf_server::{ServerConfig, logging, serve};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let config = ServerConfig::from_env();
    let _log_guard = logging::init(config.log_dir.as_deref())?;

    let catalog = load_catalog(&config)?;
    let game_config = load_rules(&config)?;
    let store = open_store(&config).await?;

    let mut runtime_config = RuntimeConfig {
        game_config,
        seed: config.seed,
        ..RuntimeConfig::default()
    };
    if let Some(capacity) = config.outbox_capacity {
        runtime_config.outbox_capacity = capacity;
    }

    let runtime = Runtime::builder()
        .config(runtime_config)
        .catalog(catalog)
        .store(store)
        .build()
        .await?;

    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tokio::select! {
        result = serve(listener, runtime.handle()) => result?,
        _ = tokio::signal::ctrl_c() => info!("shutting down"),
    }

    Ok(())
}

fn load_catalog(config: &ServerConfig) -> Result<RoleCatalog> {
    match &config.roles_file {
        Some(path) => RoleCatalogLoader::load(path)
            .with_context(|| format!("failed to load roles from {}", path.display())),
        None => RoleCatalogLoader::embedded(),
    }
}

fn load_rules(config: &ServerConfig) -> Result<GameConfig> {
    let rules = match &config.rules_file {
        Some(path) => ConfigLoader::load(path)
            .with_context(|| format!("failed to load rules from {}", path.display()))?,
        None => GameConfig::default(),
    };

    Ok(match config.disconnect_policy {
        Some(policy) => rules.with_disconnect_policy(policy),
        None => rules,
    })
}

async fn open_store(config: &ServerConfig) -> Result<Arc<dyn GameStore>> {
    let Some(path) = config.resolved_store_path() else {
        warn!("no data directory available, the lobby will not survive a restart");
        return Ok(Arc::new(InMemoryStore::new()));
    };

    info!(path = %path.display(), "using file store");
    let store = FileStore::open(&path)
        .await
        .with_context(|| format!("failed to open store at {}", path.display()))?;
    Ok(Arc::new(store))
}
