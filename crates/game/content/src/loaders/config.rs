//! Game rules loader.

use std::path::Path;

use game_core::GameConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for [`GameConfig`] from TOML files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load rules from a TOML file. Keys the file omits keep their defaults.
    pub fn load(path: &Path) -> LoadResult<GameConfig> {
        let content = read_file(path)?;
        Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse rules TOML at {}: {}", path.display(), e))
    }

    pub fn parse(content: &str) -> LoadResult<GameConfig> {
        let config: GameConfig = toml::from_str(content)?;
        if config.min_players < 2 {
            anyhow::bail!("min_players must be at least 2, got {}", config.min_players);
        }
        if config.max_name_len == 0 {
            anyhow::bail!("max_name_len must be positive");
        }
        Ok(config)
    }
}
