//! Content factory for loading every data file from one directory.

use std::path::{Path, PathBuf};

use game_core::{GameConfig, RoleCatalog};

use crate::loaders::{ConfigLoader, LoadResult, RoleCatalogLoader};

/// Content factory that loads game content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── roles.ron
/// └── rules.toml
/// ```
///
/// Missing files fall back to the built-in catalog and default rules.
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Load the role catalog from `roles.ron`.
    pub fn load_roles(&self) -> LoadResult<RoleCatalog> {
        let path = self.data_dir.join("roles.ron");
        if !path.exists() {
            tracing::info!(path = %path.display(), "no role catalog file, using built-in roles");
            return Ok(RoleCatalog::standard());
        }
        RoleCatalogLoader::load(&path)
    }

    /// Load game rules from `rules.toml`.
    pub fn load_rules(&self) -> LoadResult<GameConfig> {
        let path = self.data_dir.join("rules.toml");
        if !path.exists() {
            tracing::info!(path = %path.display(), "no rules file, using default rules");
            return Ok(GameConfig::default());
        }
        ConfigLoader::load(&path)
    }
}
