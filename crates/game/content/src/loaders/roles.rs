//! Role catalog loader.

use std::collections::BTreeSet;
use std::path::Path;

use game_core::{NightCapability, RoleCatalog, RoleId, RoleSpec};
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Role catalog structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleCatalogFile {
    pub roles: Vec<RoleSpec>,
}

/// Loader for role catalogs from RON files.
pub struct RoleCatalogLoader;

impl RoleCatalogLoader {
    /// Load a catalog from a RON file.
    pub fn load(path: &Path) -> LoadResult<RoleCatalog> {
        let content = read_file(path)?;
        Self::parse(&content).map_err(|e| {
            anyhow::anyhow!("Failed to parse role catalog RON at {}: {}", path.display(), e)
        })
    }

    /// The catalog shipped with the crate.
    pub fn embedded() -> LoadResult<RoleCatalog> {
        Self::parse(include_str!("../../data/roles.ron"))
    }

    /// Parses and checks a catalog.
    ///
    /// Duplicate role ids are rejected, as is a catalog without a kill-voting
    /// werewolf role or without a village role; no game could start under it.
    pub fn parse(content: &str) -> LoadResult<RoleCatalog> {
        let file: RoleCatalogFile = ron::from_str(content)?;

        let mut seen: BTreeSet<RoleId> = BTreeSet::new();
        for spec in &file.roles {
            if !seen.insert(spec.role_id) {
                anyhow::bail!("role {} is listed twice", spec.role_id);
            }
            if spec.name.trim().is_empty() {
                anyhow::bail!("role {} has an empty name", spec.role_id);
            }
        }
        if !file
            .roles
            .iter()
            .any(|spec| spec.is_werewolf() && spec.night_capability == NightCapability::KillVote)
        {
            anyhow::bail!("catalog has no werewolf role that votes to kill");
        }
        if !file.roles.iter().any(|spec| !spec.is_werewolf()) {
            anyhow::bail!("catalog has no village role");
        }

        tracing::debug!(roles = file.roles.len(), "parsed role catalog");
        Ok(RoleCatalog::from_specs(file.roles))
    }
}
