//! File-based store.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use super::{GameStore, RepositoryError, Result, StoreSnapshot};

/// Stores the snapshot as one bincode file.
///
/// Saves go to `<path>.tmp` first and are renamed over the real file, so a
/// crash mid-write leaves the previous snapshot intact.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Create a store at `path`, creating its parent directory.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).await?;
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_os_string();
        name.push(".tmp");
        PathBuf::from(name)
    }
}

#[async_trait]
impl GameStore for FileStore {
    async fn load(&self) -> Result<Option<StoreSnapshot>> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(error) => return Err(error.into()),
        };
        let snapshot: StoreSnapshot = bincode::deserialize(&bytes)
            .map_err(|e| RepositoryError::Serialization(e.to_string()))?;

        tracing::debug!(
            revision = snapshot.game.revision,
            "Loaded snapshot from {}",
            self.path.display()
        );
        Ok(Some(snapshot))
    }

    async fn save(&self, snapshot: &StoreSnapshot) -> Result<()> {
        let bytes = bincode::serialize(snapshot)
            .map_err(|e| RepositoryError::Serialization(e.to_string()))?;

        let temp_path = self.temp_path();
        fs::write(&temp_path, bytes).await?;
        fs::rename(&temp_path, &self.path).await?;

        tracing::trace!(
            revision = snapshot.game.revision,
            "Saved snapshot to {}",
            self.path.display()
        );
        Ok(())
    }
}
