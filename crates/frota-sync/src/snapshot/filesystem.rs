//! Filesystem snapshot backend

use crate::config::StorageConfig;
use crate::models::AppState;
use crate::snapshot::SnapshotStore;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Filesystem snapshot backend
///
/// Stores the state as `{dir}/{key}.json`.
#[derive(Clone)]
pub struct FilesystemSnapshot {
    path: PathBuf,
}

impl FilesystemSnapshot {
    /// Create a new filesystem snapshot backend
    pub async fn new(config: &StorageConfig) -> Result<Self> {
        fs::create_dir_all(&config.dir)
            .await
            .context("Failed to create snapshot directory")?;

        Ok(Self {
            path: key_to_path(&config.dir, &config.key),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Get the file path for a snapshot key
fn key_to_path(dir: &Path, key: &str) -> PathBuf {
    // Sanitize key to make it filesystem-safe
    let safe_key = key.replace(['/', '\\', ':'], "_");

    dir.join(format!("{}.json", safe_key))
}

#[async_trait]
impl SnapshotStore for FilesystemSnapshot {
    async fn load(&self) -> Result<Option<AppState>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)
            .await
            .context("Failed to read snapshot file")?;

        let state: AppState = serde_json::from_str(&content)
            .context("Failed to deserialize snapshot")?;

        Ok(Some(state))
    }

    async fn save(&self, state: &AppState) -> Result<()> {
        let json = serde_json::to_string_pretty(state)
            .context("Failed to serialize snapshot")?;

        // Readers only ever see a complete file
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)
            .await
            .context("Failed to write snapshot file")?;
        fs::rename(&tmp, &self.path)
            .await
            .context("Failed to replace snapshot file")?;

        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)
                .await
                .context("Failed to delete snapshot file")?;
        }

        Ok(())
    }

    fn name(&self) -> &'static str {
        "filesystem"
    }
}
