//! Durable local snapshot of the application state

use crate::models::AppState;
use anyhow::Result;
use async_trait::async_trait;

pub mod filesystem;
pub mod memory;

pub use filesystem::FilesystemSnapshot;
pub use memory::MemorySnapshot;

/// Trait for snapshot backends
///
/// A backend holds a single keyed blob that is rewritten in full on every save.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Read the stored state; `None` when nothing was ever saved
    async fn load(&self) -> Result<Option<AppState>>;

    /// Replace the stored state
    async fn save(&self, state: &AppState) -> Result<()>;

    /// Remove the stored state
    async fn clear(&self) -> Result<()>;

    /// Get storage backend name
    fn name(&self) -> &'static str;
}
