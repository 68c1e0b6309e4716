//! In-memory snapshot backend

use crate::models::AppState;
use crate::snapshot::SnapshotStore;
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory snapshot backend
///
/// Non-persistent; clones share the same slot, so a second facade built
/// from a clone sees what the first one saved.
#[derive(Clone, Default)]
pub struct MemorySnapshot {
    slot: Arc<RwLock<Option<String>>>,
}

impl MemorySnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with raw JSON in the slot (may be invalid)
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            slot: Arc::new(RwLock::new(Some(raw.into()))),
        }
    }

    /// Raw JSON currently stored
    pub async fn raw(&self) -> Option<String> {
        self.slot.read().await.clone()
    }
}

#[async_trait]
impl SnapshotStore for MemorySnapshot {
    async fn load(&self) -> Result<Option<AppState>> {
        let slot = self.slot.read().await;
        match slot.as_deref() {
            Some(raw) => Ok(Some(serde_json::from_str(raw)?)),
            None => Ok(None),
        }
    }

    async fn save(&self, state: &AppState) -> Result<()> {
        let raw = serde_json::to_string(state)?;
        *self.slot.write().await = Some(raw);
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        *self.slot.write().await = None;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
