//! Snapshot persistence port
//!
//! The snapshot container is opaque to the engine; adapters decide the
//! encoding and location.

use crate::engine::EngineSnapshot;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("No snapshot found at {0}")]
    NotFound(String),

    #[error("Incompatible snapshot version {found} (expected {expected})")]
    Version { found: u32, expected: u32 },
}

#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Persist a snapshot; returns its location.
    async fn save(&self, snapshot: &EngineSnapshot) -> Result<String, SnapshotError>;

    /// Load the most recently saved snapshot.
    async fn load(&self) -> Result<EngineSnapshot, SnapshotError>;
}
