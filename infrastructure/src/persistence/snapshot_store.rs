//! File-backed snapshot store.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use synod_application::ports::snapshot_store::{SnapshotError, SnapshotStore};
use synod_application::{EngineSnapshot, SNAPSHOT_VERSION};
use tracing::{debug, info};

/// Keeps the latest snapshot as one JSON file.
///
/// Writes go to a sibling `.tmp` file that is renamed over the target, so a
/// crash mid-write never leaves a truncated snapshot behind.
pub struct JsonSnapshotStore {
    path: PathBuf,
}

impl JsonSnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SnapshotStore for JsonSnapshotStore {
    async fn save(&self, snapshot: &EngineSnapshot) -> Result<String, SnapshotError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_vec_pretty(snapshot)?;
        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, content).await?;
        tokio::fs::rename(&tmp, &self.path).await?;

        info!(tick = snapshot.tick(), path = %self.path.display(), "Snapshot saved");
        Ok(self.path.display().to_string())
    }

    async fn load(&self) -> Result<EngineSnapshot, SnapshotError> {
        let content = match tokio::fs::read(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(SnapshotError::NotFound(self.path.display().to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        // Check the version before decoding the state, whose shape may differ.
        let header: serde_json::Value = serde_json::from_slice(&content)?;
        let found = header
            .get("version")
            .and_then(serde_json::Value::as_u64)
            .unwrap_or(0) as u32;
        if found != SNAPSHOT_VERSION {
            return Err(SnapshotError::Version {
                found,
                expected: SNAPSHOT_VERSION,
            });
        }

        let snapshot: EngineSnapshot = serde_json::from_value(header)?;
        debug!(tick = snapshot.tick(), "Snapshot loaded");
        Ok(snapshot)
    }
}
