//! Engine snapshots.

use super::state::RunState;
use super::{Engine, EngineError, SessionStatus};
use serde::{Deserialize, Serialize};
use synod_domain::{LogEntry, Mode, NoticeKind, SystemNotice};
use tracing::info;

/// Bumped whenever the persisted run state changes shape
pub const SNAPSHOT_VERSION: u32 = 1;

/// Opaque, serializable copy of a run.
///
/// Carries the message log, tick, routing overlays and resolved table, task
/// force, mutes, modes, executed-command keys and every governance tracker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSnapshot {
    pub version: u32,
    state: RunState,
}

impl EngineSnapshot {
    pub fn tick(&self) -> u64 {
        self.state.tick
    }

    pub fn mode(&self) -> Mode {
        self.state.mode
    }

    pub fn status(&self) -> SessionStatus {
        self.state.status
    }

    pub fn directive(&self) -> &str {
        &self.state.directive
    }

    pub fn log(&self) -> &[LogEntry] {
        &self.state.log
    }
}

impl Engine {
    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            version: SNAPSHOT_VERSION,
            state: self.state.clone(),
        }
    }

    /// Replace the run with `snapshot`. A restored run is paused; a run that
    /// had already ended stays stopped so it cannot be resumed.
    pub fn restore(&mut self, snapshot: EngineSnapshot) -> Result<(), EngineError> {
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(EngineError::SnapshotVersion {
                found: snapshot.version,
                expected: SNAPSHOT_VERSION,
            });
        }
        self.state = snapshot.state;
        self.state.pending_report = None;
        info!(tick = self.state.tick, mode = %self.state.mode, "Restored snapshot");
        if !matches!(self.state.status, SessionStatus::Idle | SessionStatus::Stopped) {
            self.state.status = SessionStatus::Paused;
        }
        self.observer.on_status(self.state.status);
        self.notice(SystemNotice::info(
            self.state.tick,
            NoticeKind::Lifecycle,
            format!("Snapshot restored at tick {}", self.state.tick),
        ));
        Ok(())
    }
}
