//! Logging and run-artifact locations (`[logging]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw logging configuration
///
/// # Example
///
/// ```toml
/// [logging]
/// dispatch_log = "~/.local/share/synod/dispatch.jsonl"
/// log_dir = "~/.local/share/synod/logs"
/// report_dir = "reports"
/// snapshot_path = ".synod/snapshot.json"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// JSONL dispatch transcript; disabled when unset
    pub dispatch_log: Option<PathBuf>,
    /// Directory for the rolling diagnostic log; disabled when unset
    pub log_dir: Option<PathBuf>,
    /// Directory receiving end-of-run reports
    pub report_dir: PathBuf,
    pub snapshot_path: PathBuf,
}

impl Default for FileLoggingConfig {
    fn default() -> Self {
        Self {
            dispatch_log: None,
            log_dir: None,
            report_dir: PathBuf::from("reports"),
            snapshot_path: PathBuf::from(".synod").join("snapshot.json"),
        }
    }
}

impl FileLoggingConfig {
    /// Expand a leading `~/` against the home directory.
    pub fn expand(path: &std::path::Path) -> PathBuf {
        match path.strip_prefix("~") {
            Ok(rest) => dirs::home_dir()
                .map(|home| home.join(rest))
                .unwrap_or_else(|| path.to_path_buf()),
            Err(_) => path.to_path_buf(),
        }
    }
}
