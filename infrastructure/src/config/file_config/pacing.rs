//! Pacing configuration from TOML (`[pacing]` section)

use serde::{Deserialize, Serialize};
use synod_application::PacingConfig;
use synod_application::pacing::{DEFAULT_BASE_INTERVAL_MS, DEFAULT_MAX_REQUESTED_DELAY_MS};

/// Raw pacing configuration
///
/// ```toml
/// [pacing]
/// base_interval_ms = 250
/// max_requested_delay_ms = 60000
/// watchdog = true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilePacingConfig {
    pub base_interval_ms: u64,
    pub max_requested_delay_ms: u64,
    pub watchdog: bool,
}

impl Default for FilePacingConfig {
    fn default() -> Self {
        Self {
            base_interval_ms: DEFAULT_BASE_INTERVAL_MS,
            max_requested_delay_ms: DEFAULT_MAX_REQUESTED_DELAY_MS,
            watchdog: true,
        }
    }
}

impl FilePacingConfig {
    pub fn to_pacing_config(&self) -> PacingConfig {
        PacingConfig::default()
            .with_base_interval_ms(self.base_interval_ms)
            .with_max_requested_delay_ms(self.max_requested_delay_ms)
            .with_watchdog(self.watchdog)
    }
}
