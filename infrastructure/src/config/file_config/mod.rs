//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! Enum-like fields stay strings here and are parsed when the application
//! configs are built, so one bad value never rejects the whole file.

mod engine;
mod governance;
mod logging;
mod pacing;

pub use engine::{FileEngineConfig, FileLearnedOverride};
pub use governance::FileGovernanceConfig;
pub use logging::FileLoggingConfig;
pub use pacing::FilePacingConfig;

use super::ConfigValidationError;
use serde::{Deserialize, Serialize};
use synod_application::{EngineConfig, PacingConfig};

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Run defaults and routing overlay
    pub engine: FileEngineConfig,
    /// Hook and tracker thresholds
    pub governance: FileGovernanceConfig,
    pub pacing: FilePacingConfig,
    /// Transcript, diagnostic log and artifact locations
    pub logging: FileLoggingConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut issues = self.engine.validate();
        issues.extend(self.governance.validate());
        issues
    }

    /// Build the engine parameters. Invalid enum values fall back to their
    /// defaults; the issues are returned alongside.
    pub fn to_engine_config(&self) -> (EngineConfig, Vec<ConfigValidationError>) {
        let mut issues = Vec::new();
        let (mode, mode_issues) = self.engine.parse_mode();
        issues.extend(mode_issues);
        let (control_mode, control_issues) = self.engine.parse_control_mode();
        issues.extend(control_issues);
        let (generation, generation_issues) = self.engine.parse_generation();
        issues.extend(generation_issues);
        let (learned_override, learned_issues) = self.engine.parse_learned_override();
        issues.extend(learned_issues);

        let governance = &self.governance;
        let config = EngineConfig {
            max_ticks: self.engine.max_ticks,
            mode,
            control_mode,
            generation,
            seed: self.engine.seed,
            idle_plan_limit: governance.idle_plan_limit,
            proposal_confidence: governance.proposal_confidence,
            semantic_loss_threshold: governance.semantic_loss_threshold,
            semantic_mute_ticks: governance.semantic_mute_ticks,
            load: governance.load_limits(),
            breaker: governance.breaker_limits(),
            stall: governance.stall_limits(),
            arbitration: governance.arbitration_limits(),
            learned_override,
            learned_override_enabled: self.engine.learned_override_enabled,
        };
        (config, issues)
    }

    pub fn to_pacing_config(&self) -> PacingConfig {
        self.pacing.to_pacing_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use synod_domain::{ControlMode, GenerationMode, Mode, Role};

    #[test]
    fn test_deserialize_full_config() {
        let toml_str = r#"
[engine]
max_ticks = 120
mode = "assembly"
control_mode = "dynamic"
generation = "offline"
seed = 42
learned_override_enabled = true

[engine.learned_override]
source = "HISTORIAN"
destinations = ["STRATEGY"]

[governance]
density_limit = 12
repeat_threshold = 2

[pacing]
base_interval_ms = 50
watchdog = false

[logging]
dispatch_log = "/tmp/synod.jsonl"
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert!(config.validate().is_empty());

        let (engine, issues) = config.to_engine_config();
        assert!(issues.is_empty());
        assert_eq!(engine.max_ticks, 120);
        assert_eq!(engine.mode, Mode::Assembly);
        assert_eq!(engine.control_mode, ControlMode::Dynamic);
        assert_eq!(engine.generation, GenerationMode::Offline);
        assert_eq!(engine.seed, 42);
        assert_eq!(engine.load.density_limit, 12);
        assert_eq!(engine.arbitration.repeat_threshold, 2);
        assert!(engine.learned_override_enabled);
        assert_eq!(engine.learned_override.unwrap().source, Role::Historian);

        let pacing = config.to_pacing_config();
        assert_eq!(pacing.base_interval_ms, 50);
        assert!(!pacing.watchdog);
        assert_eq!(
            config.logging.dispatch_log.as_deref(),
            Some(std::path::Path::new("/tmp/synod.jsonl"))
        );
    }

    #[test]
    fn test_empty_config_matches_engine_defaults() {
        let config: FileConfig = toml::from_str("").unwrap();
        let (engine, issues) = config.to_engine_config();
        assert!(issues.is_empty());
        assert_eq!(engine, EngineConfig::default());
        assert_eq!(config.to_pacing_config(), PacingConfig::default());
    }

    #[test]
    fn test_invalid_values_fall_back_and_are_reported() {
        let toml_str = r#"
[engine]
max_ticks = 0
mode = "anarchy"
control_mode = "manual"
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.validate().len(), 3);

        let (engine, issues) = config.to_engine_config();
        assert_eq!(issues.len(), 2);
        assert_eq!(engine.mode, Mode::Standard);
        assert_eq!(engine.control_mode, ControlMode::Static);
    }
}
