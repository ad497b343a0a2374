//! Engine configuration from TOML (`[engine]` section)

use crate::config::ConfigValidationError;
use serde::{Deserialize, Serialize};
use synod_domain::{ControlMode, GenerationMode, LearnedOverride, Mode, Role};

/// Raw engine configuration from TOML
///
/// # Example
///
/// ```toml
/// [engine]
/// max_ticks = 200
/// mode = "assembly"          # standard, adaptive, assembly, hierarchical, ...
/// control_mode = "dynamic"   # "static" or "dynamic"
/// generation = "offline"     # "online" or "offline"
/// seed = 7
///
/// [engine.learned_override]
/// source = "HISTORIAN"
/// destinations = ["STRATEGY", "RISK"]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileEngineConfig {
    /// Default tick budget for a run
    pub max_ticks: u64,
    pub mode: String,
    pub control_mode: String,
    pub generation: String,
    /// Seed of the broadcast sampler
    pub seed: u64,
    pub learned_override: Option<FileLearnedOverride>,
    /// The learned override is only applied when enabled
    pub learned_override_enabled: bool,
}

/// Route overlay learned from earlier runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileLearnedOverride {
    pub source: String,
    pub destinations: Vec<String>,
}

impl Default for FileEngineConfig {
    fn default() -> Self {
        Self {
            max_ticks: 200,
            mode: "standard".to_string(),
            control_mode: "static".to_string(),
            generation: "online".to_string(),
            seed: 7,
            learned_override: None,
            learned_override_enabled: false,
        }
    }
}

impl FileEngineConfig {
    /// Parse the mode string, falling back to STANDARD.
    ///
    /// Accepts the preset names and their short aliases ("adv", "explore", ...).
    pub fn parse_mode(&self) -> (Mode, Vec<ConfigValidationError>) {
        match self.mode.parse::<Mode>() {
            Ok(mode) => (mode, vec![]),
            Err(_) => (
                Mode::default(),
                vec![ConfigValidationError::InvalidEnumValue {
                    field: "engine.mode".to_string(),
                    value: self.mode.clone(),
                    valid_values: Mode::ALL.iter().map(|m| m.to_string()).collect(),
                }],
            ),
        }
    }

    pub fn parse_control_mode(&self) -> (ControlMode, Vec<ConfigValidationError>) {
        match self.control_mode.parse::<ControlMode>() {
            Ok(mode) => (mode, vec![]),
            Err(_) => (
                ControlMode::default(),
                vec![ConfigValidationError::InvalidEnumValue {
                    field: "engine.control_mode".to_string(),
                    value: self.control_mode.clone(),
                    valid_values: vec!["static".to_string(), "dynamic".to_string()],
                }],
            ),
        }
    }

    pub fn parse_generation(&self) -> (GenerationMode, Vec<ConfigValidationError>) {
        match self.generation.to_lowercase().as_str() {
            "online" => (GenerationMode::Online, vec![]),
            "offline" => (GenerationMode::Offline, vec![]),
            _ => (
                GenerationMode::default(),
                vec![ConfigValidationError::InvalidEnumValue {
                    field: "engine.generation".to_string(),
                    value: self.generation.clone(),
                    valid_values: vec!["online".to_string(), "offline".to_string()],
                }],
            ),
        }
    }

    /// Parse the learned override. Any unknown role drops the whole override.
    pub fn parse_learned_override(&self) -> (Option<LearnedOverride>, Vec<ConfigValidationError>) {
        let Some(raw) = &self.learned_override else {
            return (None, vec![]);
        };

        let mut issues = Vec::new();
        let source = raw.source.parse::<Role>().map_err(|_| {
            issues.push(ConfigValidationError::UnknownRole {
                field: "engine.learned_override.source".to_string(),
                value: raw.source.clone(),
            })
        });
        let mut destinations = Vec::with_capacity(raw.destinations.len());
        for name in &raw.destinations {
            match name.parse::<Role>() {
                Ok(role) => destinations.push(role),
                Err(_) => issues.push(ConfigValidationError::UnknownRole {
                    field: "engine.learned_override.destinations".to_string(),
                    value: name.clone(),
                }),
            }
        }

        match source {
            Ok(source) if issues.is_empty() => (
                Some(LearnedOverride {
                    source,
                    destinations,
                }),
                issues,
            ),
            _ => (None, issues),
        }
    }

    pub(super) fn validate(&self) -> Vec<ConfigValidationError> {
        let mut issues = Vec::new();
        if self.max_ticks == 0 {
            issues.push(ConfigValidationError::Zero {
                field: "engine.max_ticks",
            });
        }
        issues.extend(self.parse_mode().1);
        issues.extend(self.parse_control_mode().1);
        issues.extend(self.parse_generation().1);
        issues.extend(self.parse_learned_override().1);
        issues
    }
}
