//! Orchestration modes.
//!
//! [`Mode`] selects the preset routing table plus the special-case hooks that
//! apply during a run. Hooks dispatch on it by explicit `match`, never on
//! string constants.
//!
//! Two further axes are independent of the preset:
//! - [`ControlMode`] decides whether strategic proposals may reconfigure the run
//! - [`GenerationMode`] decides whether content generation runs online or offline

use crate::core::error::DomainError;
use crate::role::Role;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Routing preset and hook set for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Mode {
    /// Balanced analytical pipeline with feedback through the hub
    #[default]
    Standard,
    /// Semantic guard is central; task-force dead ends are patched
    Adaptive,
    /// Broadcast-centric: the hub samples listeners, arbitration is enabled
    Assembly,
    /// Strategy issues top-down directives
    Hierarchical,
    /// Linear hand-off chain
    Pipeline,
    /// Critics and risk push back on every proposal
    Adversarial,
    /// Creative roles fan out widely
    Exploratory,
}

impl Mode {
    pub const ALL: [Mode; 7] = [
        Mode::Standard,
        Mode::Adaptive,
        Mode::Assembly,
        Mode::Hierarchical,
        Mode::Pipeline,
        Mode::Adversarial,
        Mode::Exploratory,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Standard => "standard",
            Mode::Adaptive => "adaptive",
            Mode::Assembly => "assembly",
            Mode::Hierarchical => "hierarchical",
            Mode::Pipeline => "pipeline",
            Mode::Adversarial => "adversarial",
            Mode::Exploratory => "exploratory",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Mode::Standard => "Standard: analytical pipeline with hub feedback",
            Mode::Adaptive => "Adaptive: semantic guard, task-force patching",
            Mode::Assembly => "Assembly: hub broadcast with judicial arbitration",
            Mode::Hierarchical => "Hierarchical: strategy-led directives",
            Mode::Pipeline => "Pipeline: linear hand-off chain",
            Mode::Adversarial => "Adversarial: critics contest every proposal",
            Mode::Exploratory => "Exploratory: wide creative fan-out",
        }
    }

    /// Whether stalemate detection and judicial arbitration are active.
    pub fn arbitration_enabled(&self) -> bool {
        matches!(self, Mode::Assembly)
    }

    /// Whether the hub's destinations are drawn by the broadcast sampler.
    pub fn samples_broadcast(&self) -> bool {
        matches!(self, Mode::Assembly)
    }

    /// Whether judicial ruling envelopes jump the queue.
    pub fn rulings_jump_queue(&self) -> bool {
        matches!(self, Mode::Assembly)
    }

    /// Whether command keys are scoped per judicial cycle instead of per run.
    pub fn scopes_commands_per_cycle(&self) -> bool {
        matches!(self, Mode::Assembly)
    }

    /// Whether payload-requested reentry delays extend the base interval.
    pub fn honors_requested_delay(&self) -> bool {
        matches!(self, Mode::Assembly | Mode::Exploratory)
    }

    /// Whether semantic loss quarantines roles and dead ends are patched.
    pub fn is_adaptive(&self) -> bool {
        matches!(self, Mode::Adaptive)
    }

    /// Target of the restart envelope after a cut-loop command.
    pub fn restart_target(&self) -> Role {
        match self {
            Mode::Assembly => Role::Synthesizer,
            _ => Role::Planner,
        }
    }

    /// Preferred replacement route for task-force dead ends.
    pub fn dead_end_fallback(&self) -> Option<Role> {
        match self {
            Mode::Adaptive => Some(Role::Synthesizer),
            _ => None,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Mode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "standard" | "default" | "std" => Ok(Mode::Standard),
            "adaptive" | "adapt" => Ok(Mode::Adaptive),
            "assembly" | "broadcast" => Ok(Mode::Assembly),
            "hierarchical" | "hier" => Ok(Mode::Hierarchical),
            "pipeline" | "linear" => Ok(Mode::Pipeline),
            "adversarial" | "adv" => Ok(Mode::Adversarial),
            "exploratory" | "explore" => Ok(Mode::Exploratory),
            _ => Err(DomainError::UnknownMode(s.to_string())),
        }
    }
}

/// Whether strategic proposals may reconfigure the running session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ControlMode {
    #[default]
    Static,
    Dynamic,
}

impl ControlMode {
    pub fn is_dynamic(&self) -> bool {
        matches!(self, ControlMode::Dynamic)
    }
}

impl fmt::Display for ControlMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlMode::Static => write!(f, "static"),
            ControlMode::Dynamic => write!(f, "dynamic"),
        }
    }
}

impl std::str::FromStr for ControlMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "static" => Ok(ControlMode::Static),
            "dynamic" => Ok(ControlMode::Dynamic),
            _ => Err(format!("Invalid ControlMode: {}", s)),
        }
    }
}

/// Whether the generation capability is asked to run online or offline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GenerationMode {
    #[default]
    Online,
    Offline,
}

impl GenerationMode {
    pub fn is_online(&self) -> bool {
        matches!(self, GenerationMode::Online)
    }
}

impl fmt::Display for GenerationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerationMode::Online => write!(f, "online"),
            GenerationMode::Offline => write!(f, "offline"),
        }
    }
}
