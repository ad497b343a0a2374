//! Engine parameters.
//!
//! [`EngineConfig`] groups the static parameters of one engine instance:
//! run defaults, hook thresholds and the limits of every governance tracker.
//! The infrastructure config loader builds it from file and environment
//! sources.

use serde::{Deserialize, Serialize};
use synod_domain::{
    ArbitrationLimits, BreakerLimits, ControlMode, GenerationMode, LearnedOverride, LoadLimits,
    Mode, StallLimits,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Default tick budget when `start` is not given one
    pub max_ticks: u64,
    pub mode: Mode,
    pub control_mode: ControlMode,
    pub generation: GenerationMode,
    /// Seed of the broadcast sampler
    pub seed: u64,
    /// Ticks without an ETHICS pass before STRATEGY is nudged
    pub idle_plan_limit: u64,
    /// Strategic proposals must exceed this confidence
    pub proposal_confidence: f64,
    /// Semantic loss above which the quarantine is muted
    pub semantic_loss_threshold: f64,
    pub semantic_mute_ticks: u64,
    pub load: LoadLimits,
    pub breaker: BreakerLimits,
    pub stall: StallLimits,
    pub arbitration: ArbitrationLimits,
    pub learned_override: Option<LearnedOverride>,
    pub learned_override_enabled: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_ticks: 200,
            mode: Mode::default(),
            control_mode: ControlMode::default(),
            generation: GenerationMode::default(),
            seed: 7,
            idle_plan_limit: 40,
            proposal_confidence: 0.9,
            semantic_loss_threshold: 0.7,
            semantic_mute_ticks: 5,
            load: LoadLimits::default(),
            breaker: BreakerLimits::default(),
            stall: StallLimits::default(),
            arbitration: ArbitrationLimits::default(),
            learned_override: None,
            learned_override_enabled: false,
        }
    }
}

impl EngineConfig {
    // ==================== Builder Methods ====================

    pub fn with_max_ticks(mut self, max_ticks: u64) -> Self {
        self.max_ticks = max_ticks;
        self
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_control_mode(mut self, control_mode: ControlMode) -> Self {
        self.control_mode = control_mode;
        self
    }

    pub fn with_generation(mut self, generation: GenerationMode) -> Self {
        self.generation = generation;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_idle_plan_limit(mut self, limit: u64) -> Self {
        self.idle_plan_limit = limit;
        self
    }

    pub fn with_learned_override(mut self, learned: LearnedOverride, enabled: bool) -> Self {
        self.learned_override = Some(learned);
        self.learned_override_enabled = enabled;
        self
    }
}
