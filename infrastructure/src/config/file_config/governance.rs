//! Governance thresholds from TOML (`[governance]` section)

use crate::config::ConfigValidationError;
use serde::{Deserialize, Serialize};
use synod_domain::{ArbitrationLimits, BreakerLimits, LoadLimits, StallLimits};

/// Raw governance thresholds
///
/// # Example
///
/// ```toml
/// [governance]
/// proposal_confidence = 0.9
/// density_limit = 20
/// max_hub_streak = 20
/// stall_window = 10
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileGovernanceConfig {
    /// Strategic proposals must exceed this confidence
    pub proposal_confidence: f64,
    pub semantic_loss_threshold: f64,
    pub semantic_mute_ticks: u64,
    /// Ticks without an approved plan before STRATEGY is nudged
    pub idle_plan_limit: u64,

    // Cognitive load
    pub failure_window: usize,
    pub min_samples: usize,
    pub failure_rate: f64,
    pub density_limit: usize,

    // Strategic circuit breaker
    pub max_hub_streak: u32,
    pub min_health_gain: f64,
    pub breaker_mute_ticks: u64,

    // Convergence stall
    pub stall_window: usize,
    pub stall_variance: f64,
    pub stall_escalate_after: u32,

    // Arbitration trigger
    pub loop_confidence: f64,
    pub hypotheses_mass: f64,
    pub repeat_threshold: u32,
}

impl Default for FileGovernanceConfig {
    fn default() -> Self {
        let load = LoadLimits::default();
        let breaker = BreakerLimits::default();
        let stall = StallLimits::default();
        let arbitration = ArbitrationLimits::default();
        Self {
            proposal_confidence: 0.9,
            semantic_loss_threshold: 0.7,
            semantic_mute_ticks: 5,
            idle_plan_limit: 40,
            failure_window: load.failure_window,
            min_samples: load.min_samples,
            failure_rate: load.failure_rate,
            density_limit: load.density_limit,
            max_hub_streak: breaker.max_hub_streak,
            min_health_gain: breaker.min_health_gain,
            breaker_mute_ticks: breaker.mute_ticks,
            stall_window: stall.window,
            stall_variance: stall.variance_threshold,
            stall_escalate_after: stall.escalate_after,
            loop_confidence: arbitration.loop_confidence,
            hypotheses_mass: arbitration.hypotheses_mass,
            repeat_threshold: arbitration.repeat_threshold,
        }
    }
}

impl FileGovernanceConfig {
    pub fn load_limits(&self) -> LoadLimits {
        LoadLimits {
            failure_window: self.failure_window,
            min_samples: self.min_samples,
            failure_rate: self.failure_rate,
            density_limit: self.density_limit,
        }
    }

    pub fn breaker_limits(&self) -> BreakerLimits {
        BreakerLimits {
            max_hub_streak: self.max_hub_streak,
            min_health_gain: self.min_health_gain,
            mute_ticks: self.breaker_mute_ticks,
        }
    }

    pub fn stall_limits(&self) -> StallLimits {
        StallLimits {
            window: self.stall_window,
            variance_threshold: self.stall_variance,
            escalate_after: self.stall_escalate_after,
        }
    }

    pub fn arbitration_limits(&self) -> ArbitrationLimits {
        ArbitrationLimits {
            loop_confidence: self.loop_confidence,
            hypotheses_mass: self.hypotheses_mass,
            repeat_threshold: self.repeat_threshold,
        }
    }

    pub(super) fn validate(&self) -> Vec<ConfigValidationError> {
        let mut issues = Vec::new();

        let probabilities = [
            ("governance.proposal_confidence", self.proposal_confidence),
            ("governance.semantic_loss_threshold", self.semantic_loss_threshold),
            ("governance.failure_rate", self.failure_rate),
            ("governance.loop_confidence", self.loop_confidence),
            ("governance.hypotheses_mass", self.hypotheses_mass),
        ];
        for (field, value) in probabilities {
            if !(0.0..=1.0).contains(&value) {
                issues.push(ConfigValidationError::NotAProbability { field, value });
            }
        }

        let counts = [
            ("governance.failure_window", self.failure_window as u64),
            ("governance.density_limit", self.density_limit as u64),
            ("governance.max_hub_streak", u64::from(self.max_hub_streak)),
            ("governance.stall_window", self.stall_window as u64),
            ("governance.stall_escalate_after", u64::from(self.stall_escalate_after)),
            ("governance.repeat_threshold", u64::from(self.repeat_threshold)),
        ];
        for (field, value) in counts {
            if value == 0 {
                issues.push(ConfigValidationError::Zero { field });
            }
        }

        issues
    }
}
