//! Feedback loops and the convergence-stall tracker.
//!
//! While at least one feedback loop is active, the tracker samples health once
//! per tick. A near-zero variance over the sample window counts as a stall;
//! the first active loop listening for stalls is consumed and its response
//! protocol handed back to the engine. Repeated consecutive stalls escalate.

use crate::mode::Mode;
use crate::role::Role;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Condition a feedback loop listens for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LoopTrigger {
    ConvergenceStall,
}

/// What the engine does when a loop fires
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "protocol", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LoopResponse {
    ForceModeSwitch { mode: Mode },
    InjectDirective { target: Role, instruction: String },
    ExtendTimeline { ticks: u64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackLoop {
    pub name: String,
    pub trigger: LoopTrigger,
    pub response: LoopResponse,
}

impl FeedbackLoop {
    pub fn on_stall(name: impl Into<String>, response: LoopResponse) -> Self {
        Self {
            name: name.into(),
            trigger: LoopTrigger::ConvergenceStall,
            response,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StallLimits {
    /// Health samples considered
    pub window: usize,
    /// Variance below which the run counts as stalled
    pub variance_threshold: f64,
    /// Consecutive stalls that escalate to the meta role
    pub escalate_after: u32,
}

impl Default for StallLimits {
    fn default() -> Self {
        Self {
            window: 10,
            variance_threshold: 0.001,
            escalate_after: 3,
        }
    }
}

/// Result of one per-tick stall check
#[derive(Debug, Clone, PartialEq)]
pub enum StallOutcome {
    /// No loop active, or not enough samples yet
    Inactive,
    Flowing,
    /// Stalled; the consumed loop, if any matched
    Stalled { fired: Option<FeedbackLoop> },
    /// Stalled for the configured number of consecutive ticks
    Escalated { fired: Option<FeedbackLoop> },
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ConvergenceStallTracker {
    limits: StallLimits,
    health_samples: VecDeque<f64>,
    consecutive_stalls: u32,
    loops: Vec<FeedbackLoop>,
}

impl ConvergenceStallTracker {
    pub fn new(limits: StallLimits) -> Self {
        Self {
            limits,
            ..Default::default()
        }
    }

    pub fn register(&mut self, feedback_loop: FeedbackLoop) {
        self.loops.push(feedback_loop);
    }

    pub fn active_loops(&self) -> &[FeedbackLoop] {
        &self.loops
    }

    pub fn consecutive_stalls(&self) -> u32 {
        self.consecutive_stalls
    }

    /// Record this tick's health sample and evaluate stall state.
    pub fn observe(&mut self, health: f64) -> StallOutcome {
        self.health_samples.push_back(health);
        while self.health_samples.len() > self.limits.window {
            self.health_samples.pop_front();
        }

        if self.loops.is_empty() {
            return StallOutcome::Inactive;
        }
        let Some(variance) = self.variance() else {
            return StallOutcome::Inactive;
        };

        if variance >= self.limits.variance_threshold {
            self.consecutive_stalls = 0;
            return StallOutcome::Flowing;
        }

        let fired = self
            .loops
            .iter()
            .position(|l| l.trigger == LoopTrigger::ConvergenceStall)
            .map(|index| self.loops.remove(index));

        self.consecutive_stalls += 1;
        if self.consecutive_stalls >= self.limits.escalate_after {
            self.consecutive_stalls = 0;
            return StallOutcome::Escalated { fired };
        }
        StallOutcome::Stalled { fired }
    }

    /// Population variance over a full window.
    fn variance(&self) -> Option<f64> {
        if self.health_samples.len() < self.limits.window {
            return None;
        }
        let n = self.health_samples.len() as f64;
        let mean = self.health_samples.iter().sum::<f64>() / n;
        let var = self
            .health_samples
            .iter()
            .map(|h| (h - mean).powi(2))
            .sum::<f64>()
            / n;
        Some(var)
    }
}
