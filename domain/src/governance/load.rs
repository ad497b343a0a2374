//! Cognitive load governor.
//!
//! Two independent guards:
//! - a rolling generation failure rate that demotes online generation
//! - a per-tick message density limit that throttles the creative roles

use crate::envelope::Priority;
use crate::role::Role;
use crate::role::factions::CREATIVE_ROLES;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, VecDeque};

/// Limits applied by [`CognitiveLoadGovernor`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadLimits {
    /// Maximum number of generation samples kept
    pub failure_window: usize,
    /// Samples required before the failure rate is trusted
    pub min_samples: usize,
    /// Failure rate at or above which generation is demoted
    pub failure_rate: f64,
    /// Messages per tick above which the creative roles are throttled
    pub density_limit: usize,
}

impl Default for LoadLimits {
    fn default() -> Self {
        Self {
            failure_window: 20,
            min_samples: 10,
            failure_rate: 0.6,
            density_limit: 20,
        }
    }
}

/// Change in throttling after a density check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DensityChange {
    Unchanged,
    Throttled,
    Released,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CognitiveLoadGovernor {
    limits: LoadLimits,
    tick_message_count: usize,
    samples: VecDeque<bool>,
    throttled: BTreeSet<Role>,
}

impl CognitiveLoadGovernor {
    pub fn new(limits: LoadLimits) -> Self {
        Self {
            limits,
            ..Default::default()
        }
    }

    pub fn begin_tick(&mut self) {
        self.tick_message_count = 0;
    }

    /// Record one generation attempt.
    ///
    /// Returns `true` when the rolling failure rate has reached the limit.
    pub fn record_generation(&mut self, success: bool) -> bool {
        self.samples.push_back(success);
        while self.samples.len() > self.limits.failure_window {
            self.samples.pop_front();
        }
        self.failure_rate()
            .is_some_and(|rate| rate >= self.limits.failure_rate)
    }

    /// Rolling failure rate, once enough samples exist.
    pub fn failure_rate(&self) -> Option<f64> {
        if self.samples.len() < self.limits.min_samples {
            return None;
        }
        let failures = self.samples.iter().filter(|ok| !**ok).count();
        Some(failures as f64 / self.samples.len() as f64)
    }

    /// Count one message produced during the current tick.
    pub fn record_message(&mut self) -> DensityChange {
        self.tick_message_count += 1;
        if self.tick_message_count > self.limits.density_limit && self.throttled.is_empty() {
            self.throttled.extend(CREATIVE_ROLES);
            return DensityChange::Throttled;
        }
        DensityChange::Unchanged
    }

    /// End-of-tick check: lift throttling once density is back under the limit.
    pub fn end_tick(&mut self) -> DensityChange {
        if self.tick_message_count <= self.limits.density_limit && !self.throttled.is_empty() {
            self.throttled.clear();
            return DensityChange::Released;
        }
        DensityChange::Unchanged
    }

    /// Priority after throttling is applied to messages from `role`.
    pub fn effective_priority(&self, role: Role, requested: Priority) -> Priority {
        if self.throttled.contains(&role) {
            Priority::Low
        } else {
            requested
        }
    }

    pub fn is_throttled(&self, role: Role) -> bool {
        self.throttled.contains(&role)
    }

    pub fn tick_message_count(&self) -> usize {
        self.tick_message_count
    }

    /// Forget the failure history (after a demotion took effect).
    pub fn clear_samples(&mut self) {
        self.samples.clear();
    }
}
