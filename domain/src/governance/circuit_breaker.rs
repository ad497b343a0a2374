//! Strategic circuit breaker.
//!
//! Watches for the hub monopolizing the conversation: a long run of hub
//! dispatches without any strategic role speaking, during which health barely
//! moved, trips the breaker.

use crate::role::Role;
use crate::role::factions::{HUB_ROLE, STRATEGIC_ROLES};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakerLimits {
    /// Hub streak length that must be exceeded
    pub max_hub_streak: u32,
    /// Minimum health gain over the streak to stay closed
    pub min_health_gain: f64,
    /// Ticks the tactical roles stay muted after a trip
    pub mute_ticks: u64,
}

impl Default for BreakerLimits {
    fn default() -> Self {
        Self {
            max_hub_streak: 20,
            min_health_gain: 0.05,
            mute_ticks: 10,
        }
    }
}

/// Trip report
#[derive(Debug, Clone, PartialEq)]
pub struct BreakerTrip {
    pub streak: u32,
    pub health_gain: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StrategicCircuitBreaker {
    limits: BreakerLimits,
    streak: u32,
    health_at_start: Option<f64>,
}

impl StrategicCircuitBreaker {
    pub fn new(limits: BreakerLimits) -> Self {
        Self {
            limits,
            ..Default::default()
        }
    }

    pub fn limits(&self) -> &BreakerLimits {
        &self.limits
    }

    /// Observe one dispatch from `origin` with the current health reading.
    pub fn observe(&mut self, origin: Role, health: f64) -> Option<BreakerTrip> {
        if STRATEGIC_ROLES.contains(&origin) {
            self.reset();
            return None;
        }
        if origin != HUB_ROLE {
            return None;
        }

        let start = *self.health_at_start.get_or_insert(health);
        self.streak += 1;

        let gain = health - start;
        if self.streak > self.limits.max_hub_streak && gain < self.limits.min_health_gain {
            let trip = BreakerTrip {
                streak: self.streak,
                health_gain: gain,
            };
            self.reset();
            return Some(trip);
        }
        None
    }

    pub fn streak(&self) -> u32 {
        self.streak
    }

    fn reset(&mut self) {
        self.streak = 0;
        self.health_at_start = None;
    }
}
