//! Stalemate detection and the arbitration state machine.
//!
//! ```text
//!   NORMAL --(signature seen on N distinct ticks)--> FROZEN
//!   FROZEN --(valid judicial ruling)---------------> NORMAL
//! ```

use crate::envelope::PayloadSignals;
use crate::role::Role;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArbitrationLimits {
    /// Meta loop observations must exceed this confidence
    pub loop_confidence: f64,
    /// Risk hypotheses must exceed this total probability
    pub hypotheses_mass: f64,
    /// Distinct ticks a signature must be seen on to freeze
    pub repeat_threshold: u32,
}

impl Default for ArbitrationLimits {
    fn default() -> Self {
        Self {
            loop_confidence: 0.8,
            hypotheses_mass: 0.7,
            repeat_threshold: 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ArbitrationPhase {
    #[default]
    Normal,
    Frozen,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct SignatureCount {
    count: u32,
    last_tick: u64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ArbitrationState {
    limits: ArbitrationLimits,
    phase: ArbitrationPhase,
    signatures: BTreeMap<String, SignatureCount>,
    cycle: u32,
}

impl ArbitrationState {
    pub fn new(limits: ArbitrationLimits) -> Self {
        Self {
            limits,
            ..Default::default()
        }
    }

    pub fn phase(&self) -> ArbitrationPhase {
        self.phase
    }

    pub fn is_frozen(&self) -> bool {
        self.phase == ArbitrationPhase::Frozen
    }

    /// Completed judicial cycles
    pub fn cycle(&self) -> u32 {
        self.cycle
    }

    /// Stalemate signature carried by a message from `origin`, if any.
    pub fn signature_of(&self, origin: Role, signals: &PayloadSignals) -> Option<String> {
        match origin {
            Role::Meta => signals
                .loop_observation
                .as_ref()
                .filter(|obs| obs.confidence > self.limits.loop_confidence)
                .map(|obs| format!("loop:{}", obs.pattern)),
            Role::Risk if signals.hypotheses_mass() > self.limits.hypotheses_mass => {
                let mut labels: Vec<&str> = signals
                    .alternative_hypotheses
                    .iter()
                    .map(|h| h.label.as_str())
                    .collect();
                labels.sort_unstable();
                Some(format!("hypotheses:{}", labels.join("+")))
            }
            _ => None,
        }
    }

    /// Count `signature` for `tick`. Returns `true` when it reaches the
    /// threshold and the network should freeze.
    pub fn observe(&mut self, signature: &str, tick: u64) -> bool {
        if self.is_frozen() {
            return false;
        }
        let entry = self
            .signatures
            .entry(signature.to_string())
            .or_insert(SignatureCount {
                count: 0,
                last_tick: u64::MAX,
            });
        if entry.last_tick == tick {
            return false;
        }
        entry.count += 1;
        entry.last_tick = tick;
        entry.count >= self.limits.repeat_threshold
    }

    pub fn count_of(&self, signature: &str) -> u32 {
        self.signatures.get(signature).map_or(0, |s| s.count)
    }

    /// Enter FROZEN; signature counts restart for the next episode.
    pub fn freeze(&mut self) {
        self.phase = ArbitrationPhase::Frozen;
        self.signatures.clear();
    }

    /// Leave FROZEN after a ruling, opening a new judicial cycle.
    pub fn release(&mut self) {
        self.phase = ArbitrationPhase::Normal;
        self.cycle += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn meta_loop(confidence: f64) -> PayloadSignals {
        PayloadSignals::extract(&json!({
            "loop_observation": {"pattern": "echo", "confidence": confidence}
        }))
    }

    #[test]
    fn test_signature_requires_role_and_confidence() {
        let state = ArbitrationState::new(ArbitrationLimits::default());
        assert_eq!(
            state.signature_of(Role::Meta, &meta_loop(0.9)),
            Some("loop:echo".to_string())
        );
        assert_eq!(state.signature_of(Role::Meta, &meta_loop(0.8)), None);
        assert_eq!(state.signature_of(Role::Critic, &meta_loop(0.9)), None);
    }

    #[test]
    fn test_risk_hypotheses_signature_is_order_independent() {
        let state = ArbitrationState::new(ArbitrationLimits::default());
        let a = PayloadSignals::extract(&json!({"alternative_hypotheses": [
            {"label": "b", "probability": 0.4}, {"label": "a", "probability": 0.4}
        ]}));
        let b = PayloadSignals::extract(&json!({"alternative_hypotheses": [
            {"label": "a", "probability": 0.5}, {"label": "b", "probability": 0.3}
        ]}));
        assert_eq!(state.signature_of(Role::Risk, &a), state.signature_of(Role::Risk, &b));
        let weak = PayloadSignals::extract(&json!({"alternative_hypotheses": [
            {"label": "a", "probability": 0.7}
        ]}));
        assert_eq!(state.signature_of(Role::Risk, &weak), None);
    }

    #[test]
    fn test_counts_once_per_tick() {
        let mut state = ArbitrationState::new(ArbitrationLimits::default());
        assert!(!state.observe("loop:echo", 1));
        assert!(!state.observe("loop:echo", 1));
        assert!(!state.observe("loop:echo", 2));
        assert_eq!(state.count_of("loop:echo"), 2);
        assert!(state.observe("loop:echo", 3));
    }

    #[test]
    fn test_freeze_and_release_cycle() {
        let mut state = ArbitrationState::new(ArbitrationLimits::default());
        state.observe("x", 1);
        state.freeze();
        assert!(state.is_frozen());
        assert_eq!(state.count_of("x"), 0);
        assert!(!state.observe("x", 2));
        state.release();
        assert_eq!(state.phase(), ArbitrationPhase::Normal);
        assert_eq!(state.cycle(), 1);
    }
}
