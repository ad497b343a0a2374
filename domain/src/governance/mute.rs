//! Muted roles and the destination filter.
//!
//! A muted role is temporarily excluded as a destination. A mute may carry an
//! expiry tick, structured release conditions, or both; whichever is met
//! first releases the role.

use super::task_force::TaskForce;
use crate::role::Role;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Condition under which a muted role is released early
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UnmuteCondition {
    /// Release after this many ticks (converted to an expiry when muting)
    Timeout { ticks: u64 },
    /// Release once any role produces a payload with this schema id
    RequiredSchemaSeen { schema_id: String },
    /// Release once any payload reports a confidence above the threshold
    ConfidenceAbove { threshold: f64 },
}

/// Observation a release condition is checked against
#[derive(Debug, Clone, Copy)]
pub struct ReleaseObservation<'a> {
    pub schema_id: &'a str,
    pub confidence: Option<f64>,
}

impl UnmuteCondition {
    fn is_met_by(&self, observation: &ReleaseObservation<'_>) -> bool {
        match self {
            UnmuteCondition::Timeout { .. } => false,
            UnmuteCondition::RequiredSchemaSeen { schema_id } => {
                observation.schema_id == schema_id
            }
            UnmuteCondition::ConfidenceAbove { threshold } => observation
                .confidence
                .is_some_and(|confidence| confidence > *threshold),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MuteEntry {
    /// First tick at which the role is eligible again
    pub until: Option<u64>,
    pub conditions: Vec<UnmuteCondition>,
    pub reason: String,
}

/// Roles currently excluded from destination lists
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MuteSet {
    entries: BTreeMap<Role, MuteEntry>,
}

impl MuteSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mute `role` until tick `until` (exclusive).
    pub fn mute_until(&mut self, role: Role, until: u64, reason: impl Into<String>) {
        self.mute(role, Some(until), Vec::new(), reason);
    }

    /// Mute `role` at `now` with release conditions.
    ///
    /// Timeout conditions become an expiry tick; when several apply the
    /// earliest wins. A mute with neither expiry nor remaining conditions
    /// lasts until explicitly cleared.
    pub fn mute_with_conditions(
        &mut self,
        role: Role,
        now: u64,
        conditions: Vec<UnmuteCondition>,
        reason: impl Into<String>,
    ) {
        let until = conditions
            .iter()
            .filter_map(|c| match c {
                UnmuteCondition::Timeout { ticks } => Some(now.saturating_add(*ticks)),
                _ => None,
            })
            .min();
        let remaining = conditions
            .into_iter()
            .filter(|c| !matches!(c, UnmuteCondition::Timeout { .. }))
            .collect();
        self.mute(role, until, remaining, reason);
    }

    fn mute(
        &mut self,
        role: Role,
        until: Option<u64>,
        conditions: Vec<UnmuteCondition>,
        reason: impl Into<String>,
    ) {
        self.entries.insert(
            role,
            MuteEntry {
                until,
                conditions,
                reason: reason.into(),
            },
        );
    }

    pub fn is_muted(&self, role: Role, tick: u64) -> bool {
        self.entries
            .get(&role)
            .is_some_and(|entry| entry.until.is_none_or(|until| tick < until))
    }

    /// Drop mutes whose expiry has been reached. Returns released roles.
    pub fn expire(&mut self, tick: u64) -> Vec<Role> {
        let expired: Vec<Role> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.until.is_some_and(|until| tick >= until))
            .map(|(role, _)| *role)
            .collect();
        for role in &expired {
            self.entries.remove(role);
        }
        expired
    }

    /// Release every mute with a condition satisfied by `observation`.
    pub fn release_matching(&mut self, observation: &ReleaseObservation<'_>) -> Vec<Role> {
        let released: Vec<Role> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.conditions.iter().any(|c| c.is_met_by(observation)))
            .map(|(role, _)| *role)
            .collect();
        for role in &released {
            self.entries.remove(role);
        }
        released
    }

    pub fn unmute(&mut self, role: Role) -> bool {
        self.entries.remove(&role).is_some()
    }

    pub fn get(&self, role: Role) -> Option<&MuteEntry> {
        self.entries.get(&role)
    }

    pub fn roles(&self) -> impl Iterator<Item = Role> + '_ {
        self.entries.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Intersect candidate destinations with the currently eligible roles.
///
/// Muted roles are removed; when a task force is active, only its members
/// survive. Candidate order is preserved.
pub fn filter_destinations(
    candidates: &[Role],
    mutes: &MuteSet,
    task_force: Option<&TaskForce>,
    tick: u64,
) -> Vec<Role> {
    candidates
        .iter()
        .copied()
        .filter(|role| !mutes.is_muted(*role, tick))
        .filter(|role| task_force.is_none_or(|tf| tf.contains(*role)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_muted_until_tick_is_excluded_before_and_eligible_after() {
        let mut mutes = MuteSet::new();
        mutes.mute_until(Role::Critic, 10, "test");

        let candidates = [Role::Critic, Role::Memory];
        for tick in 0..10 {
            let out = filter_destinations(&candidates, &mutes, None, tick);
            assert_eq!(out, vec![Role::Memory], "tick {}", tick);
        }
        for tick in 10..15 {
            let out = filter_destinations(&candidates, &mutes, None, tick);
            assert_eq!(out, vec![Role::Critic, Role::Memory], "tick {}", tick);
        }
    }

    #[test]
    fn test_expire_releases_at_deadline() {
        let mut mutes = MuteSet::new();
        mutes.mute_until(Role::Planner, 5, "breaker");
        assert!(mutes.expire(4).is_empty());
        assert_eq!(mutes.expire(5), vec![Role::Planner]);
        assert!(mutes.is_empty());
    }

    #[test]
    fn test_huge_timeout_saturates_instead_of_wrapping() {
        let mut mutes = MuteSet::new();
        mutes.mute_with_conditions(
            Role::Critic,
            7,
            vec![UnmuteCondition::Timeout { ticks: u64::MAX }],
            "greenlit",
        );
        assert_eq!(mutes.get(Role::Critic).and_then(|e| e.until), Some(u64::MAX));
        assert!(mutes.is_muted(Role::Critic, 8));
        assert!(mutes.expire(1_000).is_empty());
    }

    #[test]
    fn test_condition_release_on_schema_seen() {
        let mut mutes = MuteSet::new();
        mutes.mute_with_conditions(
            Role::Critic,
            0,
            vec![UnmuteCondition::RequiredSchemaSeen {
                schema_id: "prototype.v1".to_string(),
            }],
            "greenlit",
        );
        assert!(mutes.is_muted(Role::Critic, 1000));

        let other = ReleaseObservation {
            schema_id: "note.v1",
            confidence: None,
        };
        assert!(mutes.release_matching(&other).is_empty());

        let seen = ReleaseObservation {
            schema_id: "prototype.v1",
            confidence: None,
        };
        assert_eq!(mutes.release_matching(&seen), vec![Role::Critic]);
        assert!(!mutes.is_muted(Role::Critic, 1));
    }

    #[test]
    fn test_condition_release_on_confidence() {
        let mut mutes = MuteSet::new();
        mutes.mute_with_conditions(
            Role::Legal,
            3,
            vec![
                UnmuteCondition::Timeout { ticks: 10 },
                UnmuteCondition::ConfidenceAbove { threshold: 0.8 },
            ],
            "greenlit",
        );
        assert_eq!(mutes.get(Role::Legal).unwrap().until, Some(13));

        let low = ReleaseObservation {
            schema_id: "x",
            confidence: Some(0.8),
        };
        assert!(mutes.release_matching(&low).is_empty());
        let high = ReleaseObservation {
            schema_id: "x",
            confidence: Some(0.81),
        };
        assert_eq!(mutes.release_matching(&high), vec![Role::Legal]);
    }

    #[test]
    fn test_task_force_intersection_preserves_order() {
        let mutes = MuteSet::new();
        let tf = TaskForce::new([Role::Strategy, Role::Memory]);
        let out = filter_destinations(
            &[Role::Memory, Role::Critic, Role::Strategy],
            &mutes,
            Some(&tf),
            0,
        );
        assert_eq!(out, vec![Role::Memory, Role::Strategy]);
    }
}
