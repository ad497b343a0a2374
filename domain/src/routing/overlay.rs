//! Routing overlays and the routing table provider.
//!
//! `resolve(mode)` starts from the preset and applies, in order:
//! 1. one learned override, when enabled and not creating an immediate cycle
//! 2. task-force dead-end patches (adaptive mode only)
//! 3. accumulated dynamic re-routes

use super::table::RoutingTable;
use crate::core::error::DomainError;
use crate::governance::TaskForce;
use crate::mode::Mode;
use crate::role::Role;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Route learned from earlier sessions, replacing one source's destinations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearnedOverride {
    pub source: Role,
    pub destinations: Vec<Role>,
}

impl LearnedOverride {
    /// The override conflicts when a destination already routes back to
    /// its source in the base table.
    pub fn conflict(&self, base: &RoutingTable) -> Option<DomainError> {
        self.destinations
            .iter()
            .find(|dest| base.routes_to(**dest, self.source))
            .map(|dest| DomainError::RoutingConflict {
                source_role: self.source.to_string(),
                destination: dest.to_string(),
            })
    }
}

/// Re-route ordered during the run (e.g. by a risk-mitigation ruling)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reroute {
    pub action: String,
    pub source: Role,
    pub destinations: Vec<Role>,
}

impl Reroute {
    /// Dedup key: (action, source, sorted destinations)
    fn key(&self, cycle: Option<u32>) -> String {
        let mut sorted: Vec<&str> = self.destinations.iter().map(|r| r.as_str()).collect();
        sorted.sort_unstable();
        let base = format!("{}|{}|{}", self.action, self.source, sorted.join(","));
        match cycle {
            Some(cycle) => format!("{}|cycle:{}", base, cycle),
            None => base,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RerouteLedger {
    applied: Vec<Reroute>,
    keys: BTreeSet<String>,
}

impl RerouteLedger {
    /// Record a re-route. Returns `false` for a duplicate.
    pub fn record(&mut self, reroute: Reroute, cycle: Option<u32>) -> bool {
        if !self.keys.insert(reroute.key(cycle)) {
            return false;
        }
        self.applied.push(reroute);
        true
    }

    pub fn applied(&self) -> &[Reroute] {
        &self.applied
    }
}

/// Routing table produced by [`RoutingProvider::resolve`]
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRouting {
    pub table: RoutingTable,
    /// Learned override skipped because it would create a cycle
    pub conflict: Option<DomainError>,
    /// Roles whose routes were patched around task-force dead ends
    pub patched: Vec<Role>,
}

/// Supplies the effective routing table for a mode plus its overlays.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoutingProvider {
    learned: Option<LearnedOverride>,
    learned_enabled: bool,
    reroutes: RerouteLedger,
}

impl RoutingProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_learned_override(mut self, learned: LearnedOverride, enabled: bool) -> Self {
        self.learned = Some(learned);
        self.learned_enabled = enabled;
        self
    }

    pub fn set_learned_enabled(&mut self, enabled: bool) {
        self.learned_enabled = enabled;
    }

    /// Accumulate a re-route; idempotent per key.
    pub fn add_reroute(&mut self, reroute: Reroute, cycle: Option<u32>) -> bool {
        self.reroutes.record(reroute, cycle)
    }

    pub fn reroutes(&self) -> &[Reroute] {
        self.reroutes.applied()
    }

    /// Forget run-scoped overlays, keeping the learned override.
    pub fn clear_run_state(&mut self) {
        self.reroutes = RerouteLedger::default();
    }

    pub fn resolve(&self, mode: Mode, task_force: Option<&TaskForce>) -> ResolvedRouting {
        let mut table = RoutingTable::preset(mode);
        let mut conflict = None;

        if self.learned_enabled
            && let Some(learned) = &self.learned
        {
            match learned.conflict(&table) {
                Some(error) => conflict = Some(error),
                None => table.set_route(learned.source, learned.destinations.clone()),
            }
        }

        let mut patched = Vec::new();
        if let (Some(fallback), Some(tf)) = (mode.dead_end_fallback(), task_force) {
            patched = patch_dead_ends(&mut table, tf, fallback);
        }

        for reroute in self.reroutes.applied() {
            table.set_route(reroute.source, reroute.destinations.clone());
        }

        ResolvedRouting {
            table,
            conflict,
            patched,
        }
    }
}

/// Reroute task-force members whose whole default route leaves the task force.
fn patch_dead_ends(table: &mut RoutingTable, tf: &TaskForce, preferred: Role) -> Vec<Role> {
    let mut patched = Vec::new();
    for member in tf.members() {
        let defaults = table.destinations(member);
        if defaults.is_empty() || defaults.iter().any(|d| tf.contains(*d)) {
            continue;
        }
        let replacement = if preferred != member && tf.contains(preferred) {
            Some(preferred)
        } else {
            tf.members().find(|m| *m != member)
        };
        if let Some(replacement) = replacement {
            table.set_route(member, vec![replacement]);
            patched.push(member);
        }
    }
    patched
}
