//! Routing table: role → ordered destination list.

use super::presets::preset_routes;
use crate::mode::Mode;
use crate::role::Role;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Directed graph of who talks to whom.
///
/// Every role has a key, even when its destination list is empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingTable {
    routes: BTreeMap<Role, Vec<Role>>,
}

impl Default for RoutingTable {
    fn default() -> Self {
        Self::empty()
    }
}

impl RoutingTable {
    /// A table where every role routes nowhere.
    pub fn empty() -> Self {
        Self {
            routes: Role::ALL.iter().map(|role| (*role, Vec::new())).collect(),
        }
    }

    /// The unmodified preset table for `mode`.
    pub fn preset(mode: Mode) -> Self {
        let mut table = Self::empty();
        for (source, destinations) in preset_routes(mode) {
            table.set_route(*source, destinations.to_vec());
        }
        table
    }

    pub fn destinations(&self, role: Role) -> &[Role] {
        self.routes.get(&role).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn set_route(&mut self, role: Role, destinations: Vec<Role>) {
        self.routes.insert(role, destinations);
    }

    /// Whether `from` has `to` among its destinations.
    pub fn routes_to(&self, from: Role, to: Role) -> bool {
        self.destinations(from).contains(&to)
    }

    pub fn covers_all_roles(&self) -> bool {
        Role::ALL.iter().all(|role| self.routes.contains_key(role))
    }

    pub fn iter(&self) -> impl Iterator<Item = (Role, &[Role])> {
        self.routes.iter().map(|(role, dests)| (*role, dests.as_slice()))
    }
}
