//! Task force: an optional active-role whitelist.

use crate::role::Role;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Roles allowed to receive messages while a task force is active
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TaskForce {
    members: BTreeSet<Role>,
}

impl TaskForce {
    pub fn new(members: impl IntoIterator<Item = Role>) -> Self {
        Self {
            members: members.into_iter().collect(),
        }
    }

    pub fn contains(&self, role: Role) -> bool {
        self.members.contains(&role)
    }

    pub fn members(&self) -> impl Iterator<Item = Role> + '_ {
        self.members.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_members_are_deduplicated_and_ordered() {
        let tf = TaskForce::new([Role::Strategy, Role::Memory, Role::Strategy]);
        assert_eq!(tf.len(), 2);
        assert_eq!(
            tf.members().collect::<Vec<_>>(),
            vec![Role::Memory, Role::Strategy]
        );
    }
}
