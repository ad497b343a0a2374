//! Executed-command ledger.
//!
//! A dispatch command runs at most once per `(role, action, argument
//! signature)` key per run. Modes that scope keys per judicial cycle append
//! the cycle number, so the same command may run again after a new ruling.

use crate::role::Role;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommandKey(String);

impl CommandKey {
    pub fn new(role: Role, action: &str, argument_signature: &str, cycle: Option<u32>) -> Self {
        match cycle {
            Some(cycle) => Self(format!(
                "{}|{}|{}|cycle:{}",
                role, action, argument_signature, cycle
            )),
            None => Self(format!("{}|{}|{}", role, action, argument_signature)),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommandLedger {
    executed: BTreeSet<CommandKey>,
}

impl CommandLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `key`. Returns `false` if it was already executed.
    pub fn claim(&mut self, key: CommandKey) -> bool {
        self.executed.insert(key)
    }

    pub fn contains(&self, key: &CommandKey) -> bool {
        self.executed.contains(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &CommandKey> {
        self.executed.iter()
    }

    pub fn len(&self) -> usize {
        self.executed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.executed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_once_per_key() {
        let mut ledger = CommandLedger::new();
        let key = CommandKey::new(Role::Strategy, "CUT_LOOP", "", None);
        assert!(ledger.claim(key.clone()));
        assert!(!ledger.claim(key));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_cycle_scoped_keys_differ() {
        let mut ledger = CommandLedger::new();
        assert!(ledger.claim(CommandKey::new(Role::Strategy, "CUT_LOOP", "", Some(0))));
        assert!(ledger.claim(CommandKey::new(Role::Strategy, "CUT_LOOP", "", Some(1))));
        assert!(!ledger.claim(CommandKey::new(Role::Strategy, "CUT_LOOP", "", Some(1))));
    }
}
