//! The closed set of agent roles.

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One agent's analytical specialty in the deliberation network.
///
/// Roles are static: they are never created or destroyed at runtime.
/// Every routing table carries an entry for each of them.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Origin of the initiating directive
    Human,
    Memory,
    Perception,
    Analyst,
    Creative,
    Visionary,
    Narrative,
    Critic,
    Ethics,
    Legal,
    Philosophy,
    Risk,
    Strategy,
    Planner,
    Executor,
    Logistics,
    /// Semantic integrity guard
    Semantic,
    /// Meta-cognition, observes loops in the network
    Meta,
    /// Hub that aggregates and re-broadcasts
    Synthesizer,
    /// Judicial role issuing binding rulings during arbitration
    Judge,
    Economist,
    Historian,
}

impl Role {
    /// All roles in declaration order.
    pub const ALL: [Role; 22] = [
        Role::Human,
        Role::Memory,
        Role::Perception,
        Role::Analyst,
        Role::Creative,
        Role::Visionary,
        Role::Narrative,
        Role::Critic,
        Role::Ethics,
        Role::Legal,
        Role::Philosophy,
        Role::Risk,
        Role::Strategy,
        Role::Planner,
        Role::Executor,
        Role::Logistics,
        Role::Semantic,
        Role::Meta,
        Role::Synthesizer,
        Role::Judge,
        Role::Economist,
        Role::Historian,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Human => "HUMAN",
            Role::Memory => "MEMORY",
            Role::Perception => "PERCEPTION",
            Role::Analyst => "ANALYST",
            Role::Creative => "CREATIVE",
            Role::Visionary => "VISIONARY",
            Role::Narrative => "NARRATIVE",
            Role::Critic => "CRITIC",
            Role::Ethics => "ETHICS",
            Role::Legal => "LEGAL",
            Role::Philosophy => "PHILOSOPHY",
            Role::Risk => "RISK",
            Role::Strategy => "STRATEGY",
            Role::Planner => "PLANNER",
            Role::Executor => "EXECUTOR",
            Role::Logistics => "LOGISTICS",
            Role::Semantic => "SEMANTIC",
            Role::Meta => "META",
            Role::Synthesizer => "SYNTHESIZER",
            Role::Judge => "JUDGE",
            Role::Economist => "ECONOMIST",
            Role::Historian => "HISTORIAN",
        }
    }

    /// Human-readable capability name
    pub fn display_name(&self) -> &'static str {
        match self {
            Role::Human => "Human Directive",
            Role::Memory => "Collective Memory",
            Role::Perception => "Perception",
            Role::Analyst => "Analysis",
            Role::Creative => "Creative Ideation",
            Role::Visionary => "Long-range Vision",
            Role::Narrative => "Narrative Framing",
            Role::Critic => "Critical Review",
            Role::Ethics => "Ethics Board",
            Role::Legal => "Legal Counsel",
            Role::Philosophy => "Philosophy",
            Role::Risk => "Risk Assessment",
            Role::Strategy => "Strategy",
            Role::Planner => "Tactical Planning",
            Role::Executor => "Execution",
            Role::Logistics => "Logistics",
            Role::Semantic => "Semantic Integrity",
            Role::Meta => "Meta-cognition",
            Role::Synthesizer => "Synthesis Hub",
            Role::Judge => "Judiciary",
            Role::Economist => "Economics",
            Role::Historian => "History",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = DomainError;

    /// Parses the canonical identifier, case-insensitively.
    ///
    /// Aliases are resolved separately by [`super::factions::resolve_alias`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace(['-', ' '], "_");
        Role::ALL
            .iter()
            .copied()
            .find(|role| role.as_str() == normalized)
            .ok_or_else(|| DomainError::UnknownRole(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_roles_are_distinct() {
        let mut seen = std::collections::BTreeSet::new();
        for role in Role::ALL {
            assert!(seen.insert(role), "duplicate role {}", role);
        }
        assert_eq!(seen.len(), 22);
    }

    #[test]
    fn test_from_str_roundtrips_canonical_names() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert_eq!("memory".parse::<Role>().unwrap(), Role::Memory);
        assert!("oracle".parse::<Role>().is_err());
    }

    #[test]
    fn test_serde_uses_screaming_case() {
        let json = serde_json::to_string(&Role::Synthesizer).unwrap();
        assert_eq!(json, "\"SYNTHESIZER\"");
        let role: Role = serde_json::from_str("\"JUDGE\"").unwrap();
        assert_eq!(role, Role::Judge);
    }
}
