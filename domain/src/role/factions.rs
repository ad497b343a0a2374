//! Fixed role groupings used by hooks, governors and arbitration.

use super::entities::Role;

/// Roles whose dispatches break a hub streak.
pub const STRATEGIC_ROLES: [Role; 3] = [Role::Strategy, Role::Risk, Role::Meta];

/// Hub role watched by the strategic circuit breaker.
pub const HUB_ROLE: Role = Role::Synthesizer;

/// Roles muted when the strategic circuit breaker trips.
pub const TACTICAL_ROLES: [Role; 3] = [Role::Planner, Role::Executor, Role::Logistics];

/// Roles forced to LOW priority under message-density throttling.
/// Also the plaintiff faction in arbitration snapshots.
pub const CREATIVE_ROLES: [Role; 3] = [Role::Creative, Role::Visionary, Role::Narrative];

/// Defendant faction in arbitration snapshots.
pub const SUPERVISORY_ROLES: [Role; 3] = [Role::Ethics, Role::Legal, Role::Critic];

/// Roles consulted before an ethically rejected plan is resubmitted.
pub const ADVISORY_ROLES: [Role; 2] = [Role::Legal, Role::Philosophy];

/// Roles muted when semantic loss exceeds its threshold in adaptive mode.
pub const SEMANTIC_QUARANTINE: [Role; 3] = [Role::Creative, Role::Visionary, Role::Narrative];

/// Roles whose strategic proposals are honored under dynamic control.
pub const PROPOSAL_ROLES: [Role; 3] = [Role::Risk, Role::Strategy, Role::Semantic];

/// Static alias table for role names appearing in judicial rulings.
const ALIASES: &[(&str, Role)] = &[
    ("archivist", Role::Memory),
    ("memory_keeper", Role::Memory),
    ("observer", Role::Perception),
    ("analyst", Role::Analyst),
    ("analysis", Role::Analyst),
    ("artist", Role::Creative),
    ("creator", Role::Creative),
    ("ideation", Role::Creative),
    ("futurist", Role::Visionary),
    ("vision", Role::Visionary),
    ("storyteller", Role::Narrative),
    ("reviewer", Role::Critic),
    ("ethicist", Role::Ethics),
    ("ethics_board", Role::Ethics),
    ("lawyer", Role::Legal),
    ("counsel", Role::Legal),
    ("philosopher", Role::Philosophy),
    ("risk_officer", Role::Risk),
    ("risk_assessment", Role::Risk),
    ("strategist", Role::Strategy),
    ("tactician", Role::Planner),
    ("tactical_planning", Role::Planner),
    ("operator", Role::Executor),
    ("execution", Role::Executor),
    ("supply", Role::Logistics),
    ("semantic_integrity", Role::Semantic),
    ("linguist", Role::Semantic),
    ("metacognition", Role::Meta),
    ("meta_cognition", Role::Meta),
    ("synthesis", Role::Synthesizer),
    ("hub", Role::Synthesizer),
    ("judiciary", Role::Judge),
    ("arbiter", Role::Judge),
    ("economics", Role::Economist),
    ("history", Role::Historian),
];

/// Resolves a role reference from free-form ruling text.
///
/// Canonical identifiers win; otherwise the alias table is consulted.
pub fn resolve_alias(name: &str) -> Option<Role> {
    if let Ok(role) = name.parse::<Role>() {
        return Some(role);
    }
    let key = name.trim().to_ascii_lowercase().replace(['-', ' '], "_");
    ALIASES
        .iter()
        .find(|(alias, _)| *alias == key)
        .map(|(_, role)| *role)
}
