//! Preset routing tables, one per [`Mode`].

use crate::mode::Mode;
use crate::role::Role::{self, *};

type Routes = &'static [(Role, &'static [Role])];

const STANDARD: Routes = &[
    (Human, &[Memory]),
    (Memory, &[Perception, Analyst]),
    (Perception, &[Analyst, Semantic]),
    (Analyst, &[Strategy, Risk, Critic]),
    (Creative, &[Critic, Synthesizer]),
    (Visionary, &[Creative, Strategy]),
    (Narrative, &[Synthesizer]),
    (Critic, &[Synthesizer]),
    (Ethics, &[Executor]),
    (Legal, &[Ethics]),
    (Philosophy, &[Meta]),
    (Risk, &[Strategy, Ethics]),
    (Strategy, &[Planner, Synthesizer]),
    (Planner, &[Ethics]),
    (Executor, &[Logistics, Synthesizer]),
    (Logistics, &[Memory]),
    (Semantic, &[Meta]),
    (Meta, &[Synthesizer]),
    (Synthesizer, &[Memory, Visionary, Narrative]),
    (Judge, &[]),
    (Economist, &[Risk]),
    (Historian, &[Memory]),
];

const ADAPTIVE: Routes = &[
    (Human, &[Memory, Semantic]),
    (Memory, &[Perception, Analyst]),
    (Perception, &[Semantic, Analyst]),
    (Analyst, &[Strategy, Risk]),
    (Creative, &[Semantic, Critic]),
    (Visionary, &[Creative, Strategy]),
    (Narrative, &[Semantic]),
    (Critic, &[Synthesizer]),
    (Ethics, &[Executor]),
    (Legal, &[Ethics]),
    (Philosophy, &[Meta]),
    (Risk, &[Strategy, Ethics]),
    (Strategy, &[Planner, Semantic]),
    (Planner, &[Ethics]),
    (Executor, &[Logistics, Synthesizer]),
    (Logistics, &[Memory]),
    (Semantic, &[Synthesizer, Meta]),
    (Meta, &[Strategy]),
    (Synthesizer, &[Memory, Visionary, Narrative]),
    (Judge, &[]),
    (Economist, &[Risk]),
    (Historian, &[Memory]),
];

/// The hub's entry here is a fallback; in practice its listeners are sampled.
const ASSEMBLY: Routes = &[
    (Human, &[Memory]),
    (Memory, &[Synthesizer]),
    (Perception, &[Synthesizer]),
    (Analyst, &[Synthesizer]),
    (Creative, &[Synthesizer]),
    (Visionary, &[Synthesizer]),
    (Narrative, &[Synthesizer]),
    (Critic, &[Synthesizer]),
    (Ethics, &[Synthesizer]),
    (Legal, &[Synthesizer]),
    (Philosophy, &[Synthesizer]),
    (Risk, &[Synthesizer, Meta]),
    (Strategy, &[Synthesizer, Planner]),
    (Planner, &[Ethics]),
    (Executor, &[Synthesizer]),
    (Logistics, &[Synthesizer]),
    (Semantic, &[Synthesizer]),
    (Meta, &[Synthesizer]),
    (Synthesizer, &[Creative, Critic, Risk, Meta]),
    (Judge, &[Synthesizer, Strategy]),
    (Economist, &[Synthesizer]),
    (Historian, &[Synthesizer]),
];

const HIERARCHICAL: Routes = &[
    (Human, &[Strategy]),
    (Memory, &[Historian]),
    (Perception, &[Analyst]),
    (Analyst, &[Memory, Economist]),
    (Creative, &[Planner]),
    (Visionary, &[Strategy]),
    (Narrative, &[Synthesizer]),
    (Critic, &[Strategy]),
    (Ethics, &[Executor]),
    (Legal, &[Ethics]),
    (Philosophy, &[Meta]),
    (Risk, &[Strategy]),
    (Strategy, &[Planner, Risk, Analyst]),
    (Planner, &[Ethics, Logistics]),
    (Executor, &[Logistics]),
    (Logistics, &[Strategy]),
    (Semantic, &[Meta]),
    (Meta, &[Strategy]),
    (Synthesizer, &[Strategy]),
    (Judge, &[]),
    (Economist, &[Strategy]),
    (Historian, &[Analyst]),
];

const PIPELINE: Routes = &[
    (Human, &[Memory]),
    (Memory, &[Perception]),
    (Perception, &[Analyst]),
    (Analyst, &[Creative]),
    (Creative, &[Critic]),
    (Visionary, &[Strategy]),
    (Narrative, &[Synthesizer]),
    (Critic, &[Risk]),
    (Ethics, &[Executor]),
    (Legal, &[Ethics]),
    (Philosophy, &[Ethics]),
    (Risk, &[Strategy]),
    (Strategy, &[Planner]),
    (Planner, &[Ethics]),
    (Executor, &[Synthesizer]),
    (Logistics, &[Executor]),
    (Semantic, &[Synthesizer]),
    (Meta, &[Strategy]),
    (Synthesizer, &[Memory]),
    (Judge, &[]),
    (Economist, &[Risk]),
    (Historian, &[Memory]),
];

const ADVERSARIAL: Routes = &[
    (Human, &[Memory, Critic]),
    (Memory, &[Analyst]),
    (Perception, &[Analyst]),
    (Analyst, &[Creative, Critic]),
    (Creative, &[Critic, Risk]),
    (Visionary, &[Critic]),
    (Narrative, &[Critic]),
    (Critic, &[Creative, Synthesizer]),
    (Ethics, &[Executor, Critic]),
    (Legal, &[Ethics, Critic]),
    (Philosophy, &[Critic]),
    (Risk, &[Strategy, Critic]),
    (Strategy, &[Planner, Risk]),
    (Planner, &[Ethics]),
    (Executor, &[Synthesizer]),
    (Logistics, &[Executor]),
    (Semantic, &[Critic]),
    (Meta, &[Synthesizer]),
    (Synthesizer, &[Memory, Visionary]),
    (Judge, &[]),
    (Economist, &[Risk]),
    (Historian, &[Critic]),
];

const EXPLORATORY: Routes = &[
    (Human, &[Memory, Creative]),
    (Memory, &[Historian, Visionary]),
    (Perception, &[Creative]),
    (Analyst, &[Synthesizer]),
    (Creative, &[Visionary, Narrative, Perception]),
    (Visionary, &[Creative, Philosophy]),
    (Narrative, &[Synthesizer]),
    (Critic, &[Synthesizer]),
    (Ethics, &[Executor]),
    (Legal, &[Ethics]),
    (Philosophy, &[Creative, Meta]),
    (Risk, &[Strategy]),
    (Strategy, &[Planner]),
    (Planner, &[Ethics]),
    (Executor, &[Synthesizer]),
    (Logistics, &[Memory]),
    (Semantic, &[Synthesizer]),
    (Meta, &[Strategy]),
    (Synthesizer, &[Memory, Analyst, Economist]),
    (Judge, &[]),
    (Economist, &[Risk]),
    (Historian, &[Narrative]),
];

/// Raw preset routes for `mode`.
pub fn preset_routes(mode: Mode) -> Routes {
    match mode {
        Mode::Standard => STANDARD,
        Mode::Adaptive => ADAPTIVE,
        Mode::Assembly => ASSEMBLY,
        Mode::Hierarchical => HIERARCHICAL,
        Mode::Pipeline => PIPELINE,
        Mode::Adversarial => ADVERSARIAL,
        Mode::Exploratory => EXPLORATORY,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn test_every_preset_lists_each_role_once() {
        for mode in Mode::ALL {
            let sources: Vec<Role> = preset_routes(mode).iter().map(|(r, _)| *r).collect();
            let unique: BTreeSet<Role> = sources.iter().copied().collect();
            assert_eq!(sources.len(), unique.len(), "{} has duplicates", mode);
            assert_eq!(unique.len(), Role::ALL.len(), "{} misses roles", mode);
        }
    }

    #[test]
    fn test_no_preset_routes_to_human_or_self() {
        for mode in Mode::ALL {
            for (source, destinations) in preset_routes(mode) {
                assert!(!destinations.contains(&Human), "{} {}", mode, source);
                assert!(!destinations.contains(source), "{} {}", mode, source);
            }
        }
    }
}
