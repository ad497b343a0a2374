//! Governance trackers
//!
//! Counters and filters the dispatch loop updates as a side effect of
//! dispatching. Each tracker is plain owned state, serializable so a session
//! snapshot carries it verbatim.
//!
//! | Tracker                     | Watches                          | Reaction                      |
//! |-----------------------------|----------------------------------|-------------------------------|
//! | [`CognitiveLoadGovernor`]   | failure rate, per-tick density   | demote generation, throttle   |
//! | [`StrategicCircuitBreaker`] | hub streak vs. health gain       | mute tactical roles           |
//! | [`ConvergenceStallTracker`] | health variance                  | fire feedback loop, escalate  |
//! | [`MuteSet`] / [`TaskForce`] | eligible destinations            | filter next hops              |
//! | [`CommandLedger`]           | executed command keys            | deduplicate commands          |

pub mod circuit_breaker;
pub mod ledger;
pub mod load;
pub mod mute;
pub mod stall;
pub mod task_force;

pub use circuit_breaker::{BreakerLimits, BreakerTrip, StrategicCircuitBreaker};
pub use ledger::{CommandKey, CommandLedger};
pub use load::{CognitiveLoadGovernor, DensityChange, LoadLimits};
pub use mute::{MuteSet, ReleaseObservation, UnmuteCondition, filter_destinations};
pub use stall::{
    ConvergenceStallTracker, FeedbackLoop, LoopResponse, LoopTrigger, StallLimits, StallOutcome,
};
pub use task_force::TaskForce;
