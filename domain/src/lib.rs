//! Domain layer for synod
//!
//! This crate contains the state and rules of the deliberation network.
//! It has no dependencies on async runtimes, adapters or presentation.
//!
//! # Core Concepts
//!
//! ## Roles and Envelopes
//!
//! A fixed set of [`Role`]s exchange immutable [`Envelope`]s. Each envelope
//! carries an opaque payload from which hooks read [`PayloadSignals`].
//!
//! ## Routing
//!
//! A [`Mode`] selects one of seven preset [`RoutingTable`]s; the
//! [`RoutingProvider`] overlays learned and dynamic routes.
//!
//! ## Governance
//!
//! Load, circuit-breaker, stall, mute and ledger trackers are plain state
//! updated by the dispatch loop. Arbitration and remediation define the
//! sub-protocols for stalemates and ethical rejections.

pub mod arbitration;
pub mod core;
pub mod envelope;
pub mod governance;
pub mod mode;
pub mod remediation;
pub mod role;
pub mod routing;

// Re-export commonly used types
pub use arbitration::{ArbitrationContext, ArbitrationLimits, ArbitrationPhase, ArbitrationState};
pub use core::error::DomainError;
pub use envelope::{
    Envelope, EnvelopeId, LogEntry, NoticeKind, NoticeSeverity, PayloadSignals, Priority,
    SystemNotice, Trace, ValidationOutcome,
};
pub use governance::{
    BreakerLimits, CognitiveLoadGovernor, CommandKey, CommandLedger, ConvergenceStallTracker,
    FeedbackLoop, LoadLimits, LoopResponse, MuteSet, StallLimits, StrategicCircuitBreaker,
    TaskForce, UnmuteCondition,
};
pub use mode::{ControlMode, GenerationMode, Mode};
pub use remediation::{MAX_REMEDIATION_ATTEMPTS, RemediationContext, RemediationStep};
pub use role::Role;
pub use routing::{BroadcastSampler, LearnedOverride, Reroute, RoutingProvider, RoutingTable};
