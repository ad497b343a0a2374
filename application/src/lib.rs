//! Application layer for synod
//!
//! This crate contains the dispatch engine, port definitions, pacing and the
//! session use case. It depends only on the domain layer.

pub mod config;
pub mod engine;
pub mod pacing;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::EngineConfig;
pub use engine::{
    Engine, EngineError, EngineSnapshot, FALLBACK_SCHEMA, SNAPSHOT_VERSION, SessionStatus, TickOutcome,
    TickSummary,
};
pub use pacing::{PacingConfig, ReentryPacer};
pub use ports::{
    dispatch_logger::{DispatchEvent, DispatchLogger, NoDispatchLogger},
    generation::{GenerationError, GenerationPort, GenerationRequest, Generated},
    health_probe::{ConstantHealth, HealthProbe, HealthReading},
    report::{NoReport, ReportError, ReportPort, ReportReason, ReportRequest},
    session_observer::{NoObserver, SessionObserver},
    snapshot_store::{SnapshotError, SnapshotStore},
    validation::{AcceptAll, ValidationPort, ValidationReport},
};
pub use use_cases::run_session::{
    SessionCommand, SessionError, SessionHandle, SessionOutcome, SessionRunner, SessionView,
};
