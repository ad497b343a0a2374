//! Infrastructure layer for synod
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod config;
pub mod generation;
pub mod health;
pub mod logging;
pub mod persistence;
pub mod validation;

// Re-export commonly used types
pub use config::{
    ConfigLoader, ConfigValidationError, FileConfig, FileEngineConfig, FileGovernanceConfig,
    FileLoggingConfig, FilePacingConfig,
};
pub use generation::OfflineGenerator;
pub use health::HeuristicHealthProbe;
pub use logging::JsonlDispatchLogger;
pub use persistence::{JsonReportWriter, JsonSnapshotStore};
pub use validation::{FieldKind, FieldSchemaValidator};
