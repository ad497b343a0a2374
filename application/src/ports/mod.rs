//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure and presentation adapters
//! must implement.

pub mod dispatch_logger;
pub mod generation;
pub mod health_probe;
pub mod report;
pub mod session_observer;
pub mod snapshot_store;
pub mod validation;
