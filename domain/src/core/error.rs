//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Unknown role: {0}")]
    UnknownRole(String),

    #[error("Unknown mode: {0}")]
    UnknownMode(String),

    #[error("Routing conflict: {source_role} -> {destination} already routes back")]
    RoutingConflict {
        source_role: String,
        destination: String,
    },

    #[error("Unresolvable role reference: {0}")]
    UnresolvableRoleReference(String),

    #[error("Task force is empty")]
    EmptyTaskForce,
}

impl DomainError {
    /// Check if this error is recoverable by skipping the offending item
    pub fn is_skippable(&self) -> bool {
        matches!(
            self,
            DomainError::RoutingConflict { .. } | DomainError::UnresolvableRoleReference(_)
        )
    }
}
