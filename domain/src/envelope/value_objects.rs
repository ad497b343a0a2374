//! Envelope value objects

use crate::role::Role;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier of a dispatch envelope
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnvelopeId(String);

impl EnvelopeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Sequential identifier, stable across replays of the same run.
    pub fn sequential(seq: u64) -> Self {
        Self(format!("msg-{:06}", seq))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EnvelopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Scheduling priority of an envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    /// Sort weight: HIGH=3, MEDIUM=2, LOW=1
    pub fn weight(&self) -> f64 {
        match self {
            Priority::High => 3.0,
            Priority::Medium => 2.0,
            Priority::Low => 1.0,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::High => write!(f, "HIGH"),
            Priority::Medium => write!(f, "MEDIUM"),
            Priority::Low => write!(f, "LOW"),
        }
    }
}

/// Provenance of an envelope: its parent and the roles it traversed.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Trace {
    pub parent: Option<EnvelopeId>,
    pub path: Vec<Role>,
}

impl Trace {
    pub fn root(origin: Role) -> Self {
        Self {
            parent: None,
            path: vec![origin],
        }
    }

    /// Derive the trace of a successor produced by `role`.
    pub fn extend(&self, parent: &EnvelopeId, role: Role) -> Self {
        let mut path = self.path.clone();
        path.push(role);
        Self {
            parent: Some(parent.clone()),
            path,
        }
    }
}

/// Result of validating an envelope's payload against its schema
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "status", content = "errors", rename_all = "snake_case")]
pub enum ValidationOutcome {
    #[default]
    NotChecked,
    Valid,
    Invalid(Vec<String>),
}

impl ValidationOutcome {
    pub fn from_result(ok: bool, errors: Vec<String>) -> Self {
        if ok {
            ValidationOutcome::Valid
        } else {
            ValidationOutcome::Invalid(errors)
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationOutcome::Valid)
    }
}
