//! Content generation port
//!
//! Defines the interface to the capability that produces a role's payload.
//! The engine treats generation as opaque and fallible: a failure is
//! recovered locally and never aborts a tick.

use async_trait::async_trait;
use serde_json::Value;
use synod_domain::{Envelope, Mode, Role};
use thiserror::Error;

/// Errors a generation adapter may report
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Generator unavailable: {0}")]
    Unavailable(String),

    #[error("Quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("Malformed output: {0}")]
    Malformed(String),

    #[error("Timeout")]
    Timeout,

    #[error("Other error: {0}")]
    Other(String),
}

/// Everything the generator may use to produce one role's output
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub role: Role,
    pub envelope: Envelope,
    pub online: bool,
    pub tick: u64,
    pub mode: Mode,
    pub directive: String,
    pub max_ticks: u64,
    /// Reframing instruction stored for this role, consumed by this call
    pub one_shot_directive: Option<String>,
}

/// Generated payload and the schema it claims to follow
#[derive(Debug, Clone, PartialEq)]
pub struct Generated {
    pub payload: Value,
    pub schema_id: String,
}

impl Generated {
    pub fn new(schema_id: impl Into<String>, payload: Value) -> Self {
        Self {
            payload,
            schema_id: schema_id.into(),
        }
    }
}

/// Port for producing role payloads
///
/// Implementations live in the infrastructure layer (offline templates,
/// remote models, recorded fixtures).
#[async_trait]
pub trait GenerationPort: Send + Sync {
    async fn generate(&self, request: GenerationRequest) -> Result<Generated, GenerationError>;
}
