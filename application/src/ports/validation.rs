//! Payload validation port

use async_trait::async_trait;
use serde_json::Value;

/// Validation verdict for one payload
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ValidationReport {
    pub ok: bool,
    pub errors: Vec<String>,
}

impl ValidationReport {
    pub fn valid() -> Self {
        Self {
            ok: true,
            errors: Vec::new(),
        }
    }

    pub fn invalid(errors: Vec<String>) -> Self {
        Self { ok: false, errors }
    }
}

/// Port for checking a payload against its declared schema
#[async_trait]
pub trait ValidationPort: Send + Sync {
    async fn validate(&self, schema_id: &str, payload: &Value) -> ValidationReport;
}

/// Validator that accepts every payload
pub struct AcceptAll;

#[async_trait]
impl ValidationPort for AcceptAll {
    async fn validate(&self, _schema_id: &str, _payload: &Value) -> ValidationReport {
        ValidationReport::valid()
    }
}
