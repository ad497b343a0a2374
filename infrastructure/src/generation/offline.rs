//! Deterministic offline generator.
//!
//! Produces template payloads per role so a run can proceed without any
//! remote model. Output depends only on the request, which keeps runs
//! reproducible for a given seed and directive.

use async_trait::async_trait;
use serde_json::{Value, json};
use synod_application::ports::generation::{
    GenerationError, GenerationPort, GenerationRequest, Generated,
};
use synod_domain::Role;
use tracing::debug;

/// Longest directive excerpt quoted in a summary
const EXCERPT_CHARS: usize = 60;

/// Template-based [`GenerationPort`] used in offline mode and for dry runs.
#[derive(Debug, Clone, Default)]
pub struct OfflineGenerator {
    /// Every n-th ethics review (by tick) returns FAIL
    ethics_fail_every: Option<u64>,
}

impl OfflineGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make ETHICS reject on ticks divisible by `n`, to exercise remediation.
    pub fn with_ethics_fail_every(mut self, n: u64) -> Self {
        self.ethics_fail_every = (n > 0).then_some(n);
        self
    }

    fn summary(request: &GenerationRequest) -> String {
        let excerpt: String = request.directive.chars().take(EXCERPT_CHARS).collect();
        let ellipsis = if request.directive.chars().count() > EXCERPT_CHARS {
            "..."
        } else {
            ""
        };
        format!(
            "{} on '{}{}' (tick {}, from {})",
            request.role.display_name(),
            excerpt,
            ellipsis,
            request.tick,
            request.envelope.origin()
        )
    }

    fn ethics_verdict(&self, request: &GenerationRequest) -> Value {
        let failing = self
            .ethics_fail_every
            .is_some_and(|n| request.tick % n == 0);
        if failing {
            json!({
                "verdict": "FAIL",
                "reason": format!("Proposal from {} lacks a consent safeguard", request.envelope.origin()),
                "confidence": 0.8,
            })
        } else {
            json!({
                "verdict": "PASS",
                "reason": "No ethical objection",
                "confidence": 0.9,
            })
        }
    }

    fn template(&self, request: &GenerationRequest) -> (&'static str, Value) {
        match request.role {
            Role::Ethics => ("verdict.v1", self.ethics_verdict(request)),
            Role::Judge => (
                "ruling.v1",
                json!({
                    "ruling": { "kind": "CREATIVE_GREENLIT" },
                    "reason": "Creative work may continue under review",
                }),
            ),
            Role::Semantic => (
                "semantic.v1",
                json!({ "semantic_loss": 0.1, "confidence": 0.7 }),
            ),
            Role::Strategy | Role::Planner => (
                "plan.v1",
                json!({ "confidence": 0.6, "impact_score": 0.2 }),
            ),
            Role::Risk => (
                "assessment.v1",
                json!({
                    "confidence": 0.6,
                    "alternative_hypotheses": [
                        { "label": "schedule slip", "probability": 0.2 },
                        { "label": "budget overrun", "probability": 0.1 },
                    ],
                }),
            ),
            _ => ("note.v1", json!({ "confidence": 0.5 })),
        }
    }
}

#[async_trait]
impl GenerationPort for OfflineGenerator {
    async fn generate(&self, request: GenerationRequest) -> Result<Generated, GenerationError> {
        let (schema_id, mut payload) = self.template(&request);
        if let Value::Object(map) = &mut payload {
            map.insert("summary".to_string(), Value::String(Self::summary(&request)));
            if let Some(directive) = &request.one_shot_directive {
                map.insert("addressed".to_string(), Value::String(directive.clone()));
            }
        }
        debug!(role = %request.role, schema = schema_id, "Offline generation");
        Ok(Generated::new(schema_id, payload))
    }
}
