//! Dispatch envelope entity

use super::signals::PayloadSignals;
use super::value_objects::{EnvelopeId, Priority, Trace, ValidationOutcome};
use crate::arbitration::ArbitrationContext;
use crate::remediation::RemediationContext;
use crate::role::Role;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One dispatched message carrying a payload and routing metadata.
///
/// Envelopes are immutable once enqueued: every field is private and only the
/// consuming `with_*` builders exist. Re-fan-out goes through
/// [`Envelope::successor`], which clones and extends instead of mutating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    id: EnvelopeId,
    origin: Role,
    destinations: Vec<Role>,
    tick: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sub_tick: Option<u32>,
    priority: Priority,
    schema_id: String,
    payload: Value,
    trace: Trace,
    validation: ValidationOutcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    remediation: Option<RemediationContext>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    arbitration: Option<ArbitrationContext>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    golden_thread: Option<String>,
}

impl Envelope {
    pub fn new(id: EnvelopeId, origin: Role, destinations: Vec<Role>, tick: u64) -> Self {
        Self {
            id,
            origin,
            destinations,
            tick,
            sub_tick: None,
            priority: Priority::default(),
            schema_id: String::new(),
            payload: Value::Null,
            trace: Trace::root(origin),
            validation: ValidationOutcome::NotChecked,
            remediation: None,
            arbitration: None,
            golden_thread: None,
        }
    }

    // ==================== Builder Methods ====================

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_sub_tick(mut self, sub_tick: u32) -> Self {
        self.sub_tick = Some(sub_tick);
        self
    }

    pub fn with_payload(mut self, schema_id: impl Into<String>, payload: Value) -> Self {
        self.schema_id = schema_id.into();
        self.payload = payload;
        self
    }

    pub fn with_trace(mut self, trace: Trace) -> Self {
        self.trace = trace;
        self
    }

    pub fn with_validation(mut self, validation: ValidationOutcome) -> Self {
        self.validation = validation;
        self
    }

    pub fn with_remediation(mut self, context: RemediationContext) -> Self {
        self.remediation = Some(context);
        self
    }

    pub fn with_arbitration(mut self, context: ArbitrationContext) -> Self {
        self.arbitration = Some(context);
        self
    }

    pub fn with_golden_thread(mut self, directive: Option<String>) -> Self {
        self.golden_thread = directive;
        self
    }

    /// Derive the envelope `role` produces after processing this one.
    ///
    /// The trace is extended, the golden thread and priority are inherited.
    pub fn successor(
        &self,
        id: EnvelopeId,
        role: Role,
        destinations: Vec<Role>,
        tick: u64,
        sub_tick: u32,
    ) -> Envelope {
        Envelope::new(id, role, destinations, tick)
            .with_sub_tick(sub_tick)
            .with_priority(self.priority)
            .with_trace(self.trace.extend(&self.id, role))
            .with_golden_thread(self.golden_thread.clone())
    }

    // ==================== Accessors ====================

    pub fn id(&self) -> &EnvelopeId {
        &self.id
    }

    pub fn origin(&self) -> Role {
        self.origin
    }

    pub fn destinations(&self) -> &[Role] {
        &self.destinations
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn sub_tick(&self) -> Option<u32> {
        self.sub_tick
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn schema_id(&self) -> &str {
        &self.schema_id
    }

    pub fn payload(&self) -> &Value {
        &self.payload
    }

    pub fn trace(&self) -> &Trace {
        &self.trace
    }

    pub fn validation(&self) -> &ValidationOutcome {
        &self.validation
    }

    pub fn remediation(&self) -> Option<&RemediationContext> {
        self.remediation.as_ref()
    }

    pub fn arbitration(&self) -> Option<&ArbitrationContext> {
        self.arbitration.as_ref()
    }

    pub fn golden_thread(&self) -> Option<&str> {
        self.golden_thread.as_deref()
    }

    /// Well-known signal fields carried in the payload.
    pub fn signals(&self) -> PayloadSignals {
        PayloadSignals::extract(&self.payload)
    }

    /// Queue ordering key: priority weight plus the payload's impact score.
    pub fn sort_weight(&self) -> f64 {
        let impact = self.payload.get("impact_score").and_then(Value::as_f64);
        self.priority.weight() + impact.unwrap_or(0.0)
    }

    /// Short one-line description for logs.
    pub fn summary(&self) -> String {
        let dests: Vec<&str> = self.destinations.iter().map(|r| r.as_str()).collect();
        format!(
            "{} {} -> [{}] @{} ({})",
            self.id,
            self.origin,
            dests.join(", "),
            self.tick,
            self.priority
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn seed() -> Envelope {
        Envelope::new(EnvelopeId::sequential(0), Role::Human, vec![Role::Memory], 0)
            .with_payload("directive.v1", json!({"text": "build a bridge"}))
            .with_golden_thread(Some("build a bridge".to_string()))
    }

    #[test]
    fn test_successor_inherits_thread_and_priority() {
        let parent = seed().with_priority(Priority::High);
        let child = parent.successor(
            EnvelopeId::sequential(1),
            Role::Memory,
            vec![Role::Analyst],
            1,
            0,
        );
        assert_eq!(child.origin(), Role::Memory);
        assert_eq!(child.priority(), Priority::High);
        assert_eq!(child.golden_thread(), Some("build a bridge"));
        assert_eq!(child.trace().parent.as_ref(), Some(parent.id()));
        assert_eq!(child.trace().path, vec![Role::Human, Role::Memory]);
        assert_eq!(child.sub_tick(), Some(0));
    }

    #[test]
    fn test_sort_weight_adds_impact() {
        let env = seed().with_payload("x", json!({"impact_score": 0.5}));
        assert!((env.sort_weight() - 2.5).abs() < f64::EPSILON);

        let garbled = seed().with_payload("x", json!({"impact_score": "high"}));
        assert!((garbled.sort_weight() - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_serde_roundtrip_preserves_envelope() {
        let env = seed();
        let json = serde_json::to_string(&env).unwrap();
        let back: Envelope = serde_json::from_str(&json).unwrap();
        assert_eq!(back, env);
    }
}
