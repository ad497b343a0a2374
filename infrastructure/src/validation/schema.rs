//! Field-level payload validator.
//!
//! Default implementation of [`ValidationPort`]. Each known schema id maps
//! to a list of required fields and their expected JSON type:
//! - `verdict.v1`: `verdict` is `"PASS"` or `"FAIL"`
//! - `ruling.v1`: `ruling.kind` names one of the three ruling kinds
//! - `semantic.v1`: `semantic_loss` is a number in `[0, 1]`
//! - `summons.v1`, `directive.v1`: `summary` is a string
//!
//! Unknown schema ids are accepted as long as the payload is an object,
//! unless the validator is strict.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use synod_application::ports::validation::{ValidationPort, ValidationReport};

/// Expected shape of one required field
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldKind {
    String,
    Number,
    /// Number in `[0, 1]`
    Probability,
    OneOf(&'static [&'static str]),
    Object,
}

impl FieldKind {
    fn check(&self, value: &Value) -> Result<(), String> {
        match self {
            FieldKind::String if value.is_string() => Ok(()),
            FieldKind::Number if value.is_number() => Ok(()),
            FieldKind::Object if value.is_object() => Ok(()),
            FieldKind::Probability => match value.as_f64() {
                Some(p) if (0.0..=1.0).contains(&p) => Ok(()),
                _ => Err("expected a number in [0, 1]".to_string()),
            },
            FieldKind::OneOf(allowed) => match value.as_str() {
                Some(s) if allowed.contains(&s) => Ok(()),
                _ => Err(format!("expected one of {}", allowed.join(", "))),
            },
            FieldKind::String => Err("expected a string".to_string()),
            FieldKind::Number => Err("expected a number".to_string()),
            FieldKind::Object => Err("expected an object".to_string()),
        }
    }
}

const VERDICTS: &[&str] = &["PASS", "FAIL"];
const RULING_KINDS: &[&str] = &["CREATIVE_GREENLIT", "RISK_MITIGATION", "SYNTHESIS_TASK_FORCE"];

/// Validator checking required fields per schema id.
pub struct FieldSchemaValidator {
    rules: HashMap<String, Vec<(String, FieldKind)>>,
    strict: bool,
}

impl Default for FieldSchemaValidator {
    fn default() -> Self {
        Self::new()
            .with_rule("verdict.v1", &[("verdict", FieldKind::OneOf(VERDICTS))])
            .with_rule(
                "ruling.v1",
                &[
                    ("ruling", FieldKind::Object),
                    ("ruling.kind", FieldKind::OneOf(RULING_KINDS)),
                ],
            )
            .with_rule("semantic.v1", &[("semantic_loss", FieldKind::Probability)])
            .with_rule("summons.v1", &[("summary", FieldKind::String)])
            .with_rule("directive.v1", &[("summary", FieldKind::String)])
    }
}

impl FieldSchemaValidator {
    /// A validator without any rules
    pub fn new() -> Self {
        Self {
            rules: HashMap::new(),
            strict: false,
        }
    }

    /// Require `fields` (dotted paths) for `schema_id`, replacing earlier rules.
    pub fn with_rule(mut self, schema_id: &str, fields: &[(&str, FieldKind)]) -> Self {
        self.rules.insert(
            schema_id.to_string(),
            fields
                .iter()
                .map(|(path, kind)| (path.to_string(), *kind))
                .collect(),
        );
        self
    }

    /// Reject schema ids without a rule
    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    fn check(&self, schema_id: &str, payload: &Value) -> Vec<String> {
        if schema_id.trim().is_empty() {
            return vec!["missing schema id".to_string()];
        }
        if !payload.is_object() {
            return vec![format!("{}: payload must be a JSON object", schema_id)];
        }

        let Some(fields) = self.rules.get(schema_id) else {
            return if self.strict {
                vec![format!("unknown schema '{}'", schema_id)]
            } else {
                Vec::new()
            };
        };

        fields
            .iter()
            .filter_map(|(path, kind)| match lookup(payload, path) {
                None => Some(format!("{}: missing field '{}'", schema_id, path)),
                Some(value) => kind
                    .check(value)
                    .err()
                    .map(|e| format!("{}: field '{}' {}", schema_id, path, e)),
            })
            .collect()
    }
}

fn lookup<'a>(payload: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(payload, |value, key| value.get(key))
}

#[async_trait]
impl ValidationPort for FieldSchemaValidator {
    async fn validate(&self, schema_id: &str, payload: &Value) -> ValidationReport {
        let errors = self.check(schema_id, payload);
        if errors.is_empty() {
            ValidationReport::valid()
        } else {
            ValidationReport::invalid(errors)
        }
    }
}
