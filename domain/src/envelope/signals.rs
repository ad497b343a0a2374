//! Payload signals
//!
//! Payloads are opaque JSON produced by the external generation capability.
//! The engine only looks at a handful of well-known optional fields; each is
//! extracted independently so a malformed field never hides the others.

use super::value_objects::Priority;
use crate::governance::mute::UnmuteCondition;
use crate::mode::{GenerationMode, Mode};
use crate::role::Role;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Ethics verdict on a plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    Pass,
    Fail,
}

/// Queue-level command issued by the strategy role
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingCommand {
    pub action: CommandAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommandAction {
    /// Clear the queue and restart from the mode's restart target
    CutLoop,
}

impl CommandAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandAction::CutLoop => "CUT_LOOP",
        }
    }
}

/// Reframing instruction the philosophy role addresses to one role
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intervention {
    pub target: Role,
    pub instruction: String,
}

/// Reconfiguration proposed by a strategic role
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategicProposal {
    #[serde(flatten)]
    pub action: ProposalAction,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProposalAction {
    SwitchMode { mode: Mode },
    ExtendTimeline { ticks: u64 },
    SwitchGeneration { generation: GenerationMode },
    Terminate,
}

impl ProposalAction {
    pub fn name(&self) -> &'static str {
        match self {
            ProposalAction::SwitchMode { .. } => "SWITCH_MODE",
            ProposalAction::ExtendTimeline { .. } => "EXTEND_TIMELINE",
            ProposalAction::SwitchGeneration { .. } => "SWITCH_GENERATION",
            ProposalAction::Terminate => "TERMINATE",
        }
    }

    /// Argument signature used for command deduplication.
    pub fn argument_signature(&self) -> String {
        match self {
            ProposalAction::SwitchMode { mode } => mode.to_string(),
            ProposalAction::ExtendTimeline { ticks } => ticks.to_string(),
            ProposalAction::SwitchGeneration { generation } => generation.to_string(),
            ProposalAction::Terminate => String::new(),
        }
    }
}

/// Loop pattern reported by the meta role
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoopObservation {
    pub pattern: String,
    pub confidence: f64,
}

/// Competing explanation reported by the risk role
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hypothesis {
    pub label: String,
    pub probability: f64,
}

/// Binding decision issued by the judicial role
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Ruling {
    /// Creative faction prevails; named roles step back until released
    CreativeGreenlit {
        #[serde(default)]
        muted: Vec<String>,
        #[serde(default)]
        unmute: Vec<UnmuteCondition>,
        #[serde(default)]
        duration_ticks: Option<u64>,
    },
    /// Supervisory faction prevails; traffic is re-routed and/or directed
    RiskMitigation {
        #[serde(default)]
        reroute: Option<RerouteOrder>,
        #[serde(default)]
        directive: Option<DirectiveOrder>,
    },
    /// A joint task force of named roles takes over
    SynthesisTaskForce {
        #[serde(default)]
        members: Vec<String>,
        #[serde(default)]
        kickoff: Option<String>,
    },
}

impl Ruling {
    pub fn name(&self) -> &'static str {
        match self {
            Ruling::CreativeGreenlit { .. } => "CREATIVE_GREENLIT",
            Ruling::RiskMitigation { .. } => "RISK_MITIGATION",
            Ruling::SynthesisTaskForce { .. } => "SYNTHESIS_TASK_FORCE",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RerouteOrder {
    pub source: String,
    pub destinations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectiveOrder {
    pub target: String,
    pub instruction: String,
}

/// Typed view over the well-known payload fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PayloadSignals {
    pub verdict: Option<Verdict>,
    pub reason: Option<String>,
    pub confidence: Option<f64>,
    pub impact_score: Option<f64>,
    pub priority: Option<Priority>,
    pub command: Option<RoutingCommand>,
    pub intervention: Option<Intervention>,
    pub proposal: Option<StrategicProposal>,
    pub semantic_loss: Option<f64>,
    pub loop_observation: Option<LoopObservation>,
    pub alternative_hypotheses: Vec<Hypothesis>,
    pub ruling: Option<Ruling>,
    pub requested_delay_ms: Option<u64>,
    pub feedback: Option<String>,
}

fn field<T: DeserializeOwned>(payload: &Value, key: &str) -> Option<T> {
    payload
        .get(key)
        .and_then(|value| serde_json::from_value(value.clone()).ok())
}

impl PayloadSignals {
    pub fn extract(payload: &Value) -> Self {
        if !payload.is_object() {
            return Self::default();
        }
        Self {
            verdict: field(payload, "verdict"),
            reason: field(payload, "reason"),
            confidence: field(payload, "confidence"),
            impact_score: field(payload, "impact_score"),
            priority: field(payload, "priority"),
            command: field(payload, "command"),
            intervention: field(payload, "intervention"),
            proposal: field(payload, "proposal"),
            semantic_loss: field(payload, "semantic_loss"),
            loop_observation: field(payload, "loop_observation"),
            alternative_hypotheses: field(payload, "alternative_hypotheses").unwrap_or_default(),
            ruling: field(payload, "ruling"),
            requested_delay_ms: field(payload, "requested_delay_ms"),
            feedback: field(payload, "feedback"),
        }
    }

    /// Sum of the probabilities of all alternative hypotheses.
    pub fn hypotheses_mass(&self) -> f64 {
        self.alternative_hypotheses
            .iter()
            .map(|h| h.probability)
            .sum()
    }
}
