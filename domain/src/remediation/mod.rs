//! Remediation of ethically rejected plans.
//!
//! When the ethics role rejects a plan, the plan is not simply dropped: both
//! advisory roles are consulted first and the plan is resubmitted with their
//! feedback. The context survives retries so attempts are counted against the
//! original message, and the third rejection is terminal.

use crate::envelope::EnvelopeId;
use crate::role::Role;
use crate::role::factions::ADVISORY_ROLES;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Rejections tolerated for one original message (the last is terminal)
pub const MAX_REMEDIATION_ATTEMPTS: u8 = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemediationContext {
    pub attempt: u8,
    pub original_id: EnvelopeId,
    pub reason: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub feedback: BTreeMap<Role, String>,
}

/// What to do after a rejection
#[derive(Debug, Clone, PartialEq)]
pub enum RemediationStep {
    /// Consult the advisory roles with this context
    Consult(RemediationContext),
    /// Attempts are used up; the run must stop
    Exhausted(RemediationContext),
}

impl RemediationContext {
    /// Context for a new rejection of `rejected`.
    ///
    /// `previous` is the context the rejected envelope carried, if it was
    /// itself a resubmission.
    pub fn on_rejection(
        previous: Option<&RemediationContext>,
        rejected: &EnvelopeId,
        reason: impl Into<String>,
    ) -> RemediationStep {
        let context = RemediationContext {
            attempt: previous.map_or(1, |p| p.attempt.saturating_add(1)),
            original_id: previous.map_or_else(|| rejected.clone(), |p| p.original_id.clone()),
            reason: reason.into(),
            feedback: BTreeMap::new(),
        };
        if context.attempt >= MAX_REMEDIATION_ATTEMPTS {
            RemediationStep::Exhausted(context)
        } else {
            RemediationStep::Consult(context)
        }
    }

    pub fn record_feedback(&mut self, role: Role, feedback: impl Into<String>) {
        if ADVISORY_ROLES.contains(&role) {
            self.feedback.insert(role, feedback.into());
        }
    }

    /// Whether every advisory role has answered.
    pub fn is_complete(&self) -> bool {
        ADVISORY_ROLES.iter().all(|r| self.feedback.contains_key(r))
    }

    /// The same context with the accumulated feedback dropped.
    pub fn without_feedback(&self) -> Self {
        Self {
            feedback: BTreeMap::new(),
            ..self.clone()
        }
    }
}
