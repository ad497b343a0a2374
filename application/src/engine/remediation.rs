//! Remediation coordinator.
//!
//! An ETHICS rejection sends one advisory copy to each advisory role,
//! addressed from ETHICS. When both have answered, the rejected plan is
//! resubmitted to ETHICS at the queue front with their feedback attached.

use super::Engine;
use crate::ports::report::ReportReason;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use synod_domain::role::factions::ADVISORY_ROLES;
use synod_domain::{
    Envelope, MAX_REMEDIATION_ATTEMPTS, NoticeKind, Priority, RemediationContext,
    RemediationStep, Role, SystemNotice,
};

/// A rejected plan waiting for advisory feedback
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct PendingRemediation {
    pub context: RemediationContext,
    pub rejected: Envelope,
}

impl Engine {
    pub(super) fn reject_plan(&mut self, rejected: &Envelope, reason: String) {
        let tick = self.state.tick;
        match RemediationContext::on_rejection(rejected.remediation(), rejected.id(), reason) {
            RemediationStep::Exhausted(context) => {
                self.state.remediations.remove(&context.original_id);
                self.notice(SystemNotice::critical(
                    tick,
                    NoticeKind::EthicalRejection,
                    format!(
                        "Plan {} rejected {} times ({}); moral override",
                        context.original_id, context.attempt, context.reason
                    ),
                ));
                self.finish(ReportReason::MoralOverride);
            }
            RemediationStep::Consult(context) => {
                self.notice(SystemNotice::warning(
                    tick,
                    NoticeKind::Remediation,
                    format!(
                        "Plan {} rejected (attempt {}/{}): {}; consulting advisors",
                        context.original_id,
                        context.attempt,
                        MAX_REMEDIATION_ATTEMPTS,
                        context.reason
                    ),
                ));
                for advisor in ADVISORY_ROLES {
                    let id = self.next_id();
                    let copy = Envelope::new(id, Role::Ethics, vec![advisor], tick)
                        .with_priority(Priority::High)
                        .with_payload(
                            "remediation.request.v1",
                            json!({
                                "summary": format!("Advise on rejected plan {}", context.original_id),
                                "rejected": rejected.payload(),
                                "reason": context.reason,
                                "attempt": context.attempt,
                            }),
                        )
                        .with_trace(rejected.trace().extend(rejected.id(), Role::Ethics))
                        .with_remediation(context.clone())
                        .with_golden_thread(Some(self.state.directive.clone()));
                    self.record_message(&copy);
                    self.state.queue.push_back(copy);
                }
                self.state.remediations.insert(
                    context.original_id.clone(),
                    PendingRemediation {
                        context,
                        rejected: rejected.clone(),
                    },
                );
            }
        }
    }

    pub(super) fn accept_feedback(
        &mut self,
        context: &RemediationContext,
        advisor: Role,
        feedback: String,
    ) {
        let tick = self.state.tick;
        let Some(pending) = self.state.remediations.get_mut(&context.original_id) else {
            self.notice(SystemNotice::info(
                tick,
                NoticeKind::Remediation,
                format!(
                    "Feedback from {} for {} arrived after remediation closed; ignored",
                    advisor, context.original_id
                ),
            ));
            return;
        };
        pending.context.record_feedback(advisor, feedback);
        if !pending.context.is_complete() {
            return;
        }
        let Some(pending) = self.state.remediations.remove(&context.original_id) else {
            return;
        };

        let resubmission = self.resubmission(&pending);
        self.notice(SystemNotice::info(
            tick,
            NoticeKind::Remediation,
            format!(
                "Resubmitting plan {} with advisory feedback (attempt {})",
                pending.context.original_id, pending.context.attempt
            ),
        ));
        self.record_message(&resubmission);
        self.state.queue.push_front(resubmission);
    }

    /// The rejected plan, re-addressed to ETHICS with the feedback folded
    /// into its payload.
    fn resubmission(&mut self, pending: &PendingRemediation) -> Envelope {
        let rejected = &pending.rejected;
        let feedback: Map<String, Value> = pending
            .context
            .feedback
            .iter()
            .map(|(role, text)| (role.to_string(), Value::String(text.clone())))
            .collect();
        let mut payload = match rejected.payload() {
            Value::Object(fields) => fields.clone(),
            other => {
                let mut fields = Map::new();
                fields.insert("plan".to_string(), other.clone());
                fields
            }
        };
        payload.insert("advisory_feedback".to_string(), Value::Object(feedback));

        let id = self.next_id();
        Envelope::new(id, rejected.origin(), vec![Role::Ethics], self.state.tick)
            .with_priority(Priority::High)
            .with_payload(rejected.schema_id(), Value::Object(payload))
            .with_trace(rejected.trace().clone())
            .with_remediation(pending.context.without_feedback())
            .with_golden_thread(rejected.golden_thread().map(str::to_string))
    }
}
