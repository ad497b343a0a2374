//! Per-destination processing.

use super::Engine;
use super::hooks::HookFlow;
use crate::ports::generation::{Generated, GenerationRequest};
use serde_json::{Value, json};
use synod_domain::envelope::signals::PayloadSignals;
use synod_domain::governance::{ReleaseObservation, filter_destinations};
use synod_domain::role::factions::HUB_ROLE;
use synod_domain::{Envelope, GenerationMode, NoticeKind, Role, SystemNotice, ValidationOutcome};
use tracing::{debug, warn};

/// Schema of the deterministic substitute for a failed generation
pub const FALLBACK_SCHEMA: &str = "fallback.v1";

/// A destination role's validated output, before it becomes an envelope
pub(super) struct RoleOutput {
    pub role: Role,
    pub schema_id: String,
    pub payload: Value,
    pub signals: PayloadSignals,
    pub validation: ValidationOutcome,
}

impl RoleOutput {
    /// Free-text feedback carried by the payload
    pub fn feedback_text(&self) -> String {
        self.signals
            .feedback
            .clone()
            .or_else(|| {
                self.payload
                    .get("summary")
                    .and_then(Value::as_str)
                    .map(str::to_string)
            })
            .unwrap_or_default()
    }
}

impl Engine {
    /// Process one destination of `envelope`. Returns the reentry delay the
    /// role asked for, when the mode honors it.
    pub(super) async fn dispatch_to(
        &mut self,
        envelope: &Envelope,
        role: Role,
        sub_tick: u32,
    ) -> Option<u64> {
        let tick = self.state.tick;
        let one_shot = self.state.directives.remove(&role);
        let generated = self.generate(role, envelope, one_shot).await;

        let report = self
            .validator
            .validate(&generated.schema_id, &generated.payload)
            .await;
        if !report.ok {
            self.notice(SystemNotice::warning(
                tick,
                NoticeKind::ValidationFailure,
                format!(
                    "{} produced invalid {}: {}",
                    role,
                    generated.schema_id,
                    report.errors.join("; ")
                ),
            ));
        }

        let output = RoleOutput {
            role,
            signals: PayloadSignals::extract(&generated.payload),
            validation: ValidationOutcome::from_result(report.ok, report.errors),
            schema_id: generated.schema_id,
            payload: generated.payload,
        };
        self.release_mutes(&output);

        let flow = self.run_hooks(envelope, &output);
        let next_hops = match flow {
            HookFlow::Halt => Vec::new(),
            HookFlow::Route | HookFlow::RouteFront => self.next_hops(role),
        };

        let requested = output.signals.priority.unwrap_or(envelope.priority());
        let priority = self.state.load.effective_priority(role, requested);
        let id = self.next_id();
        let produced = envelope
            .successor(id, role, next_hops, tick, sub_tick)
            .with_priority(priority)
            .with_payload(output.schema_id.clone(), output.payload.clone())
            .with_validation(output.validation.clone());
        debug!(envelope = %produced.summary(), "Produced");
        self.record_message(&produced);
        self.govern_dispatch(role);

        if !produced.destinations().is_empty() {
            match flow {
                HookFlow::RouteFront => self.state.queue.push_front(produced),
                _ => self.state.queue.push_back(produced),
            }
        }

        self.check_stalemate(role, &output.signals);

        output
            .signals
            .requested_delay_ms
            .filter(|_| self.state.mode.honors_requested_delay())
    }

    async fn generate(
        &mut self,
        role: Role,
        envelope: &Envelope,
        one_shot_directive: Option<String>,
    ) -> Generated {
        let request = GenerationRequest {
            role,
            envelope: envelope.clone(),
            online: self.state.generation.is_online(),
            tick: self.state.tick,
            mode: self.state.mode,
            directive: self.state.directive.clone(),
            max_ticks: self.state.max_ticks,
            one_shot_directive,
        };
        match self.generator.generate(request).await {
            Ok(generated) => {
                self.state.load.record_generation(true);
                generated
            }
            Err(error) => {
                warn!(role = %role, error = %error, "Generation failed, using fallback");
                self.notice(SystemNotice::warning(
                    self.state.tick,
                    NoticeKind::GenerationFailure,
                    format!("{} failed to generate: {}", role, error),
                ));
                let demote = self.state.load.record_generation(false);
                if demote && self.state.generation.is_online() {
                    self.state.generation = GenerationMode::Offline;
                    self.state.load.clear_samples();
                    self.notice(SystemNotice::warning(
                        self.state.tick,
                        NoticeKind::GenerationDemoted,
                        "Sustained generation failures; switched to offline generation",
                    ));
                }
                fallback(role, envelope)
            }
        }
    }

    /// Next hops for `role`'s output: routing table (or the hub broadcast
    /// sample) minus muted roles, intersected with the task force.
    fn next_hops(&mut self, role: Role) -> Vec<Role> {
        let candidates = if self.state.mode.samples_broadcast() && role == HUB_ROLE {
            self.state.sampler.broadcast_from(role)
        } else {
            self.state.table.destinations(role).to_vec()
        };
        filter_destinations(
            &candidates,
            &self.state.mutes,
            self.state.task_force.as_ref(),
            self.state.tick,
        )
    }

    fn release_mutes(&mut self, output: &RoleOutput) {
        let released = self.state.mutes.release_matching(&ReleaseObservation {
            schema_id: &output.schema_id,
            confidence: output.signals.confidence,
        });
        for role in released {
            self.notice(SystemNotice::info(
                self.state.tick,
                NoticeKind::Mute,
                format!("{} unmuted: release condition met by {}", role, output.role),
            ));
        }
    }
}

/// Deterministic substitute payload for a failed generation.
fn fallback(role: Role, envelope: &Envelope) -> Generated {
    Generated::new(
        FALLBACK_SCHEMA,
        json!({
            "summary": format!(
                "{} could not respond to {}",
                role.display_name(),
                envelope.id()
            ),
            "fallback": true,
        }),
    )
}
