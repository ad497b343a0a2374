//! Arbitration coordinator.
//!
//! Stalemate signatures are counted per distinct tick. When one repeats
//! often enough the network freezes: playback stops, the queue is cleared
//! and the judiciary is summoned with a two-faction snapshot. The ruling hook
//! applies the ruling and thaws the network.

use super::dispatch::RoleOutput;
use super::hooks::HookFlow;
use super::{Engine, SessionStatus};
use serde_json::json;
use synod_domain::envelope::signals::{DirectiveOrder, RerouteOrder, Ruling};
use synod_domain::role::factions::resolve_alias;
use synod_domain::{
    ArbitrationContext, DomainError, Envelope, NoticeKind, PayloadSignals, Priority, Reroute,
    Role, SystemNotice, TaskForce, Trace, UnmuteCondition,
};
use tracing::info;

/// Action name recorded for ruling-ordered re-routes
const RISK_MITIGATION: &str = "RISK_MITIGATION";

impl Engine {
    /// Count the stalemate signature carried by `role`'s output, freezing
    /// the network when it reaches the threshold.
    pub(super) fn check_stalemate(&mut self, role: Role, signals: &PayloadSignals) {
        if !self.state.mode.arbitration_enabled() || self.state.arbitration.is_frozen() {
            return;
        }
        let Some(signature) = self.state.arbitration.signature_of(role, signals) else {
            return;
        };
        if self.state.arbitration.observe(&signature, self.state.tick) {
            self.freeze(role, signature);
        }
    }

    fn freeze(&mut self, origin: Role, signature: String) {
        info!(signature = %signature, tick = self.state.tick, "Freezing network for arbitration");
        self.state.arbitration.freeze();
        self.state.queue.clear();
        let summons = self.summons(origin, &signature);
        self.record_message(&summons);
        self.state.queue.push_back(summons);
        self.notice(SystemNotice::warning(
            self.state.tick,
            NoticeKind::Arbitration,
            format!(
                "Stalemate '{}' repeated; network frozen, judiciary summoned",
                signature
            ),
        ));
        self.state.frozen_signature = Some(signature);
        self.set_status(SessionStatus::Frozen);
    }

    fn summons(&mut self, origin: Role, signature: &str) -> Envelope {
        let context =
            ArbitrationContext::summon(signature, self.state.arbitration.cycle(), &self.state.log);
        let id = self.next_id();
        Envelope::new(id, origin, vec![Role::Judge], self.state.tick)
            .with_priority(Priority::High)
            .with_payload(
                "summons.v1",
                json!({
                    "summary": format!("Arbitrate stalemate '{}'", signature),
                    "signature": signature,
                    "plaintiffs": context.plaintiffs,
                    "defendants": context.defendants,
                }),
            )
            .with_trace(Trace::root(origin))
            .with_arbitration(context)
            .with_golden_thread(Some(self.state.directive.clone()))
    }

    /// Next envelope to dispatch while frozen. Anything but a summons stays
    /// suppressed; with no summons pending the judiciary is summoned again.
    pub(super) fn next_summons(&mut self) -> Envelope {
        if let Some(index) = self
            .state
            .queue
            .iter()
            .position(|envelope| envelope.arbitration().is_some())
            && let Some(summons) = self.state.queue.remove(index)
        {
            return summons;
        }
        let signature = self
            .state
            .frozen_signature
            .clone()
            .unwrap_or_else(|| "unknown".to_string());
        self.notice(SystemNotice::warning(
            self.state.tick,
            NoticeKind::Arbitration,
            format!("No ruling on '{}' yet; summoning the judiciary again", signature),
        ));
        let summons = self.summons(Role::Meta, &signature);
        self.record_message(&summons);
        summons
    }

    /// JUDGE hook: apply a valid ruling and thaw the network.
    pub(super) fn judge(&mut self, envelope: &Envelope, output: &RoleOutput) -> HookFlow {
        let frozen = self.state.arbitration.is_frozen();
        let tick = self.state.tick;

        let ruling = match &output.signals.ruling {
            Some(ruling) if output.validation.is_valid() => ruling.clone(),
            Some(ruling) => {
                self.notice(SystemNotice::warning(
                    tick,
                    NoticeKind::Arbitration,
                    format!("{} ruling failed validation; network stays frozen", ruling.name()),
                ));
                return if frozen { HookFlow::Halt } else { HookFlow::Route };
            }
            None if frozen => {
                self.notice(SystemNotice::warning(
                    tick,
                    NoticeKind::Arbitration,
                    "Judiciary answered without a ruling; network stays frozen",
                ));
                return HookFlow::Halt;
            }
            None => return HookFlow::Route,
        };

        self.apply_ruling(&ruling, envelope.arbitration());
        if frozen {
            self.state.arbitration.release();
            self.state.frozen_signature = None;
            self.set_status(SessionStatus::Playing);
            self.notice(SystemNotice::info(
                tick,
                NoticeKind::Arbitration,
                format!(
                    "{} ruling issued; network resumes (cycle {})",
                    ruling.name(),
                    self.state.arbitration.cycle()
                ),
            ));
        }
        if self.state.mode.rulings_jump_queue() {
            HookFlow::RouteFront
        } else {
            HookFlow::Route
        }
    }

    fn apply_ruling(&mut self, ruling: &Ruling, context: Option<&ArbitrationContext>) {
        let tick = self.state.tick;
        self.notice(SystemNotice::info(
            tick,
            NoticeKind::Ruling,
            format!("Applying {} ruling", ruling.name()),
        ));
        match ruling {
            Ruling::CreativeGreenlit {
                muted,
                unmute,
                duration_ticks,
            } => {
                let mut conditions = unmute.clone();
                if let Some(ticks) = duration_ticks {
                    conditions.push(UnmuteCondition::Timeout { ticks: *ticks });
                }
                for role in self.resolve_roles(muted, None) {
                    self.state.mutes.mute_with_conditions(
                        role,
                        tick,
                        conditions.clone(),
                        "creative greenlight",
                    );
                    self.notice(SystemNotice::info(
                        tick,
                        NoticeKind::Mute,
                        format!("{} muted by ruling", role),
                    ));
                }
            }
            Ruling::RiskMitigation { reroute, directive } => {
                if let Some(order) = reroute {
                    self.apply_reroute(order);
                }
                if let Some(order) = directive {
                    self.push_directive(order);
                }
            }
            Ruling::SynthesisTaskForce { members, kickoff } => {
                let roles = self.resolve_roles(members, context);
                if roles.is_empty() {
                    self.notice(SystemNotice::warning(
                        tick,
                        NoticeKind::Ruling,
                        format!("Task force not formed: {}", DomainError::EmptyTaskForce),
                    ));
                    return;
                }
                let task_force = TaskForce::new(roles);
                let members: Vec<Role> = task_force.members().collect();
                self.state.task_force = Some(task_force);
                self.refresh_routing();
                let text = kickoff
                    .clone()
                    .unwrap_or_else(|| "Task force convened".to_string());
                let envelope = self.system_envelope(
                    members.clone(),
                    "kickoff.v1",
                    json!({ "summary": text, "kickoff": true }),
                );
                self.record_message(&envelope);
                self.state.queue.push_back(envelope);
                let names: Vec<&str> = members.iter().map(|r| r.as_str()).collect();
                self.notice(SystemNotice::info(
                    tick,
                    NoticeKind::Ruling,
                    format!("Task force formed: {}", names.join(", ")),
                ));
            }
        }
    }

    fn apply_reroute(&mut self, order: &RerouteOrder) {
        let tick = self.state.tick;
        let Some(source) = self.resolve_one(&order.source) else {
            return;
        };
        let destinations = self.resolve_roles(&order.destinations, None);
        if destinations.is_empty() {
            self.notice(SystemNotice::warning(
                tick,
                NoticeKind::Ruling,
                format!("Re-route of {} dropped: no resolvable destinations", source),
            ));
            return;
        }
        let reroute = Reroute {
            action: RISK_MITIGATION.to_string(),
            source,
            destinations,
        };
        if self.state.routing.add_reroute(reroute, self.cycle_scope()) {
            self.refresh_routing();
            self.notice(SystemNotice::info(
                tick,
                NoticeKind::Ruling,
                format!("Re-route applied for {}", source),
            ));
        } else {
            self.notice(SystemNotice::info(
                tick,
                NoticeKind::Ruling,
                format!("Re-route for {} already applied; ignored", source),
            ));
        }
    }

    fn push_directive(&mut self, order: &DirectiveOrder) {
        let Some(target) = self.resolve_one(&order.target) else {
            return;
        };
        let id = self.next_id();
        let envelope = Envelope::new(id, Role::Judge, vec![target], self.state.tick)
            .with_priority(Priority::High)
            .with_payload(
                "directive.v1",
                json!({ "summary": order.instruction, "directive": order.instruction }),
            )
            .with_golden_thread(Some(self.state.directive.clone()));
        self.record_message(&envelope);
        self.state.queue.push_back(envelope);
        self.notice(SystemNotice::info(
            self.state.tick,
            NoticeKind::Directive,
            format!("Judicial directive sent to {}", target),
        ));
    }

    fn resolve_one(&mut self, name: &str) -> Option<Role> {
        let role = resolve_alias(name);
        if role.is_none() {
            self.unresolvable(name);
        }
        role
    }

    /// Resolve role names from a ruling, in order and without duplicates.
    ///
    /// Names outside the alias table are matched against the plaintiffs of
    /// the arbitration context; anything else is dropped with a notice.
    fn resolve_roles(
        &mut self,
        names: &[String],
        context: Option<&ArbitrationContext>,
    ) -> Vec<Role> {
        let mut roles: Vec<Role> = Vec::new();
        for name in names {
            let resolved = match resolve_alias(name) {
                Some(role) => vec![role],
                None => context.map(|ctx| infer_plaintiffs(name, ctx)).unwrap_or_default(),
            };
            if resolved.is_empty() {
                self.unresolvable(name);
            }
            for role in resolved {
                if !roles.contains(&role) {
                    roles.push(role);
                }
            }
        }
        roles
    }

    fn unresolvable(&mut self, name: &str) {
        self.notice(SystemNotice::warning(
            self.state.tick,
            NoticeKind::UnresolvableRoleReference,
            DomainError::UnresolvableRoleReference(name.to_string()).to_string(),
        ));
    }
}

/// Plaintiff roles a free-form reference plausibly names.
fn infer_plaintiffs(name: &str, context: &ArbitrationContext) -> Vec<Role> {
    let needle = name.trim().to_ascii_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }
    if needle.contains("plaintiff") {
        return context.plaintiffs.clone();
    }
    context
        .plaintiffs
        .iter()
        .copied()
        .filter(|role| {
            let id = role.as_str().to_ascii_lowercase();
            needle.contains(&id) || id.contains(&needle)
        })
        .collect()
}
