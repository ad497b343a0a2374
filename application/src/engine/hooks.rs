//! Per-role hooks.
//!
//! Evaluated for every destination in this precedence:
//!
//! 1. ETHICS verdict (PASS resets the idle timer, FAIL starts remediation)
//! 2. advisory feedback on a remediation request
//! 3. STRATEGY cut-loop command
//! 4. PHILOSOPHY intervention (one-shot directive)
//! 5. strategic proposal under dynamic control
//! 6. SEMANTIC loss quarantine (adaptive mode)
//! 7. JUDGE ruling
//!
//! Hooks 1 (FAIL), 2, 3 and 7 end evaluation for the destination; the others
//! accumulate. A halted destination's output is logged but not routed. A cut
//! loop also skips the envelope's remaining destinations, leaving the restart
//! as the only queued envelope.

use super::Engine;
use super::dispatch::RoleOutput;
use crate::ports::report::ReportReason;
use serde_json::json;
use synod_domain::envelope::signals::{ProposalAction, RoutingCommand, StrategicProposal, Verdict};
use synod_domain::role::factions::{ADVISORY_ROLES, PROPOSAL_ROLES, SEMANTIC_QUARANTINE};
use synod_domain::{CommandKey, Envelope, NoticeKind, Priority, Role, SystemNotice};
use tracing::debug;

/// What happens to a destination's output after the hooks ran
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum HookFlow {
    /// Route normally (queue back)
    Route,
    /// Route ahead of all pending work
    RouteFront,
    /// Log only
    Halt,
}

impl Engine {
    pub(super) fn run_hooks(&mut self, envelope: &Envelope, output: &RoleOutput) -> HookFlow {
        let role = output.role;

        if role == Role::Ethics
            && let Some(verdict) = output.signals.verdict
        {
            match verdict {
                Verdict::Pass => self.state.idle_plan_ticks = 0,
                Verdict::Fail => {
                    let reason = output
                        .signals
                        .reason
                        .clone()
                        .unwrap_or_else(|| "unspecified ethical concern".to_string());
                    self.reject_plan(envelope, reason);
                    return HookFlow::Halt;
                }
            }
        }

        if ADVISORY_ROLES.contains(&role)
            && envelope.origin() == Role::Ethics
            && let Some(context) = envelope.remediation()
        {
            self.accept_feedback(context, role, output.feedback_text());
            return HookFlow::Halt;
        }

        if role == Role::Strategy
            && let Some(command) = &output.signals.command
            && self.cut_loop(envelope, role, command)
        {
            return HookFlow::Halt;
        }

        if role == Role::Philosophy
            && let Some(intervention) = &output.signals.intervention
        {
            debug!(target_role = %intervention.target, "Storing one-shot directive");
            self.state
                .directives
                .insert(intervention.target, intervention.instruction.clone());
            self.notice(SystemNotice::info(
                self.state.tick,
                NoticeKind::Directive,
                format!("PHILOSOPHY reframes {}'s next turn", intervention.target),
            ));
        }

        if PROPOSAL_ROLES.contains(&role)
            && let Some(proposal) = &output.signals.proposal
        {
            self.consider_proposal(role, proposal);
        }

        if role == Role::Semantic
            && self.state.mode.is_adaptive()
            && let Some(loss) = output.signals.semantic_loss
            && loss > self.config.semantic_loss_threshold
        {
            self.quarantine(loss);
        }

        if role == Role::Judge {
            return self.judge(envelope, output);
        }

        if self.state.status == super::SessionStatus::Stopped {
            return HookFlow::Halt;
        }
        HookFlow::Route
    }

    /// Command keys carry the judicial cycle in modes that scope them.
    pub(super) fn cycle_scope(&self) -> Option<u32> {
        self.state
            .mode
            .scopes_commands_per_cycle()
            .then(|| self.state.arbitration.cycle())
    }

    /// Clear the queue and restart at the mode's restart target.
    ///
    /// Returns `false` when the command already ran.
    fn cut_loop(&mut self, envelope: &Envelope, role: Role, command: &RoutingCommand) -> bool {
        let key = CommandKey::new(role, command.action.as_str(), "", self.cycle_scope());
        if !self.state.commands.claim(key) {
            self.notice(SystemNotice::info(
                self.state.tick,
                NoticeKind::Command,
                format!("{} from {} already executed; ignored", command.action.as_str(), role),
            ));
            return false;
        }

        let dropped = self.state.queue.len();
        self.state.queue.clear();
        let target = self.state.mode.restart_target();
        let id = self.next_id();
        let restart = Envelope::new(id, role, vec![target], self.state.tick)
            .with_priority(Priority::High)
            .with_payload(
                "restart.v1",
                json!({
                    "summary": format!("Loop cut by {}; restarting at {}", role, target),
                    "note": command.note,
                }),
            )
            .with_trace(envelope.trace().extend(envelope.id(), role))
            .with_golden_thread(Some(self.state.directive.clone()));
        self.record_message(&restart);
        self.state.queue.push_back(restart);
        self.loop_cut = true;
        self.notice(SystemNotice::warning(
            self.state.tick,
            NoticeKind::Command,
            format!(
                "{} from {}: dropped {} queued envelopes, restarting at {}",
                command.action.as_str(),
                role,
                dropped,
                target
            ),
        ));
        true
    }

    fn consider_proposal(&mut self, role: Role, proposal: &StrategicProposal) {
        if !self.state.control_mode.is_dynamic()
            || proposal.confidence <= self.config.proposal_confidence
        {
            return;
        }
        let key = CommandKey::new(
            role,
            proposal.action.name(),
            &proposal.action.argument_signature(),
            self.cycle_scope(),
        );
        if !self.state.commands.claim(key) {
            debug!(role = %role, action = proposal.action.name(), "Proposal already applied");
            return;
        }

        let tick = self.state.tick;
        let cause = format!("{} proposal from {}", proposal.action.name(), role);
        match &proposal.action {
            ProposalAction::SwitchMode { mode } => self.switch_mode(*mode, &cause),
            ProposalAction::ExtendTimeline { ticks } => {
                self.state.max_ticks = self.state.max_ticks.saturating_add(*ticks);
                self.notice(SystemNotice::info(
                    tick,
                    NoticeKind::Command,
                    format!("{}: tick budget now {}", cause, self.state.max_ticks),
                ));
            }
            ProposalAction::SwitchGeneration { generation } => {
                self.state.generation = *generation;
                self.notice(SystemNotice::info(
                    tick,
                    NoticeKind::Command,
                    format!("{}: generation now {}", cause, generation),
                ));
            }
            ProposalAction::Terminate => {
                self.notice(SystemNotice::warning(tick, NoticeKind::Command, cause));
                self.finish(ReportReason::StrategicTermination);
            }
        }
    }

    fn quarantine(&mut self, loss: f64) {
        let until = self.state.tick.saturating_add(self.config.semantic_mute_ticks);
        for role in SEMANTIC_QUARANTINE {
            self.state
                .mutes
                .mute_until(role, until, format!("semantic loss {:.2}", loss));
        }
        self.notice(SystemNotice::warning(
            self.state.tick,
            NoticeKind::Mute,
            format!(
                "Semantic loss {:.2}: quarantining creative roles until tick {}",
                loss, until
            ),
        ));
    }
}
