//! Governance integration: the per-dispatch and per-tick tracker updates.

use super::Engine;
use serde_json::json;
use synod_domain::governance::{BreakerTrip, DensityChange, StallOutcome};
use synod_domain::role::factions::{STRATEGIC_ROLES, TACTICAL_ROLES};
use synod_domain::{FeedbackLoop, LoopResponse, NoticeKind, Role, SystemNotice};

impl Engine {
    pub(super) fn begin_tick(&mut self, tick: u64) {
        self.state.load.begin_tick();
        for role in self.state.mutes.expire(tick) {
            self.notice(SystemNotice::info(
                tick,
                NoticeKind::Mute,
                format!("{} unmuted: mute expired", role),
            ));
        }
    }

    /// Counters updated for every produced envelope.
    pub(super) fn govern_dispatch(&mut self, origin: Role) {
        if self.state.load.record_message() == DensityChange::Throttled {
            self.notice(SystemNotice::warning(
                self.state.tick,
                NoticeKind::Throttle,
                format!(
                    "Message density above {}; creative roles throttled to LOW",
                    self.config.load.density_limit
                ),
            ));
        }
        if let Some(trip) = self.state.breaker.observe(origin, self.state.last_health) {
            self.trip_breaker(trip);
        }
    }

    fn trip_breaker(&mut self, trip: BreakerTrip) {
        let tick = self.state.tick;
        let until = tick.saturating_add(self.state.breaker.limits().mute_ticks);
        for role in TACTICAL_ROLES {
            self.state
                .mutes
                .mute_until(role, until, "strategic circuit breaker");
        }
        let directive = self.system_envelope(
            STRATEGIC_ROLES.to_vec(),
            "directive.v1",
            json!({
                "summary": "Hub monopolized the run without progress; re-plan strategically",
                "hub_streak": trip.streak,
                "health_gain": trip.health_gain,
            }),
        );
        self.record_message(&directive);
        self.state.queue.push_back(directive);
        self.notice(SystemNotice::warning(
            tick,
            NoticeKind::CircuitBreaker,
            format!(
                "Circuit breaker tripped after {} hub dispatches (health gain {:.3}); tactical roles muted until tick {}",
                trip.streak, trip.health_gain, until
            ),
        ));
    }

    /// End-of-tick checks: density release, health sample, stall tracking
    /// and the idle-without-plan timer.
    pub(super) fn end_tick(&mut self, tick: u64) {
        if self.state.load.end_tick() == DensityChange::Released {
            self.notice(SystemNotice::info(
                tick,
                NoticeKind::Throttle,
                "Message density back under the limit; throttling lifted",
            ));
        }

        let reading = self.health_probe.measure(&self.state.log, tick);
        self.state.last_health = reading.health;

        if self.state.arbitration.is_frozen() || !self.state.status.is_active() {
            return;
        }

        match self.state.stall.observe(reading.health) {
            StallOutcome::Inactive | StallOutcome::Flowing => {}
            StallOutcome::Stalled { fired } => {
                self.notice(SystemNotice::warning(
                    tick,
                    NoticeKind::ConvergenceStall,
                    format!("Convergence stall at health {:.3}", reading.health),
                ));
                if let Some(feedback_loop) = fired {
                    self.fire_loop(feedback_loop);
                }
            }
            StallOutcome::Escalated { fired } => {
                if let Some(feedback_loop) = fired {
                    self.fire_loop(feedback_loop);
                }
                let alert = self.system_envelope(
                    vec![Role::Meta],
                    "alert.v1",
                    json!({
                        "summary": "Repeated convergence stalls; reassess the deliberation",
                        "health": reading.health,
                    }),
                );
                self.record_message(&alert);
                self.state.queue.push_back(alert);
                self.notice(SystemNotice::critical(
                    tick,
                    NoticeKind::ConvergenceStall,
                    "Repeated convergence stalls escalated to META",
                ));
            }
        }

        self.state.idle_plan_ticks += 1;
        if self.state.idle_plan_ticks > self.config.idle_plan_limit {
            self.state.idle_plan_ticks = 0;
            let nudge = self.system_envelope(
                vec![Role::Strategy],
                "directive.v1",
                json!({ "summary": "No plan has passed ethics review for a while; propose one" }),
            );
            self.record_message(&nudge);
            self.state.queue.push_back(nudge);
            self.notice(SystemNotice::info(
                tick,
                NoticeKind::Directive,
                format!(
                    "No approved plan for {} ticks; nudging STRATEGY",
                    self.config.idle_plan_limit
                ),
            ));
        }
    }

    fn fire_loop(&mut self, feedback_loop: FeedbackLoop) {
        let tick = self.state.tick;
        self.notice(SystemNotice::info(
            tick,
            NoticeKind::ConvergenceStall,
            format!("Feedback loop '{}' fired", feedback_loop.name),
        ));
        match feedback_loop.response {
            LoopResponse::ForceModeSwitch { mode } => {
                self.switch_mode(mode, &format!("feedback loop '{}'", feedback_loop.name));
            }
            LoopResponse::InjectDirective {
                target,
                instruction,
            } => {
                let directive = self.system_envelope(
                    vec![target],
                    "directive.v1",
                    json!({ "summary": instruction, "directive": instruction }),
                );
                self.record_message(&directive);
                self.state.queue.push_back(directive);
            }
            LoopResponse::ExtendTimeline { ticks } => {
                self.state.max_ticks = self.state.max_ticks.saturating_add(ticks);
            }
        }
    }
}
