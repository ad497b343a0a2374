//! Dispatch engine
//!
//! The [`Engine`] owns every piece of run state (queue, tick, log, routing
//! overlays, governance trackers) and is the only writer to it. Each call to
//! [`Engine::process_tick`] dequeues exactly one envelope and processes its
//! destinations strictly in order:
//!
//! | Step | Work                                                         |
//! |------|--------------------------------------------------------------|
//! | 1    | stop when the tick budget is exhausted                       |
//! | 2    | idle (no tick advance) when the queue is empty               |
//! | 3    | stable-sort the queue by priority weight + impact score      |
//! | 4    | dequeue the head, advance the tick                           |
//! | 5    | per destination: generate, validate, hooks, route, enqueue   |
//! | 6    | end of tick: density release, health, stall, idle timer      |
//!
//! While arbitration has the network frozen only the judicial summons is
//! dispatched.

mod arbitration;
mod dispatch;
mod governance;
mod hooks;
mod remediation;
mod snapshot;
mod state;

pub use dispatch::FALLBACK_SCHEMA;
pub use snapshot::{EngineSnapshot, SNAPSHOT_VERSION};

use crate::config::EngineConfig;
use crate::ports::dispatch_logger::{DispatchEvent, DispatchLogger, NoDispatchLogger};
use crate::ports::generation::GenerationPort;
use crate::ports::health_probe::{ConstantHealth, HealthProbe, HealthReading};
use crate::ports::report::{ReportReason, ReportRequest};
use crate::ports::session_observer::{NoObserver, SessionObserver};
use crate::ports::validation::{AcceptAll, ValidationPort};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use state::RunState;
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use synod_domain::{
    ControlMode, Envelope, EnvelopeId, FeedbackLoop, GenerationMode, LogEntry, Mode, MuteSet,
    NoticeKind, NoticeSeverity, Priority, Role, RoutingTable, SystemNotice, TaskForce, Trace,
};
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Playback status of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionStatus {
    /// Nothing started yet
    #[default]
    Idle,
    Playing,
    Paused,
    /// Arbitration in progress; only the judiciary is dispatched
    Frozen,
    Stopped,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Idle => "IDLE",
            SessionStatus::Playing => "PLAYING",
            SessionStatus::Paused => "PAUSED",
            SessionStatus::Frozen => "FROZEN",
            SessionStatus::Stopped => "STOPPED",
        }
    }

    /// Whether the scheduling loop should keep ticking
    pub fn is_active(&self) -> bool {
        matches!(self, SessionStatus::Playing | SessionStatus::Frozen)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Directive must not be empty")]
    EmptyDirective,

    #[error("Tick budget must be positive")]
    InvalidDuration,

    #[error("Incompatible snapshot version {found} (expected {expected})")]
    SnapshotVersion { found: u32, expected: u32 },
}

/// What one scheduling turn did
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// Not playing
    Inactive,
    /// Queue empty; tick not advanced
    Idle,
    Dispatched(TickSummary),
    /// The run ended before dequeuing anything
    Finished(ReportReason),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TickSummary {
    pub tick: u64,
    pub envelope: EnvelopeId,
    /// Envelopes produced by the destinations
    pub produced: usize,
    /// Largest reentry delay requested by a destination this tick
    pub requested_delay_ms: Option<u64>,
}

/// The dispatch queue processor and its coordinators
pub struct Engine {
    config: EngineConfig,
    generator: Arc<dyn GenerationPort>,
    validator: Arc<dyn ValidationPort>,
    health_probe: Arc<dyn HealthProbe>,
    dispatch_logger: Arc<dyn DispatchLogger>,
    observer: Arc<dyn SessionObserver>,
    state: RunState,
    /// Set when a cut-loop replaced the queue during the current tick
    loop_cut: bool,
}

impl Engine {
    pub fn new(config: EngineConfig, generator: Arc<dyn GenerationPort>) -> Self {
        let state = RunState::new(&config);
        Self {
            config,
            generator,
            validator: Arc::new(AcceptAll),
            health_probe: Arc::new(ConstantHealth(HealthReading::default())),
            dispatch_logger: Arc::new(NoDispatchLogger),
            observer: Arc::new(NoObserver),
            state,
            loop_cut: false,
        }
    }

    pub fn with_validator(mut self, validator: Arc<dyn ValidationPort>) -> Self {
        self.validator = validator;
        self
    }

    pub fn with_health_probe(mut self, probe: Arc<dyn HealthProbe>) -> Self {
        self.health_probe = probe;
        self
    }

    pub fn with_dispatch_logger(mut self, logger: Arc<dyn DispatchLogger>) -> Self {
        self.dispatch_logger = logger;
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn SessionObserver>) -> Self {
        self.observer = observer;
        self
    }

    // ==================== Lifecycle ====================

    /// Start a run: seed the queue with one envelope from HUMAN, addressed
    /// to HUMAN's destinations in the preset of `mode`.
    pub fn start(
        &mut self,
        directive: impl Into<String>,
        mode: Mode,
        max_ticks: u64,
    ) -> Result<(), EngineError> {
        let directive = directive.into();
        if directive.trim().is_empty() {
            return Err(EngineError::EmptyDirective);
        }
        let destinations = RoutingTable::preset(mode).destinations(Role::Human).to_vec();
        let seed = Envelope::new(EnvelopeId::sequential(0), Role::Human, destinations, 0)
            .with_payload(
                "directive.v1",
                json!({ "summary": directive.clone(), "directive": directive.clone() }),
            )
            .with_golden_thread(Some(directive));
        self.start_from(seed, mode, max_ticks)
    }

    /// Start a run from an explicit seed envelope.
    ///
    /// The seed's golden thread (or its summary) becomes the run directive.
    pub fn start_from(
        &mut self,
        seed: Envelope,
        mode: Mode,
        max_ticks: u64,
    ) -> Result<(), EngineError> {
        if max_ticks == 0 {
            return Err(EngineError::InvalidDuration);
        }
        let directive = seed
            .golden_thread()
            .map(str::to_string)
            .or_else(|| seed.payload().get("summary").and_then(Value::as_str).map(str::to_string))
            .unwrap_or_default();

        let loops = self.state.stall.active_loops().to_vec();
        self.state = RunState::new(&self.config);
        for feedback_loop in loops {
            self.state.stall.register(feedback_loop);
        }
        self.state.directive = directive;
        self.state.mode = mode;
        self.state.max_ticks = max_ticks;
        self.state.next_seq = 1;
        self.refresh_routing();

        let seed = if seed.golden_thread().is_some() {
            seed
        } else {
            let thread = Some(self.state.directive.clone());
            seed.with_golden_thread(thread)
        };
        info!(mode = %mode, max_ticks, "Starting session");
        self.record_message(&seed);
        self.state.queue.push_back(seed);
        self.notice(SystemNotice::info(
            0,
            NoticeKind::Lifecycle,
            format!("Session started in {} mode for {} ticks", mode, max_ticks),
        ));
        self.set_status(SessionStatus::Playing);
        Ok(())
    }

    /// Pause playback. In-flight work of the current tick is never split.
    pub fn pause(&mut self) {
        if self.state.status.is_active() {
            self.set_status(SessionStatus::Paused);
        }
    }

    pub fn resume(&mut self) {
        if self.state.status == SessionStatus::Paused {
            let status = if self.state.arbitration.is_frozen() {
                SessionStatus::Frozen
            } else {
                SessionStatus::Playing
            };
            self.set_status(status);
        }
    }

    /// Drop all run state. Registered feedback loops are dropped as well.
    pub fn reset(&mut self) {
        info!("Resetting session");
        self.state = RunState::new(&self.config);
        self.observer.on_status(SessionStatus::Idle);
    }

    /// Ask for a report of the run so far without stopping it.
    pub fn request_report(&mut self) {
        self.state.pending_report = Some(ReportReason::UserRequested);
        self.observer.on_report(ReportReason::UserRequested);
    }

    /// Take the pending report request, if one is due.
    pub fn take_report_request(&mut self) -> Option<ReportRequest> {
        let reason = self.state.pending_report.take()?;
        Some(ReportRequest {
            reason,
            status: self.state.status,
            tick: self.state.tick,
            directive: self.state.directive.clone(),
            log: self.state.log.clone(),
        })
    }

    pub fn register_feedback_loop(&mut self, feedback_loop: FeedbackLoop) {
        debug!(name = %feedback_loop.name, "Registering feedback loop");
        self.state.stall.register(feedback_loop);
    }

    /// Append a host-originated envelope to the queue.
    pub fn enqueue(&mut self, envelope: Envelope) {
        self.state.queue.push_back(envelope);
    }

    // ==================== Scheduling ====================

    /// Run one scheduling turn.
    pub async fn process_tick(&mut self) -> TickOutcome {
        if !self.state.status.is_active() {
            return TickOutcome::Inactive;
        }
        if self.state.tick >= self.state.max_ticks {
            self.finish(ReportReason::TickBudgetExhausted);
            return TickOutcome::Finished(ReportReason::TickBudgetExhausted);
        }

        let frozen_at_start = self.state.arbitration.is_frozen();
        let next = if frozen_at_start {
            Some(self.next_summons())
        } else {
            self.sort_queue();
            self.state.queue.pop_front()
        };
        let Some(envelope) = next else {
            return TickOutcome::Idle;
        };

        self.state.tick += 1;
        let tick = self.state.tick;
        self.begin_tick(tick);
        debug!(tick, envelope = %envelope.summary(), "Dequeued");
        self.observer.on_tick(tick, self.state.max_ticks, &envelope);

        let mut summary = TickSummary {
            tick,
            envelope: envelope.id().clone(),
            produced: 0,
            requested_delay_ms: None,
        };
        self.loop_cut = false;
        for (index, role) in envelope.destinations().iter().copied().enumerate() {
            if self.loop_cut
                || self.state.status == SessionStatus::Stopped
                || (!frozen_at_start && self.state.arbitration.is_frozen())
            {
                break;
            }
            let requested = self.dispatch_to(&envelope, role, index as u32).await;
            summary.produced += 1;
            summary.requested_delay_ms = summary.requested_delay_ms.max(requested);
        }

        self.end_tick(tick);
        TickOutcome::Dispatched(summary)
    }

    /// Stable sort, highest weight first; equal weights keep queue order.
    /// Each envelope's weight is computed once per turn.
    fn sort_queue(&mut self) {
        let mut weighted: Vec<(f64, Envelope)> = self
            .state
            .queue
            .drain(..)
            .map(|envelope| (envelope.sort_weight(), envelope))
            .collect();
        weighted.sort_by(|a, b| b.0.total_cmp(&a.0));
        self.state
            .queue
            .extend(weighted.into_iter().map(|(_, envelope)| envelope));
    }

    // ==================== Accessors ====================

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn status(&self) -> SessionStatus {
        self.state.status
    }

    pub fn is_active(&self) -> bool {
        self.state.status.is_active()
    }

    pub fn is_frozen(&self) -> bool {
        self.state.arbitration.is_frozen()
    }

    pub fn tick(&self) -> u64 {
        self.state.tick
    }

    pub fn max_ticks(&self) -> u64 {
        self.state.max_ticks
    }

    pub fn mode(&self) -> Mode {
        self.state.mode
    }

    pub fn control_mode(&self) -> ControlMode {
        self.state.control_mode
    }

    pub fn set_control_mode(&mut self, control_mode: ControlMode) {
        self.state.control_mode = control_mode;
    }

    pub fn generation(&self) -> GenerationMode {
        self.state.generation
    }

    pub fn directive(&self) -> &str {
        &self.state.directive
    }

    pub fn queue(&self) -> &VecDeque<Envelope> {
        &self.state.queue
    }

    pub fn log(&self) -> &[LogEntry] {
        &self.state.log
    }

    pub fn mutes(&self) -> &MuteSet {
        &self.state.mutes
    }

    pub fn task_force(&self) -> Option<&TaskForce> {
        self.state.task_force.as_ref()
    }

    /// Routing table currently in effect, overlays included
    pub fn routing_table(&self) -> &RoutingTable {
        &self.state.table
    }

    /// One-shot reframing instruction waiting for `role`
    pub fn pending_directive(&self, role: Role) -> Option<&str> {
        self.state.directives.get(&role).map(String::as_str)
    }

    // ==================== Internal helpers ====================

    fn next_id(&mut self) -> EnvelopeId {
        let id = EnvelopeId::sequential(self.state.next_seq);
        self.state.next_seq += 1;
        id
    }

    /// Envelope injected by the engine itself on behalf of the operator seat.
    fn system_envelope(
        &mut self,
        destinations: Vec<Role>,
        schema_id: &str,
        payload: Value,
    ) -> Envelope {
        let id = self.next_id();
        Envelope::new(id, Role::Human, destinations, self.state.tick)
            .with_priority(Priority::High)
            .with_payload(schema_id, payload)
            .with_trace(Trace::root(Role::Human))
            .with_golden_thread(Some(self.state.directive.clone()))
    }

    fn set_status(&mut self, status: SessionStatus) {
        if self.state.status != status {
            debug!(from = %self.state.status, to = %status, "Status change");
            self.state.status = status;
            self.observer.on_status(status);
        }
    }

    /// Stop playback and request a terminal report.
    fn finish(&mut self, reason: ReportReason) {
        info!(reason = %reason, tick = self.state.tick, "Session finished");
        self.set_status(SessionStatus::Stopped);
        self.state.pending_report = Some(reason);
        self.observer.on_report(reason);
        self.notice(SystemNotice::info(
            self.state.tick,
            NoticeKind::Lifecycle,
            format!("Session stopped: {}", reason),
        ));
    }

    fn switch_mode(&mut self, mode: Mode, cause: &str) {
        if self.state.mode == mode {
            return;
        }
        let previous = self.state.mode;
        self.state.mode = mode;
        self.refresh_routing();
        self.notice(SystemNotice::info(
            self.state.tick,
            NoticeKind::Lifecycle,
            format!("Mode switched {} -> {} ({})", previous, mode, cause),
        ));
    }

    /// Re-resolve the routing table after a mode, task force or overlay change.
    fn refresh_routing(&mut self) {
        let resolved = self
            .state
            .routing
            .resolve(self.state.mode, self.state.task_force.as_ref());
        if let Some(conflict) = resolved.conflict
            && !self.state.conflict_reported
        {
            self.state.conflict_reported = true;
            self.notice(SystemNotice::warning(
                self.state.tick,
                NoticeKind::RoutingConflict,
                format!("Learned override skipped: {}", conflict),
            ));
        }
        if !resolved.patched.is_empty() {
            debug!(patched = ?resolved.patched, "Patched task-force dead ends");
        }
        self.state.table = resolved.table;
    }

    fn record_message(&mut self, envelope: &Envelope) {
        self.dispatch_logger.log(DispatchEvent::new(
            "dispatch",
            envelope.tick(),
            serde_json::to_value(envelope).unwrap_or(Value::Null),
        ));
        self.observer.on_dispatch(envelope);
        self.state.log.push(LogEntry::Message(envelope.clone()));
    }

    /// Append a system notice to the message stream.
    fn notice(&mut self, notice: SystemNotice) {
        match notice.severity {
            NoticeSeverity::Info => info!(kind = %notice.kind, tick = notice.tick, "{}", notice.text),
            NoticeSeverity::Warning => {
                warn!(kind = %notice.kind, tick = notice.tick, "{}", notice.text)
            }
            NoticeSeverity::Critical => {
                error!(kind = %notice.kind, tick = notice.tick, "{}", notice.text)
            }
        }
        self.dispatch_logger.log(DispatchEvent::new(
            "notice",
            notice.tick,
            serde_json::to_value(&notice).unwrap_or(Value::Null),
        ));
        self.observer.on_notice(&notice);
        self.state.log.push(LogEntry::Notice(notice));
    }
}

#[cfg(test)]
mod tests;
