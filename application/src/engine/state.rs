//! Owned run state of the engine.

use super::SessionStatus;
use super::remediation::PendingRemediation;
use crate::config::EngineConfig;
use crate::ports::report::ReportReason;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};
use synod_domain::{
    ArbitrationState, BroadcastSampler, CognitiveLoadGovernor, CommandLedger, ControlMode,
    ConvergenceStallTracker, Envelope, EnvelopeId, GenerationMode, LogEntry, Mode, MuteSet, Role,
    RoutingProvider, RoutingTable, StrategicCircuitBreaker, TaskForce,
};

/// Everything a snapshot must carry to resume a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct RunState {
    pub status: SessionStatus,
    pub directive: String,
    pub mode: Mode,
    pub control_mode: ControlMode,
    pub generation: GenerationMode,
    pub max_ticks: u64,
    pub tick: u64,
    pub next_seq: u64,
    pub queue: VecDeque<Envelope>,
    pub log: Vec<LogEntry>,
    pub routing: RoutingProvider,
    /// Last resolved table, overlays included
    pub table: RoutingTable,
    pub conflict_reported: bool,
    pub task_force: Option<TaskForce>,
    pub mutes: MuteSet,
    pub commands: CommandLedger,
    pub load: CognitiveLoadGovernor,
    pub breaker: StrategicCircuitBreaker,
    pub stall: ConvergenceStallTracker,
    pub arbitration: ArbitrationState,
    /// Signature of the stalemate under arbitration
    pub frozen_signature: Option<String>,
    pub sampler: BroadcastSampler,
    /// One-shot reframing instructions, consumed on the target's next dispatch
    pub directives: BTreeMap<Role, String>,
    /// Rejected plans waiting for advisory feedback, by original message id
    pub remediations: BTreeMap<EnvelopeId, PendingRemediation>,
    pub idle_plan_ticks: u64,
    pub last_health: f64,
    pub pending_report: Option<ReportReason>,
}

impl RunState {
    pub fn new(config: &EngineConfig) -> Self {
        let mut routing = RoutingProvider::new();
        if let Some(learned) = &config.learned_override {
            routing = routing.with_learned_override(learned.clone(), config.learned_override_enabled);
        }
        Self {
            status: SessionStatus::Idle,
            directive: String::new(),
            mode: config.mode,
            control_mode: config.control_mode,
            generation: config.generation,
            max_ticks: config.max_ticks,
            tick: 0,
            next_seq: 0,
            queue: VecDeque::new(),
            log: Vec::new(),
            table: RoutingTable::preset(config.mode),
            routing,
            conflict_reported: false,
            task_force: None,
            mutes: MuteSet::new(),
            commands: CommandLedger::new(),
            load: CognitiveLoadGovernor::new(config.load.clone()),
            breaker: StrategicCircuitBreaker::new(config.breaker.clone()),
            stall: ConvergenceStallTracker::new(config.stall.clone()),
            arbitration: ArbitrationState::new(config.arbitration.clone()),
            frozen_signature: None,
            sampler: BroadcastSampler::new(config.seed),
            directives: BTreeMap::new(),
            remediations: BTreeMap::new(),
            idle_plan_ticks: 0,
            last_health: 0.0,
            pending_report: None,
        }
    }
}
