use super::*;
use crate::ports::generation::{GenerationError, GenerationRequest, Generated};
use crate::ports::validation::ValidationReport;
use async_trait::async_trait;
use serde_json::json;
use std::sync::Mutex;
use synod_domain::envelope::signals::Verdict;
use synod_domain::role::factions::{CREATIVE_ROLES, STRATEGIC_ROLES};
use synod_domain::{ArbitrationContext, LearnedOverride, LoopResponse, PayloadSignals};

// ==================== Mock ports ====================

type Script = dyn Fn(&GenerationRequest) -> Result<Generated, GenerationError> + Send + Sync;

struct Scripted(Box<Script>);

#[async_trait]
impl GenerationPort for Scripted {
    async fn generate(&self, request: GenerationRequest) -> Result<Generated, GenerationError> {
        (self.0)(&request)
    }
}

fn note(role: Role) -> Generated {
    Generated::new("note.v1", json!({ "summary": format!("{} speaks", role) }))
}

fn engine_with<F>(config: EngineConfig, script: F) -> Engine
where
    F: Fn(&GenerationRequest) -> Result<Generated, GenerationError> + Send + Sync + 'static,
{
    Engine::new(config, Arc::new(Scripted(Box::new(script))))
}

fn echo_engine() -> Engine {
    engine_with(EngineConfig::default(), |req| Ok(note(req.role)))
}

/// Rejects every payload declaring the given schema.
struct RejectSchema(&'static str);

#[async_trait]
impl ValidationPort for RejectSchema {
    async fn validate(&self, schema_id: &str, _payload: &Value) -> ValidationReport {
        if schema_id == self.0 {
            ValidationReport::invalid(vec!["rejected by test".to_string()])
        } else {
            ValidationReport::valid()
        }
    }
}

fn seed(origin: Role, destinations: Vec<Role>) -> Envelope {
    Envelope::new(EnvelopeId::new("seed"), origin, destinations, 0)
        .with_payload("directive.v1", json!({ "summary": "test directive" }))
        .with_golden_thread(Some("test directive".to_string()))
}

fn host(id: &str, destinations: Vec<Role>) -> Envelope {
    Envelope::new(EnvelopeId::new(id), Role::Human, destinations, 0)
        .with_payload("directive.v1", json!({ "summary": id }))
}

fn notices_of(engine: &Engine, kind: NoticeKind) -> Vec<&SystemNotice> {
    engine
        .log()
        .iter()
        .filter_map(LogEntry::as_notice)
        .filter(|n| n.kind == kind)
        .collect()
}

fn messages_from(engine: &Engine, origin: Role) -> Vec<&Envelope> {
    engine
        .log()
        .iter()
        .filter_map(LogEntry::as_message)
        .filter(|e| e.origin() == origin)
        .collect()
}

async fn run_until_stopped(engine: &mut Engine, limit: usize) {
    for _ in 0..limit {
        if engine.status() == SessionStatus::Stopped {
            return;
        }
        engine.process_tick().await;
    }
}

// ==================== Scheduling ====================

#[tokio::test]
async fn test_first_dispatch_routes_memory_by_default_table() {
    let mut engine = echo_engine();
    engine.start("Design a city", Mode::Standard, 50).unwrap();
    assert_eq!(engine.queue().len(), 1);

    let outcome = engine.process_tick().await;
    assert!(matches!(outcome, TickOutcome::Dispatched(ref s) if s.tick == 1 && s.produced == 1));
    assert_eq!(engine.tick(), 1);
    assert_eq!(engine.queue().len(), 1);

    let next = &engine.queue()[0];
    assert_eq!(next.origin(), Role::Memory);
    assert_eq!(
        next.destinations(),
        RoutingTable::preset(Mode::Standard).destinations(Role::Memory)
    );
    assert_eq!(next.trace().path, vec![Role::Human, Role::Memory]);
    assert_eq!(next.golden_thread(), Some("Design a city"));
    assert_eq!(next.sub_tick(), Some(0));
}

#[tokio::test]
async fn test_tick_advances_exactly_once_per_dequeue() {
    let mut engine = echo_engine();
    engine.start("Keep talking", Mode::Standard, 100).unwrap();
    for expected in 1..=25 {
        match engine.process_tick().await {
            TickOutcome::Dispatched(summary) => assert_eq!(summary.tick, expected),
            other => panic!("unexpected outcome {:?}", other),
        }
        assert_eq!(engine.tick(), expected);
    }
}

#[tokio::test]
async fn test_empty_queue_idles_without_advancing() {
    let mut engine = echo_engine();
    engine
        .start_from(seed(Role::Human, vec![Role::Judge]), Mode::Standard, 10)
        .unwrap();
    engine.process_tick().await;
    assert_eq!(engine.tick(), 1);
    assert!(engine.queue().is_empty());

    assert_eq!(engine.process_tick().await, TickOutcome::Idle);
    assert_eq!(engine.process_tick().await, TickOutcome::Idle);
    assert_eq!(engine.tick(), 1);
    assert_eq!(engine.status(), SessionStatus::Playing);
}

#[tokio::test]
async fn test_budget_exhaustion_stops_and_requests_report() {
    let mut engine = echo_engine();
    engine.start("Short run", Mode::Standard, 2).unwrap();
    engine.process_tick().await;
    engine.process_tick().await;
    let outcome = engine.process_tick().await;
    assert_eq!(
        outcome,
        TickOutcome::Finished(ReportReason::TickBudgetExhausted)
    );
    assert_eq!(engine.status(), SessionStatus::Stopped);
    assert_eq!(engine.tick(), 2);

    let report = engine.take_report_request().unwrap();
    assert_eq!(report.reason, ReportReason::TickBudgetExhausted);
    assert_eq!(report.status, SessionStatus::Stopped);
    assert!(!report.log.is_empty());
    assert!(engine.take_report_request().is_none());
    assert_eq!(engine.process_tick().await, TickOutcome::Inactive);
}

#[tokio::test]
async fn test_queue_sorted_by_weight_with_stable_ties() {
    let mut engine = echo_engine();
    let low = seed(Role::Human, vec![Role::Judge]).with_priority(Priority::Low);
    engine.start_from(low, Mode::Standard, 10).unwrap();
    engine.enqueue(host("medium-a", vec![Role::Judge]));
    engine.enqueue(host("high", vec![Role::Judge]).with_priority(Priority::High));
    engine.enqueue(host("medium-b", vec![Role::Judge]));
    engine.enqueue(
        Envelope::new(EnvelopeId::new("impact"), Role::Human, vec![Role::Judge], 0)
            .with_payload("note.v1", json!({ "impact_score": 1.5 })),
    );

    let mut order = Vec::new();
    for _ in 0..5 {
        if let TickOutcome::Dispatched(summary) = engine.process_tick().await {
            order.push(summary.envelope.as_str().to_string());
        }
    }
    assert_eq!(order, vec!["impact", "high", "medium-a", "medium-b", "seed"]);
}

#[tokio::test]
async fn test_pause_and_resume() {
    let mut engine = echo_engine();
    engine.start("Pause me", Mode::Standard, 10).unwrap();
    engine.pause();
    assert_eq!(engine.status(), SessionStatus::Paused);
    assert_eq!(engine.process_tick().await, TickOutcome::Inactive);
    assert_eq!(engine.tick(), 0);

    engine.resume();
    assert!(matches!(
        engine.process_tick().await,
        TickOutcome::Dispatched(_)
    ));
    assert_eq!(engine.tick(), 1);
}

#[tokio::test]
async fn test_reset_clears_run_state() {
    let mut engine = echo_engine();
    engine.start("Reset me", Mode::Standard, 10).unwrap();
    engine.process_tick().await;
    engine.reset();
    assert_eq!(engine.status(), SessionStatus::Idle);
    assert_eq!(engine.tick(), 0);
    assert!(engine.queue().is_empty());
    assert!(engine.log().is_empty());
}

#[tokio::test]
async fn test_start_rejects_bad_input() {
    let mut engine = echo_engine();
    assert!(matches!(
        engine.start("  ", Mode::Standard, 10),
        Err(EngineError::EmptyDirective)
    ));
    assert!(matches!(
        engine.start("ok", Mode::Standard, 0),
        Err(EngineError::InvalidDuration)
    ));
}

// ==================== Generation failures ====================

#[tokio::test]
async fn test_generation_failure_falls_back_and_demotes() {
    let mut engine = engine_with(EngineConfig::default(), |_| {
        Err(GenerationError::QuotaExceeded("no quota".to_string()))
    });
    engine.start("Fail often", Mode::Standard, 100).unwrap();

    engine.process_tick().await;
    let first = messages_from(&engine, Role::Memory)[0];
    assert_eq!(first.schema_id(), "fallback.v1");
    assert_eq!(first.payload()["fallback"], json!(true));
    // the fallback still routes
    assert_eq!(first.destinations(), &[Role::Perception, Role::Analyst]);

    for _ in 0..30 {
        if !engine.generation().is_online() {
            break;
        }
        engine.process_tick().await;
    }
    assert_eq!(engine.generation(), GenerationMode::Offline);
    assert_eq!(notices_of(&engine, NoticeKind::GenerationDemoted).len(), 1);
    assert!(!notices_of(&engine, NoticeKind::GenerationFailure).is_empty());
    assert_eq!(engine.status(), SessionStatus::Playing);
}

// ==================== Remediation ====================

fn rejecting_ethics(req: &GenerationRequest) -> Result<Generated, GenerationError> {
    match req.role {
        Role::Ethics => Ok(Generated::new(
            "verdict.v1",
            json!({ "verdict": "FAIL", "reason": "harms bystanders" }),
        )),
        Role::Legal => Ok(Generated::new(
            "advice.v1",
            json!({ "feedback": "cite the zoning code" }),
        )),
        Role::Philosophy => Ok(Generated::new(
            "advice.v1",
            json!({
                "feedback": "weigh the commons",
                "intervention": { "target": "PLANNER", "instruction": "think wider" },
            }),
        )),
        role => Ok(note(role)),
    }
}

#[tokio::test]
async fn test_third_rejection_stops_with_moral_override() {
    let mut engine = engine_with(EngineConfig::default(), rejecting_ethics);
    engine
        .start_from(seed(Role::Planner, vec![Role::Ethics]), Mode::Standard, 50)
        .unwrap();

    engine.process_tick().await;
    // one advisory copy per advisory role, addressed from ETHICS
    let copies: Vec<&Envelope> = engine.queue().iter().collect();
    assert_eq!(copies.len(), 2);
    assert!(copies.iter().all(|e| e.origin() == Role::Ethics));
    assert_eq!(copies[0].destinations(), &[Role::Legal]);
    assert_eq!(copies[1].destinations(), &[Role::Philosophy]);
    assert_eq!(copies[0].remediation().unwrap().attempt, 1);

    run_until_stopped(&mut engine, 20).await;
    assert_eq!(engine.status(), SessionStatus::Stopped);
    assert_eq!(engine.tick(), 7);

    let failures: Vec<&Envelope> = messages_from(&engine, Role::Ethics)
        .into_iter()
        .filter(|e| e.signals().verdict == Some(Verdict::Fail))
        .collect();
    assert_eq!(failures.len(), 3);

    let report = engine.take_report_request().unwrap();
    assert_eq!(report.reason, ReportReason::MoralOverride);
    assert_eq!(notices_of(&engine, NoticeKind::EthicalRejection).len(), 1);
}

#[tokio::test]
async fn test_resubmission_carries_feedback_and_original_id() {
    let mut engine = engine_with(EngineConfig::default(), rejecting_ethics);
    engine
        .start_from(seed(Role::Planner, vec![Role::Ethics]), Mode::Standard, 50)
        .unwrap();
    for _ in 0..3 {
        engine.process_tick().await;
    }

    let resubmission = &engine.queue()[0];
    assert_eq!(resubmission.origin(), Role::Planner);
    assert_eq!(resubmission.destinations(), &[Role::Ethics]);
    assert_eq!(resubmission.priority(), Priority::High);
    let context = resubmission.remediation().unwrap();
    assert_eq!(context.original_id, EnvelopeId::new("seed"));
    assert!(context.feedback.is_empty());
    assert_eq!(
        resubmission.payload()["advisory_feedback"]["LEGAL"],
        json!("cite the zoning code")
    );
    assert_eq!(
        resubmission.payload()["advisory_feedback"]["PHILOSOPHY"],
        json!("weigh the commons")
    );
}

#[tokio::test]
async fn test_remediation_feedback_takes_precedence_over_intervention() {
    let mut engine = engine_with(EngineConfig::default(), rejecting_ethics);
    engine
        .start_from(seed(Role::Planner, vec![Role::Ethics]), Mode::Standard, 50)
        .unwrap();
    for _ in 0..3 {
        engine.process_tick().await;
    }
    // PHILOSOPHY answered an advisory copy: its intervention is not stored
    assert!(engine.pending_directive(Role::Planner).is_none());
}

#[tokio::test]
async fn test_pass_after_remediation_routes_onward() {
    let mut engine = engine_with(EngineConfig::default(), |req| match req.role {
        Role::Ethics if req.envelope.payload().get("advisory_feedback").is_some() => Ok(
            Generated::new("verdict.v1", json!({ "verdict": "PASS" })),
        ),
        _ => rejecting_ethics(req),
    });
    engine
        .start_from(seed(Role::Planner, vec![Role::Ethics]), Mode::Standard, 50)
        .unwrap();
    for _ in 0..4 {
        engine.process_tick().await;
    }
    assert_eq!(engine.status(), SessionStatus::Playing);
    let approved = messages_from(&engine, Role::Ethics)
        .into_iter()
        .find(|e| e.signals().verdict == Some(Verdict::Pass))
        .unwrap();
    assert_eq!(approved.destinations(), &[Role::Executor]);
}

// ==================== Strategy, philosophy, proposals ====================

#[tokio::test]
async fn test_cut_loop_clears_queue_once() {
    let mut engine = engine_with(EngineConfig::default(), |req| match req.role {
        Role::Strategy => Ok(Generated::new(
            "command.v1",
            json!({ "command": { "action": "CUT_LOOP" } }),
        )),
        role => Ok(note(role)),
    });
    engine
        .start_from(seed(Role::Human, vec![Role::Strategy]), Mode::Standard, 50)
        .unwrap();
    engine.enqueue(host("a", vec![Role::Memory]));
    engine.enqueue(host("b", vec![Role::Memory]));

    engine.process_tick().await;
    assert_eq!(engine.queue().len(), 1);
    let restart = &engine.queue()[0];
    assert_eq!(restart.origin(), Role::Strategy);
    assert_eq!(restart.destinations(), &[Mode::Standard.restart_target()]);

    // same command again: ignored, STRATEGY routes normally
    engine.enqueue(
        Envelope::new(EnvelopeId::new("again"), Role::Human, vec![Role::Strategy], 0)
            .with_priority(Priority::High)
            .with_payload("note.v1", json!({ "impact_score": 1.0 })),
    );
    engine.process_tick().await;
    assert_eq!(engine.queue().len(), 2);
    assert!(
        engine
            .queue()
            .iter()
            .any(|e| e.origin() == Role::Strategy && e.destinations() == [Role::Planner, Role::Synthesizer])
    );
}

#[tokio::test]
async fn test_cut_loop_skips_remaining_destinations() {
    let mut engine = engine_with(EngineConfig::default(), |req| match req.role {
        Role::Strategy => Ok(Generated::new(
            "command.v1",
            json!({ "command": { "action": "CUT_LOOP" } }),
        )),
        role => Ok(note(role)),
    });
    engine
        .start_from(
            seed(Role::Human, vec![Role::Strategy, Role::Memory]),
            Mode::Standard,
            50,
        )
        .unwrap();

    engine.process_tick().await;
    assert_eq!(engine.queue().len(), 1);
    assert_eq!(engine.queue()[0].origin(), Role::Strategy);
    assert_eq!(engine.queue()[0].destinations(), &[Mode::Standard.restart_target()]);
    assert!(messages_from(&engine, Role::Memory).is_empty());
}

#[tokio::test]
async fn test_intervention_is_consumed_on_next_dispatch() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let captured = seen.clone();
    let mut engine = engine_with(EngineConfig::default(), move |req| {
        if let Some(directive) = &req.one_shot_directive {
            captured.lock().unwrap().push((req.role, directive.clone()));
        }
        match req.role {
            Role::Philosophy => Ok(Generated::new(
                "advice.v1",
                json!({ "intervention": { "target": "META", "instruction": "zoom out" } }),
            )),
            role => Ok(note(role)),
        }
    });
    engine
        .start_from(seed(Role::Human, vec![Role::Philosophy]), Mode::Standard, 50)
        .unwrap();

    engine.process_tick().await;
    assert_eq!(engine.pending_directive(Role::Meta), Some("zoom out"));

    // PHILOSOPHY -> META
    engine.process_tick().await;
    assert!(engine.pending_directive(Role::Meta).is_none());
    assert_eq!(
        *seen.lock().unwrap(),
        vec![(Role::Meta, "zoom out".to_string())]
    );
}

fn proposing(
    role: Role,
    proposal: Value,
) -> impl Fn(&GenerationRequest) -> Result<Generated, GenerationError> + Send + Sync + 'static {
    move |req: &GenerationRequest| {
        if req.role == role {
            Ok(Generated::new("proposal.v1", json!({ "proposal": proposal })))
        } else {
            Ok(note(req.role))
        }
    }
}

#[tokio::test]
async fn test_confident_proposal_applies_once_under_dynamic_control() {
    let config = EngineConfig::default().with_control_mode(ControlMode::Dynamic);
    let mut engine = engine_with(
        config,
        proposing(
            Role::Risk,
            json!({ "action": "EXTEND_TIMELINE", "ticks": 10, "confidence": 0.95 }),
        ),
    );
    engine
        .start_from(seed(Role::Human, vec![Role::Risk, Role::Risk]), Mode::Standard, 20)
        .unwrap();
    engine.process_tick().await;
    assert_eq!(engine.max_ticks(), 30);
}

#[tokio::test]
async fn test_huge_timeline_extension_saturates() {
    let config = EngineConfig::default().with_control_mode(ControlMode::Dynamic);
    let mut engine = engine_with(
        config,
        proposing(
            Role::Risk,
            json!({ "action": "EXTEND_TIMELINE", "ticks": u64::MAX, "confidence": 0.95 }),
        ),
    );
    engine
        .start_from(seed(Role::Human, vec![Role::Risk]), Mode::Standard, 20)
        .unwrap();
    engine.process_tick().await;
    assert_eq!(engine.max_ticks(), u64::MAX);
    assert_eq!(engine.status(), SessionStatus::Playing);

    engine.process_tick().await;
    assert_eq!(engine.tick(), 2);
}

#[tokio::test]
async fn test_proposal_ignored_under_static_control_or_low_confidence() {
    let mut engine = engine_with(
        EngineConfig::default(),
        proposing(
            Role::Strategy,
            json!({ "action": "SWITCH_MODE", "mode": "ADAPTIVE", "confidence": 0.99 }),
        ),
    );
    engine
        .start_from(seed(Role::Human, vec![Role::Strategy]), Mode::Standard, 20)
        .unwrap();
    engine.process_tick().await;
    assert_eq!(engine.mode(), Mode::Standard);

    let config = EngineConfig::default().with_control_mode(ControlMode::Dynamic);
    let mut engine = engine_with(
        config,
        proposing(
            Role::Strategy,
            json!({ "action": "SWITCH_MODE", "mode": "ADAPTIVE", "confidence": 0.9 }),
        ),
    );
    engine
        .start_from(seed(Role::Human, vec![Role::Strategy]), Mode::Standard, 20)
        .unwrap();
    engine.process_tick().await;
    assert_eq!(engine.mode(), Mode::Standard);
}

#[tokio::test]
async fn test_terminate_proposal_stops_run() {
    let config = EngineConfig::default().with_control_mode(ControlMode::Dynamic);
    let mut engine = engine_with(
        config,
        proposing(
            Role::Semantic,
            json!({ "action": "TERMINATE", "confidence": 0.97 }),
        ),
    );
    engine
        .start_from(seed(Role::Human, vec![Role::Semantic, Role::Memory]), Mode::Standard, 20)
        .unwrap();
    engine.process_tick().await;
    assert_eq!(engine.status(), SessionStatus::Stopped);
    // remaining destinations are not processed once stopped
    assert!(messages_from(&engine, Role::Memory).is_empty());
    assert_eq!(
        engine.take_report_request().unwrap().reason,
        ReportReason::StrategicTermination
    );
}

#[tokio::test]
async fn test_cut_loop_takes_precedence_over_proposal() {
    let config = EngineConfig::default().with_control_mode(ControlMode::Dynamic);
    let mut engine = engine_with(config, |req| match req.role {
        Role::Strategy => Ok(Generated::new(
            "command.v1",
            json!({
                "command": { "action": "CUT_LOOP" },
                "proposal": { "action": "SWITCH_MODE", "mode": "ADAPTIVE", "confidence": 0.99 },
            }),
        )),
        role => Ok(note(role)),
    });
    engine
        .start_from(seed(Role::Human, vec![Role::Strategy]), Mode::Standard, 20)
        .unwrap();
    engine.process_tick().await;
    assert_eq!(engine.mode(), Mode::Standard);
    assert_eq!(engine.queue().len(), 1);
}

#[tokio::test]
async fn test_semantic_loss_quarantines_only_in_adaptive_mode() {
    let script = |req: &GenerationRequest| -> Result<Generated, GenerationError> {
        match req.role {
            Role::Semantic => Ok(Generated::new("loss.v1", json!({ "semantic_loss": 0.85 }))),
            role => Ok(note(role)),
        }
    };

    let mut engine = engine_with(EngineConfig::default(), script);
    engine
        .start_from(seed(Role::Human, vec![Role::Semantic]), Mode::Adaptive, 20)
        .unwrap();
    engine.process_tick().await;
    for role in CREATIVE_ROLES {
        assert!(engine.mutes().is_muted(role, 5));
        assert!(!engine.mutes().is_muted(role, 6));
    }

    let mut engine = engine_with(EngineConfig::default(), script);
    engine
        .start_from(seed(Role::Human, vec![Role::Semantic]), Mode::Standard, 20)
        .unwrap();
    engine.process_tick().await;
    assert!(engine.mutes().is_empty());
}

// ==================== Arbitration ====================

fn stalemate_script(
    ruling: Option<Value>,
) -> impl Fn(&GenerationRequest) -> Result<Generated, GenerationError> + Send + Sync + 'static {
    move |req: &GenerationRequest| match req.role {
        Role::Meta => Ok(Generated::new(
            "observation.v1",
            json!({ "loop_observation": { "pattern": "echo", "confidence": 0.95 } }),
        )),
        Role::Judge => match &ruling {
            Some(ruling) => Ok(Generated::new("ruling.v1", json!({ "ruling": ruling }))),
            None => Ok(note(Role::Judge)),
        },
        role => Ok(note(role)),
    }
}

/// Drive an assembly run until the META stalemate freezes it (tick 5).
async fn frozen_assembly(engine: &mut Engine) {
    engine
        .start_from(seed(Role::Human, vec![Role::Creative]), Mode::Assembly, 100)
        .unwrap();
    engine.enqueue(host("critic", vec![Role::Critic]));
    engine.enqueue(host("meta-1", vec![Role::Meta]));
    engine.enqueue(host("meta-2", vec![Role::Meta]));
    engine.enqueue(host("meta-3", vec![Role::Meta]));
    for _ in 0..5 {
        engine.process_tick().await;
    }
}

fn summons_in_log(engine: &Engine) -> Vec<&Envelope> {
    engine
        .log()
        .iter()
        .filter_map(LogEntry::as_message)
        .filter(|e| e.arbitration().is_some())
        .collect()
}

#[tokio::test]
async fn test_repeated_signature_freezes_with_one_summons() {
    let mut engine = engine_with(EngineConfig::default(), stalemate_script(None));
    frozen_assembly(&mut engine).await;

    assert!(engine.is_frozen());
    assert_eq!(engine.status(), SessionStatus::Frozen);
    assert_eq!(engine.queue().len(), 1);
    let summons = &engine.queue()[0];
    assert_eq!(summons.destinations(), &[Role::Judge]);

    let context = summons.arbitration().unwrap();
    assert!(!context.plaintiff_snapshot.is_empty());
    assert!(!context.defendant_snapshot.is_empty());
    assert_eq!(context.plaintiff_snapshot[0].origin, Role::Creative);
    assert_eq!(context.defendant_snapshot[0].origin, Role::Critic);
    assert_eq!(summons_in_log(&engine).len(), 1);
}

#[tokio::test]
async fn test_signature_counts_once_per_tick() {
    let mut engine = engine_with(EngineConfig::default(), stalemate_script(None));
    engine
        .start_from(
            seed(Role::Human, vec![Role::Meta, Role::Meta, Role::Meta]),
            Mode::Assembly,
            100,
        )
        .unwrap();
    engine.process_tick().await;
    assert!(!engine.is_frozen());
}

#[tokio::test]
async fn test_arbitration_disabled_outside_assembly() {
    let mut engine = engine_with(EngineConfig::default(), stalemate_script(None));
    engine
        .start_from(seed(Role::Human, vec![Role::Meta]), Mode::Standard, 100)
        .unwrap();
    for n in 0..3 {
        engine.enqueue(host(&format!("meta-{}", n), vec![Role::Meta]));
    }
    for _ in 0..4 {
        engine.process_tick().await;
    }
    assert!(!engine.is_frozen());
}

#[tokio::test]
async fn test_frozen_network_only_dispatches_the_judiciary() {
    let mut engine = engine_with(EngineConfig::default(), stalemate_script(None));
    frozen_assembly(&mut engine).await;
    engine.enqueue(host("suppressed", vec![Role::Memory]));

    // no ruling: the summons is consumed and the network stays frozen
    engine.process_tick().await;
    assert!(engine.is_frozen());
    assert_eq!(engine.queue().len(), 1);
    assert_eq!(engine.queue()[0].id().as_str(), "suppressed");

    // with no summons left, the judiciary is summoned again
    engine.process_tick().await;
    assert!(engine.is_frozen());
    assert_eq!(summons_in_log(&engine).len(), 2);
    assert!(messages_from(&engine, Role::Memory).is_empty());
}

#[tokio::test]
async fn test_valid_ruling_thaws_and_jumps_queue() {
    let ruling = json!({ "kind": "CREATIVE_GREENLIT", "muted": ["critic"], "duration_ticks": 3 });
    let mut engine = engine_with(EngineConfig::default(), stalemate_script(Some(ruling)));
    frozen_assembly(&mut engine).await;

    engine.process_tick().await;
    assert_eq!(engine.tick(), 6);
    assert!(!engine.is_frozen());
    assert_eq!(engine.status(), SessionStatus::Playing);
    assert!(engine.mutes().is_muted(Role::Critic, 8));
    assert!(!engine.mutes().is_muted(Role::Critic, 9));

    let head = &engine.queue()[0];
    assert_eq!(head.origin(), Role::Judge);
    assert_eq!(head.destinations(), &[Role::Synthesizer, Role::Strategy]);
}

#[tokio::test]
async fn test_greenlit_ruling_with_huge_duration_keeps_mute() {
    let ruling = json!({
        "kind": "CREATIVE_GREENLIT",
        "muted": ["critic"],
        "duration_ticks": u64::MAX,
    });
    let mut engine = engine_with(EngineConfig::default(), stalemate_script(Some(ruling)));
    frozen_assembly(&mut engine).await;

    engine.process_tick().await;
    assert!(!engine.is_frozen());
    assert!(engine.mutes().is_muted(Role::Critic, 7));
    assert!(engine.mutes().is_muted(Role::Critic, u64::MAX - 1));
}

#[tokio::test]
async fn test_invalid_ruling_keeps_network_frozen() {
    let ruling = json!({ "kind": "CREATIVE_GREENLIT", "muted": ["critic"] });
    let mut engine = engine_with(EngineConfig::default(), stalemate_script(Some(ruling)))
        .with_validator(Arc::new(RejectSchema("ruling.v1")));
    frozen_assembly(&mut engine).await;

    engine.process_tick().await;
    assert!(engine.is_frozen());
    assert!(engine.mutes().is_empty());
    assert!(!notices_of(&engine, NoticeKind::ValidationFailure).is_empty());
}

fn judge_with(
    ruling: Value,
) -> impl Fn(&GenerationRequest) -> Result<Generated, GenerationError> + Send + Sync + 'static {
    move |req: &GenerationRequest| match req.role {
        Role::Judge => Ok(Generated::new("ruling.v1", json!({ "ruling": ruling }))),
        Role::Planner => Ok(Generated::new("plan.v1", json!({ "summary": "a plan" }))),
        role => Ok(note(role)),
    }
}

#[tokio::test]
async fn test_task_force_ruling_resolves_aliases_and_plaintiffs() {
    let ruling = json!({
        "kind": "SYNTHESIS_TASK_FORCE",
        "members": ["hub", "the plaintiffs", "nobody in particular"],
        "kickoff": "Converge on one design",
    });
    let mut engine = engine_with(EngineConfig::default(), judge_with(ruling));
    let summons = seed(Role::Meta, vec![Role::Judge])
        .with_arbitration(ArbitrationContext::summon("loop:echo", 0, &[]));
    engine.start_from(summons, Mode::Standard, 20).unwrap();
    engine.process_tick().await;

    let task_force = engine.task_force().unwrap();
    assert!(task_force.contains(Role::Synthesizer));
    for role in CREATIVE_ROLES {
        assert!(task_force.contains(role));
    }
    assert_eq!(task_force.len(), 4);
    assert_eq!(
        notices_of(&engine, NoticeKind::UnresolvableRoleReference).len(),
        1
    );

    let kickoff = &engine.queue()[0];
    assert_eq!(kickoff.payload()["summary"], json!("Converge on one design"));
    assert_eq!(kickoff.destinations().len(), 4);
}

#[tokio::test]
async fn test_task_force_with_no_resolvable_members_fails() {
    let ruling = json!({ "kind": "SYNTHESIS_TASK_FORCE", "members": ["nobody"] });
    let mut engine = engine_with(EngineConfig::default(), judge_with(ruling));
    engine
        .start_from(seed(Role::Human, vec![Role::Judge]), Mode::Standard, 20)
        .unwrap();
    engine.process_tick().await;
    assert!(engine.task_force().is_none());
    assert!(engine.queue().is_empty());
}

#[tokio::test]
async fn test_identical_reroute_applies_once() {
    let ruling = json!({
        "kind": "RISK_MITIGATION",
        "reroute": { "source": "artist", "destinations": ["critic", "risk"] },
    });
    let mut engine = engine_with(EngineConfig::default(), judge_with(ruling));
    engine
        .start_from(seed(Role::Human, vec![Role::Judge, Role::Judge]), Mode::Standard, 20)
        .unwrap();
    engine.process_tick().await;

    assert_eq!(
        engine.routing_table().destinations(Role::Creative),
        &[Role::Critic, Role::Risk]
    );
    let applied = notices_of(&engine, NoticeKind::Ruling)
        .into_iter()
        .filter(|n| n.text.starts_with("Re-route applied"))
        .count();
    assert_eq!(applied, 1);
}

#[tokio::test]
async fn test_mute_released_by_required_schema() {
    let ruling = json!({
        "kind": "CREATIVE_GREENLIT",
        "muted": ["critic"],
        "unmute": [{ "type": "REQUIRED_SCHEMA_SEEN", "schema_id": "plan.v1" }],
    });
    let mut engine = engine_with(EngineConfig::default(), judge_with(ruling));
    engine
        .start_from(seed(Role::Human, vec![Role::Judge]), Mode::Standard, 20)
        .unwrap();
    engine.process_tick().await;
    assert!(engine.mutes().is_muted(Role::Critic, 100));

    engine.enqueue(host("plan", vec![Role::Planner]));
    engine.process_tick().await;
    assert!(engine.mutes().get(Role::Critic).is_none());
}

#[tokio::test]
async fn test_muted_role_absent_from_next_hops() {
    let ruling = json!({
        "kind": "CREATIVE_GREENLIT",
        "muted": ["critic"],
        "unmute": [{ "type": "TIMEOUT", "ticks": 5 }],
    });
    let mut engine = engine_with(EngineConfig::default(), judge_with(ruling));
    engine
        .start_from(seed(Role::Human, vec![Role::Judge]), Mode::Standard, 20)
        .unwrap();
    engine.process_tick().await;

    // CREATIVE -> [CRITIC, SYNTHESIZER] in the standard table
    engine.enqueue(host("creative", vec![Role::Creative]));
    engine.process_tick().await;
    let produced = messages_from(&engine, Role::Creative)[0];
    assert_eq!(produced.destinations(), &[Role::Synthesizer]);
}

// ==================== Governance ====================

#[tokio::test]
async fn test_circuit_breaker_mutes_tactical_roles() {
    let mut engine = echo_engine();
    engine
        .start_from(seed(Role::Human, vec![Role::Synthesizer; 21]), Mode::Standard, 50)
        .unwrap();
    engine.process_tick().await;

    assert!(engine.mutes().is_muted(Role::Planner, 10));
    assert!(!engine.mutes().is_muted(Role::Planner, 11));
    assert_eq!(notices_of(&engine, NoticeKind::CircuitBreaker).len(), 1);
    assert!(
        engine
            .queue()
            .iter()
            .any(|e| e.destinations() == STRATEGIC_ROLES && e.priority() == Priority::High)
    );
}

#[tokio::test]
async fn test_density_throttles_creative_roles() {
    let mut engine = echo_engine();
    let mut destinations = vec![Role::Memory; 21];
    destinations.push(Role::Creative);
    engine
        .start_from(seed(Role::Human, destinations), Mode::Standard, 50)
        .unwrap();
    engine.process_tick().await;

    let creative = messages_from(&engine, Role::Creative)[0];
    assert_eq!(creative.priority(), Priority::Low);
    assert_eq!(notices_of(&engine, NoticeKind::Throttle).len(), 1);

    engine.process_tick().await;
    assert_eq!(notices_of(&engine, NoticeKind::Throttle).len(), 2);
}

#[tokio::test]
async fn test_stall_fires_loops_then_escalates() {
    let mut engine = echo_engine();
    for n in 0..3 {
        engine.register_feedback_loop(FeedbackLoop::on_stall(
            format!("extend-{}", n),
            LoopResponse::ExtendTimeline { ticks: 5 },
        ));
    }
    engine.start("Stall please", Mode::Standard, 100).unwrap();
    for _ in 0..12 {
        engine.process_tick().await;
    }
    assert_eq!(engine.max_ticks(), 115);
    assert!(
        messages_from(&engine, Role::Human)
            .iter()
            .any(|e| e.destinations() == [Role::Meta] && e.schema_id() == "alert.v1")
    );
}

#[tokio::test]
async fn test_stall_loop_forces_mode_switch() {
    let mut engine = echo_engine();
    engine.register_feedback_loop(FeedbackLoop::on_stall(
        "adapt",
        LoopResponse::ForceModeSwitch {
            mode: Mode::Adaptive,
        },
    ));
    engine.start("Stall please", Mode::Standard, 100).unwrap();
    for _ in 0..10 {
        engine.process_tick().await;
    }
    assert_eq!(engine.mode(), Mode::Adaptive);
}

#[tokio::test]
async fn test_stall_loop_extension_saturates() {
    let mut engine = echo_engine();
    engine.register_feedback_loop(FeedbackLoop::on_stall(
        "extend",
        LoopResponse::ExtendTimeline { ticks: u64::MAX },
    ));
    engine.start("Stall please", Mode::Standard, 100).unwrap();
    for _ in 0..10 {
        engine.process_tick().await;
    }
    assert_eq!(engine.max_ticks(), u64::MAX);
    assert_eq!(engine.status(), SessionStatus::Playing);
}

#[tokio::test]
async fn test_idle_plan_timer_nudges_strategy() {
    let config = EngineConfig::default().with_idle_plan_limit(2);
    let mut engine = engine_with(config, |req| Ok(note(req.role)));
    engine.start("Plan nothing", Mode::Standard, 100).unwrap();
    for _ in 0..3 {
        engine.process_tick().await;
    }
    assert!(
        messages_from(&engine, Role::Human)
            .iter()
            .any(|e| e.destinations() == [Role::Strategy])
    );
    assert_eq!(notices_of(&engine, NoticeKind::Directive).len(), 1);
}

#[tokio::test]
async fn test_ethics_pass_resets_idle_timer() {
    let config = EngineConfig::default().with_idle_plan_limit(2);
    let mut engine = engine_with(config, |req| match req.role {
        Role::Ethics => Ok(Generated::new("verdict.v1", json!({ "verdict": "PASS" }))),
        role => Ok(note(role)),
    });
    engine
        .start_from(seed(Role::Human, vec![Role::Ethics]), Mode::Standard, 100)
        .unwrap();
    for n in 0..3 {
        engine.enqueue(host(&format!("ethics-{}", n), vec![Role::Ethics]));
    }
    for _ in 0..4 {
        engine.process_tick().await;
    }
    assert!(notices_of(&engine, NoticeKind::Directive).is_empty());
}

// ==================== Routing ====================

#[tokio::test]
async fn test_hub_broadcast_samples_four_listeners() {
    let mut engine = echo_engine();
    engine
        .start_from(seed(Role::Human, vec![Role::Synthesizer]), Mode::Assembly, 20)
        .unwrap();
    engine.process_tick().await;
    let broadcast = &engine.queue()[0];
    assert_eq!(broadcast.destinations().len(), 4);
    assert!(
        broadcast
            .destinations()
            .iter()
            .all(|r| !matches!(r, Role::Human | Role::Judge | Role::Synthesizer))
    );
}

#[tokio::test]
async fn test_conflicting_learned_override_is_reported() {
    let config = EngineConfig::default().with_learned_override(
        LearnedOverride {
            source: Role::Ethics,
            destinations: vec![Role::Planner],
        },
        true,
    );
    let mut engine = engine_with(config, |req| Ok(note(req.role)));
    engine.start("Learn", Mode::Standard, 10).unwrap();
    assert_eq!(notices_of(&engine, NoticeKind::RoutingConflict).len(), 1);
    assert_eq!(
        engine.routing_table().destinations(Role::Ethics),
        &[Role::Executor]
    );
}

#[test]
fn test_payload_signals_ignore_garbage() {
    let signals = PayloadSignals::extract(&json!({ "verdict": 12, "semantic_loss": 0.9 }));
    assert!(signals.verdict.is_none());
    assert_eq!(signals.semantic_loss, Some(0.9));
}
