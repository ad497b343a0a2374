//! Run Session use case
//!
//! Owns the [`Engine`] on a single task and drives its scheduling loop.
//! Hosts talk to it through a [`SessionHandle`]: every command is a message,
//! so the queue, tick counter and governance state are only ever touched by
//! the loop itself. Commands are applied between ticks, which means a pause
//! always lands after the current envelope's destinations are finished.

use crate::engine::{Engine, EngineError, SessionStatus, TickOutcome};
use crate::pacing::ReentryPacer;
use crate::ports::report::ReportPort;
use crate::ports::snapshot_store::{SnapshotError, SnapshotStore};
use std::sync::Arc;
use std::time::Duration;
use synod_domain::{FeedbackLoop, Mode};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{Instant, sleep_until};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

const COMMAND_BUFFER: usize = 32;

/// Roughly 30 years
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

fn far_future(now: Instant) -> Instant {
    now.checked_add(FAR_FUTURE).unwrap_or(now)
}

/// Errors surfaced to session hosts
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("Snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),

    #[error("Session runner is no longer running")]
    Closed,
}

/// Point-in-time view of a running session
#[derive(Debug, Clone, PartialEq)]
pub struct SessionView {
    pub status: SessionStatus,
    pub tick: u64,
    pub max_ticks: u64,
    pub mode: Mode,
    pub queued: usize,
}

/// Messages accepted by the session runner
#[derive(Debug)]
pub enum SessionCommand {
    Start {
        directive: String,
        mode: Mode,
        max_ticks: u64,
        reply: oneshot::Sender<Result<(), SessionError>>,
    },
    Pause,
    Resume,
    Reset,
    RequestReport,
    RegisterLoop(FeedbackLoop),
    Snapshot {
        reply: oneshot::Sender<Result<String, SessionError>>,
    },
    Restore {
        reply: oneshot::Sender<Result<SessionStatus, SessionError>>,
    },
    Status {
        reply: oneshot::Sender<SessionView>,
    },
    Shutdown,
}

/// Cloneable client side of a session
#[derive(Debug, Clone)]
pub struct SessionHandle {
    tx: mpsc::Sender<SessionCommand>,
    cancel: CancellationToken,
}

impl SessionHandle {
    pub async fn start(
        &self,
        directive: impl Into<String>,
        mode: Mode,
        max_ticks: u64,
    ) -> Result<(), SessionError> {
        let (reply, rx) = oneshot::channel();
        self.send(SessionCommand::Start {
            directive: directive.into(),
            mode,
            max_ticks,
            reply,
        })
        .await?;
        rx.await.map_err(|_| SessionError::Closed)?
    }

    pub async fn pause(&self) -> Result<(), SessionError> {
        self.send(SessionCommand::Pause).await
    }

    pub async fn resume(&self) -> Result<(), SessionError> {
        self.send(SessionCommand::Resume).await
    }

    pub async fn reset(&self) -> Result<(), SessionError> {
        self.send(SessionCommand::Reset).await
    }

    pub async fn request_report(&self) -> Result<(), SessionError> {
        self.send(SessionCommand::RequestReport).await
    }

    pub async fn register_loop(&self, feedback_loop: FeedbackLoop) -> Result<(), SessionError> {
        self.send(SessionCommand::RegisterLoop(feedback_loop)).await
    }

    /// Persist a snapshot; returns where it was stored.
    pub async fn snapshot(&self) -> Result<String, SessionError> {
        let (reply, rx) = oneshot::channel();
        self.send(SessionCommand::Snapshot { reply }).await?;
        rx.await.map_err(|_| SessionError::Closed)?
    }

    /// Replace the run with the last stored snapshot. Returns the restored
    /// status: paused, or stopped when the stored run had already ended.
    pub async fn restore(&self) -> Result<SessionStatus, SessionError> {
        let (reply, rx) = oneshot::channel();
        self.send(SessionCommand::Restore { reply }).await?;
        rx.await.map_err(|_| SessionError::Closed)?
    }

    pub async fn status(&self) -> Result<SessionView, SessionError> {
        let (reply, rx) = oneshot::channel();
        self.send(SessionCommand::Status { reply }).await?;
        rx.await.map_err(|_| SessionError::Closed)
    }

    pub async fn shutdown(&self) -> Result<(), SessionError> {
        self.send(SessionCommand::Shutdown).await
    }

    /// Token that stops the runner without going through the queue
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    async fn send(&self, command: SessionCommand) -> Result<(), SessionError> {
        self.tx.send(command).await.map_err(|_| SessionError::Closed)
    }
}

/// What the runner hands back when it exits
pub struct SessionOutcome {
    pub engine: Engine,
    /// Locations of the reports delivered during the session
    pub reports: Vec<String>,
}

enum Flow {
    Continue,
    Exit,
}

/// The scheduling loop
pub struct SessionRunner {
    engine: Engine,
    pacer: ReentryPacer,
    reporter: Arc<dyn ReportPort>,
    snapshots: Arc<dyn SnapshotStore>,
    rx: mpsc::Receiver<SessionCommand>,
    cancel: CancellationToken,
    exit_when_stopped: bool,
    next_turn: Instant,
    reports: Vec<String>,
}

impl SessionRunner {
    pub fn new(
        engine: Engine,
        pacer: ReentryPacer,
        reporter: Arc<dyn ReportPort>,
        snapshots: Arc<dyn SnapshotStore>,
    ) -> (Self, SessionHandle) {
        let (tx, rx) = mpsc::channel(COMMAND_BUFFER);
        let cancel = CancellationToken::new();
        let runner = Self {
            engine,
            pacer,
            reporter,
            snapshots,
            rx,
            cancel: cancel.clone(),
            exit_when_stopped: false,
            next_turn: Instant::now(),
            reports: Vec::new(),
        };
        (runner, SessionHandle { tx, cancel })
    }

    /// Return from [`run`](Self::run) as soon as the session stops.
    pub fn exit_when_stopped(mut self, enabled: bool) -> Self {
        self.exit_when_stopped = enabled;
        self
    }

    pub async fn run(mut self) -> SessionOutcome {
        info!("Session runner started");
        loop {
            if self.exit_when_stopped && self.engine.status() == SessionStatus::Stopped {
                break;
            }

            let flow = if self.engine.is_active() {
                tokio::select! {
                    biased;
                    _ = self.cancel.cancelled() => Flow::Exit,
                    command = self.rx.recv() => self.on_command(command).await,
                    _ = sleep_until(self.next_turn) => {
                        self.turn().await;
                        Flow::Continue
                    }
                }
            } else {
                tokio::select! {
                    biased;
                    _ = self.cancel.cancelled() => Flow::Exit,
                    command = self.rx.recv() => self.on_command(command).await,
                }
            };

            if let Flow::Exit = flow {
                break;
            }
        }
        info!(
            tick = self.engine.tick(),
            status = %self.engine.status(),
            "Session runner stopped"
        );
        SessionOutcome {
            engine: self.engine,
            reports: self.reports,
        }
    }

    async fn turn(&mut self) {
        let delay = match self.engine.process_tick().await {
            TickOutcome::Dispatched(summary) => self.pacer.next_delay(summary.requested_delay_ms),
            TickOutcome::Idle => self.pacer.next_delay(None),
            TickOutcome::Finished(reason) => {
                debug!(reason = %reason, "Run finished");
                Duration::ZERO
            }
            TickOutcome::Inactive => Duration::ZERO,
        };
        let now = Instant::now();
        // an unreachable deadline parks the loop until the next command
        self.next_turn = now.checked_add(delay).unwrap_or_else(|| far_future(now));
        self.deliver_report().await;
    }

    async fn on_command(&mut self, command: Option<SessionCommand>) -> Flow {
        let Some(command) = command else {
            debug!("All session handles dropped");
            return Flow::Exit;
        };
        match command {
            SessionCommand::Start {
                directive,
                mode,
                max_ticks,
                reply,
            } => {
                let result = self
                    .engine
                    .start(directive, mode, max_ticks)
                    .map_err(SessionError::from);
                self.rewind_pacer();
                let _ = reply.send(result);
            }
            SessionCommand::Pause => self.engine.pause(),
            SessionCommand::Resume => {
                self.engine.resume();
                self.rewind_pacer();
            }
            SessionCommand::Reset => self.engine.reset(),
            SessionCommand::RequestReport => {
                self.engine.request_report();
                self.deliver_report().await;
            }
            SessionCommand::RegisterLoop(feedback_loop) => {
                self.engine.register_feedback_loop(feedback_loop)
            }
            SessionCommand::Snapshot { reply } => {
                let result = self
                    .snapshots
                    .save(&self.engine.snapshot())
                    .await
                    .map_err(SessionError::from);
                if let Ok(location) = &result {
                    info!(location = %location, tick = self.engine.tick(), "Snapshot saved");
                }
                let _ = reply.send(result);
            }
            SessionCommand::Restore { reply } => {
                let result = match self.snapshots.load().await {
                    Ok(snapshot) => self
                        .engine
                        .restore(snapshot)
                        .map(|()| self.engine.status())
                        .map_err(SessionError::from),
                    Err(error) => Err(SessionError::from(error)),
                };
                let _ = reply.send(result);
            }
            SessionCommand::Status { reply } => {
                let _ = reply.send(SessionView {
                    status: self.engine.status(),
                    tick: self.engine.tick(),
                    max_ticks: self.engine.max_ticks(),
                    mode: self.engine.mode(),
                    queued: self.engine.queue().len(),
                });
            }
            SessionCommand::Shutdown => return Flow::Exit,
        }
        Flow::Continue
    }

    fn rewind_pacer(&mut self) {
        self.pacer.reset();
        self.next_turn = Instant::now();
    }

    async fn deliver_report(&mut self) {
        let Some(request) = self.engine.take_report_request() else {
            return;
        };
        let reason = request.reason;
        match self.reporter.deliver(request).await {
            Ok(location) => {
                info!(reason = %reason, location = %location, "Report delivered");
                self.reports.push(location);
            }
            Err(error) => warn!(reason = %reason, error = %error, "Report delivery failed"),
        }
    }
}
