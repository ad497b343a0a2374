//! Session observer port
//!
//! Callbacks fired by the engine as it runs. Implementations live in the
//! presentation layer (progress bars, console output); every method has an
//! empty default so observers only implement what they render.

use crate::engine::SessionStatus;
use crate::ports::report::ReportReason;
use synod_domain::{Envelope, SystemNotice};

pub trait SessionObserver: Send + Sync {
    /// Called after an envelope is dequeued and the tick advanced
    fn on_tick(&self, _tick: u64, _max_ticks: u64, _envelope: &Envelope) {}

    /// Called for each envelope a role produced
    fn on_dispatch(&self, _envelope: &Envelope) {}

    /// Called for each system notice appended to the log
    fn on_notice(&self, _notice: &SystemNotice) {}

    /// Called when the session status changes
    fn on_status(&self, _status: SessionStatus) {}

    /// Called when a report is requested
    fn on_report(&self, _reason: ReportReason) {}
}

/// No-op observer
pub struct NoObserver;

impl SessionObserver for NoObserver {}
