//! Port for the structured dispatch transcript.
//!
//! Defines the [`DispatchLogger`] trait for recording engine events
//! (dispatched envelopes, system notices, lifecycle changes) to a
//! structured log.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostics, while this port captures the full dispatch
//! transcript in a machine-readable format (JSONL).

use serde_json::Value;

/// A structured dispatch event for logging.
pub struct DispatchEvent {
    /// Event type identifier (e.g., "dispatch", "notice", "lifecycle").
    pub event_type: &'static str,
    pub tick: u64,
    /// JSON payload with event-specific data.
    pub payload: Value,
}

impl DispatchEvent {
    pub fn new(event_type: &'static str, tick: u64, payload: Value) -> Self {
        Self {
            event_type,
            tick,
            payload,
        }
    }
}

/// Port for logging dispatch events.
///
/// The `log` method is synchronous and non-fallible so that transcript
/// failures never disturb the scheduling loop.
pub trait DispatchLogger: Send + Sync {
    fn log(&self, event: DispatchEvent);
}

/// No-op implementation for tests and when the transcript is disabled.
pub struct NoDispatchLogger;

impl DispatchLogger for NoDispatchLogger {
    fn log(&self, _event: DispatchEvent) {}
}
