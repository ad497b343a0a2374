//! Dispatch envelopes
//!
//! An [`Envelope`] is one message flowing through the network. This module
//! also holds the typed view over payload signals and the message log.

pub mod entities;
pub mod log;
pub mod signals;
pub mod value_objects;

pub use entities::Envelope;
pub use log::{LogEntry, NoticeKind, NoticeSeverity, SystemNotice};
pub use signals::PayloadSignals;
pub use value_objects::{EnvelopeId, Priority, Trace, ValidationOutcome};
