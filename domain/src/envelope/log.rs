//! Message log entries
//!
//! The message stream interleaves dispatched envelopes with system notices.
//! Every non-fatal condition the engine recovers from leaves a notice here.

use super::entities::Envelope;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeSeverity {
    Info,
    Warning,
    Critical,
}

/// Category of a system notice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    Lifecycle,
    GenerationFailure,
    ValidationFailure,
    RoutingConflict,
    UnresolvableRoleReference,
    EthicalRejection,
    Remediation,
    GenerationDemoted,
    Throttle,
    CircuitBreaker,
    ConvergenceStall,
    Arbitration,
    Ruling,
    Directive,
    Command,
    Mute,
}

impl NoticeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NoticeKind::Lifecycle => "lifecycle",
            NoticeKind::GenerationFailure => "generation_failure",
            NoticeKind::ValidationFailure => "validation_failure",
            NoticeKind::RoutingConflict => "routing_conflict",
            NoticeKind::UnresolvableRoleReference => "unresolvable_role_reference",
            NoticeKind::EthicalRejection => "ethical_rejection",
            NoticeKind::Remediation => "remediation",
            NoticeKind::GenerationDemoted => "generation_demoted",
            NoticeKind::Throttle => "throttle",
            NoticeKind::CircuitBreaker => "circuit_breaker",
            NoticeKind::ConvergenceStall => "convergence_stall",
            NoticeKind::Arbitration => "arbitration",
            NoticeKind::Ruling => "ruling",
            NoticeKind::Directive => "directive",
            NoticeKind::Command => "command",
            NoticeKind::Mute => "mute",
        }
    }
}

impl fmt::Display for NoticeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemNotice {
    pub tick: u64,
    pub severity: NoticeSeverity,
    pub kind: NoticeKind,
    pub text: String,
}

impl SystemNotice {
    pub fn info(tick: u64, kind: NoticeKind, text: impl Into<String>) -> Self {
        Self {
            tick,
            severity: NoticeSeverity::Info,
            kind,
            text: text.into(),
        }
    }

    pub fn warning(tick: u64, kind: NoticeKind, text: impl Into<String>) -> Self {
        Self {
            tick,
            severity: NoticeSeverity::Warning,
            kind,
            text: text.into(),
        }
    }

    pub fn critical(tick: u64, kind: NoticeKind, text: impl Into<String>) -> Self {
        Self {
            tick,
            severity: NoticeSeverity::Critical,
            kind,
            text: text.into(),
        }
    }
}

/// One entry of the message stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "entry", rename_all = "snake_case")]
pub enum LogEntry {
    Message(Envelope),
    Notice(SystemNotice),
}

impl LogEntry {
    pub fn as_message(&self) -> Option<&Envelope> {
        match self {
            LogEntry::Message(envelope) => Some(envelope),
            LogEntry::Notice(_) => None,
        }
    }

    pub fn as_notice(&self) -> Option<&SystemNotice> {
        match self {
            LogEntry::Notice(notice) => Some(notice),
            LogEntry::Message(_) => None,
        }
    }
}
