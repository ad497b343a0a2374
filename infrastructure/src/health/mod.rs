//! Heuristic health probe.
//!
//! Scores the recent message log on three components:
//! - quality: validated output scores high, fallback and invalid output low
//! - approval: share of ETHICS verdicts that passed
//! - diversity: distinct speakers over messages
//!
//! Stability is the share of recent log entries that are not warning or
//! critical notices.

use synod_application::FALLBACK_SCHEMA;
use synod_application::ports::health_probe::{HealthProbe, HealthReading};
use synod_domain::envelope::signals::Verdict;
use synod_domain::{Envelope, LogEntry, NoticeSeverity, Role, ValidationOutcome};
use std::collections::HashSet;

const QUALITY_WEIGHT: f64 = 0.5;
const APPROVAL_WEIGHT: f64 = 0.3;
const DIVERSITY_WEIGHT: f64 = 0.2;

pub struct HeuristicHealthProbe {
    window: usize,
}

impl Default for HeuristicHealthProbe {
    fn default() -> Self {
        Self { window: 20 }
    }
}

impl HeuristicHealthProbe {
    /// Probe looking at the last `window` log entries
    pub fn new(window: usize) -> Self {
        Self {
            window: window.max(1),
        }
    }

    fn quality(envelope: &Envelope) -> f64 {
        if envelope.schema_id() == FALLBACK_SCHEMA {
            return 0.25;
        }
        match envelope.validation() {
            ValidationOutcome::Valid => 1.0,
            ValidationOutcome::NotChecked => 0.75,
            ValidationOutcome::Invalid(_) => 0.0,
        }
    }
}

impl HealthProbe for HeuristicHealthProbe {
    fn measure(&self, log: &[LogEntry], _tick: u64) -> HealthReading {
        let recent = &log[log.len().saturating_sub(self.window)..];
        if recent.is_empty() {
            return HealthReading {
                health: 1.0,
                stability: 1.0,
            };
        }

        let messages: Vec<&Envelope> = recent.iter().filter_map(LogEntry::as_message).collect();
        let alarms = recent
            .iter()
            .filter_map(LogEntry::as_notice)
            .filter(|notice| notice.severity != NoticeSeverity::Info)
            .count();
        let stability = 1.0 - alarms as f64 / recent.len() as f64;

        if messages.is_empty() {
            return HealthReading {
                health: 0.0,
                stability,
            };
        }

        let count = messages.len() as f64;
        let quality = messages.iter().map(|m| Self::quality(m)).sum::<f64>() / count;

        let verdicts: Vec<Verdict> = messages
            .iter()
            .filter(|m| m.origin() == Role::Ethics)
            .filter_map(|m| m.signals().verdict)
            .collect();
        let approval = if verdicts.is_empty() {
            0.5
        } else {
            verdicts.iter().filter(|v| **v == Verdict::Pass).count() as f64
                / verdicts.len() as f64
        };

        let speakers: HashSet<Role> = messages.iter().map(|m| m.origin()).collect();
        let diversity = speakers.len() as f64 / count;

        HealthReading {
            health: QUALITY_WEIGHT * quality
                + APPROVAL_WEIGHT * approval
                + DIVERSITY_WEIGHT * diversity,
            stability,
        }
    }
}
