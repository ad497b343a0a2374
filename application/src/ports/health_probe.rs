//! Health probe port
//!
//! Health and stability are opaque scalars computed from the message log.
//! The circuit breaker and the convergence-stall tracker consume them.

use synod_domain::LogEntry;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HealthReading {
    pub health: f64,
    pub stability: f64,
}

pub trait HealthProbe: Send + Sync {
    fn measure(&self, log: &[LogEntry], tick: u64) -> HealthReading;
}

/// Probe that always reports the same reading
pub struct ConstantHealth(pub HealthReading);

impl HealthProbe for ConstantHealth {
    fn measure(&self, _log: &[LogEntry], _tick: u64) -> HealthReading {
        self.0
    }
}
