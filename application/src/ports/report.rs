//! Report port
//!
//! Report assembly is external. The engine only decides *when* a report is
//! due and hands over the full message log with the final status.

use crate::engine::SessionStatus;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use synod_domain::LogEntry;
use thiserror::Error;

/// Why a report was requested
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportReason {
    TickBudgetExhausted,
    MoralOverride,
    StrategicTermination,
    UserRequested,
}

impl ReportReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportReason::TickBudgetExhausted => "TICK_BUDGET_EXHAUSTED",
            ReportReason::MoralOverride => "MORAL_OVERRIDE",
            ReportReason::StrategicTermination => "STRATEGIC_TERMINATION",
            ReportReason::UserRequested => "USER_REQUESTED",
        }
    }

    /// Whether the run ended with this report
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ReportReason::UserRequested)
    }
}

impl fmt::Display for ReportReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportRequest {
    pub reason: ReportReason,
    pub status: SessionStatus,
    pub tick: u64,
    pub directive: String,
    pub log: Vec<LogEntry>,
}

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Report rejected: {0}")]
    Rejected(String),
}

#[async_trait]
pub trait ReportPort: Send + Sync {
    /// Deliver a report request; returns where the report ended up.
    async fn deliver(&self, request: ReportRequest) -> Result<String, ReportError>;
}

/// Report sink that discards every request
pub struct NoReport;

#[async_trait]
impl ReportPort for NoReport {
    async fn deliver(&self, _request: ReportRequest) -> Result<String, ReportError> {
        Ok(String::new())
    }
}
