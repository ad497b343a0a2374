//! Application-level configuration.
//!
//! - [`EngineConfig`]: run defaults, hook thresholds and governance limits
//! - [`PacingConfig`](crate::pacing::PacingConfig) lives next to the pacer

pub mod engine_config;

pub use engine_config::EngineConfig;
