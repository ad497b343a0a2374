//! Arbitration of systemic stalemates
//!
//! Repeated stalemate signatures freeze the network; the judicial role is
//! summoned with a two-faction snapshot and its ruling unfreezes it.

pub mod context;
pub mod trigger;

pub use context::{ArbitrationContext, MessageDigest};
pub use trigger::{ArbitrationLimits, ArbitrationPhase, ArbitrationState};
