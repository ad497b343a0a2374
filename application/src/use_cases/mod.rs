//! Use cases
//!
//! Application-level operations that drive the engine.

pub mod run_session;
