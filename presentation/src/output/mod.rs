//! End-of-run output formatting

pub mod console;
