//! Presentation layer for synod
//!
//! This crate contains the CLI definition, live progress observers and the
//! end-of-run console formatter.

pub mod cli;
pub mod output;
pub mod progress;

// Re-export commonly used types
pub use cli::commands::{Cli, OutputFormat};
pub use output::console::{ConsoleFormatter, RunSummary};
pub use progress::observer::{ProgressObserver, SimpleObserver};
