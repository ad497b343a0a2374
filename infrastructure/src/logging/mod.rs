//! Logging infrastructure: the structured dispatch transcript.
//!
//! Provides [`JsonlDispatchLogger`], a JSONL file writer that implements
//! the [`DispatchLogger`](synod_application::DispatchLogger) port.

mod jsonl_logger;

pub use jsonl_logger::JsonlDispatchLogger;
