//! Generation adapters.
//!
//! Only the deterministic offline generator ships with synod; remote model
//! adapters implement the same [`GenerationPort`](synod_application::GenerationPort).

mod offline;

pub use offline::OfflineGenerator;
