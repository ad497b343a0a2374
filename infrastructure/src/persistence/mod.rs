//! File-backed adapters for reports and snapshots.

mod report_writer;
mod snapshot_store;

pub use report_writer::JsonReportWriter;
pub use snapshot_store::JsonSnapshotStore;
